//! Data model definitions for quizzes and attempts.
//!
//! These are the records persisted by the [`QuizStore`](crate::quiz_store::QuizStore)
//! and [`AttemptStore`](crate::attempt_store::AttemptStore). Field names are
//! serialized in camelCase so that stored collections keep the exact shape
//! UI hosts read and write:
//!
//! ```json
//! {
//!   "id": "mlp-quiz-1",
//!   "title": "My Little Pony Quiz",
//!   "questions": [
//!     {
//!       "id": "q1",
//!       "text": "Who is the Princess of Friendship?",
//!       "mode": "single",
//!       "options": [{ "id": "q1o1", "text": "Twilight Sparkle", "isCorrect": true }]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Selected option ids per question id, in selection order.
pub type AnswerMap = BTreeMap<String, Vec<String>>;

/// Option count a freshly added or re-moded choice question is padded to.
const DEFAULT_OPTION_COUNT: usize = 3;

/// Seconds budgeted per question when estimating how long a quiz takes.
pub const SECONDS_PER_QUESTION: u32 = 15;

pub const TRUE_LABEL: &str = "True";
pub const FALSE_LABEL: &str = "False";

/// Generates a fresh id for quizzes, questions, options and attempts.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            is_correct,
        }
    }

    fn empty() -> Self {
        Self::new("", false)
    }
}

/// Grading discipline of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMode {
    #[default]
    Single,
    Multiple,
    TrueFalse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<AnswerOption>,
    /// Absent on records written before modes existed; see [`Question::effective_mode`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<QuestionMode>,
}

impl Question {
    /// A blank single-choice question with three empty options.
    pub fn new_single() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            options: (0..DEFAULT_OPTION_COUNT).map(|_| AnswerOption::empty()).collect(),
            mode: Some(QuestionMode::Single),
        }
    }

    pub fn effective_mode(&self) -> QuestionMode {
        self.mode.unwrap_or_default()
    }

    pub fn correct_option_ids(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id.as_str())
            .collect()
    }

    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Switches the grading mode.
    ///
    /// Moving to `TrueFalse` discards the current options in favour of a fresh
    /// `True`/`False` pair with nothing marked correct. Moving to a choice mode
    /// keeps the options and pads them with empty ones up to three.
    pub fn set_mode(&mut self, mode: QuestionMode) {
        self.mode = Some(mode);

        if mode == QuestionMode::TrueFalse {
            self.options = vec![
                AnswerOption::new(TRUE_LABEL, false),
                AnswerOption::new(FALSE_LABEL, false),
            ];
            return;
        }

        while self.options.len() < DEFAULT_OPTION_COUNT {
            self.options.push(AnswerOption::empty());
        }
    }

    /// Marks an option as correct. Multiple-choice questions toggle the
    /// option; single and true/false questions keep exactly one correct option.
    pub fn mark_correct(&mut self, option_id: &str) {
        match self.effective_mode() {
            QuestionMode::Multiple => {
                if let Some(option) = self.options.iter_mut().find(|o| o.id == option_id) {
                    option.is_correct = !option.is_correct;
                }
            }
            QuestionMode::Single | QuestionMode::TrueFalse => {
                for option in &mut self.options {
                    option.is_correct = option.id == option_id;
                }
            }
        }
    }

    /// Appends an empty option and returns its id. True/false questions have a
    /// fixed option pair and are left untouched.
    pub fn add_option(&mut self) -> Option<String> {
        if self.effective_mode() == QuestionMode::TrueFalse {
            return None;
        }
        let option = AnswerOption::empty();
        let id = option.id.clone();
        self.options.push(option);
        Some(id)
    }

    /// Removes an option, returning whether one was removed. True/false
    /// questions keep their pair.
    pub fn remove_option(&mut self, option_id: &str) -> bool {
        if self.effective_mode() == QuestionMode::TrueFalse {
            return false;
        }
        let before = self.options.len();
        self.options.retain(|o| o.id != option_id);
        self.options.len() != before
    }
}

/// An authored quiz.
///
/// Quizzes are replaced wholesale on save; there is no partial update and no
/// versioning. Attempts refer to a quiz only by [`Quiz::id`], so editing or
/// deleting a quiz after it was taken changes what a later review shows.
///
/// # Examples
///
/// ```rust
/// use offline_quiz_core::quiz_model::{Question, QuestionMode, Quiz};
///
/// let mut question = Question::new_single();
/// question.text = "Is Rust memory safe?".to_string();
/// question.set_mode(QuestionMode::TrueFalse);
/// let true_id = question.options[0].id.clone();
/// question.mark_correct(&true_id);
///
/// let quiz = Quiz::new("Rust basics", vec![question]);
/// assert_eq!(quiz.estimated_seconds(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            category: None,
            questions,
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn question_mut(&mut self, question_id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == question_id)
    }

    pub fn estimated_seconds(&self) -> u32 {
        self.questions.len() as u32 * SECONDS_PER_QUESTION
    }
}

/// One completed run through a quiz. Created once when the run finishes and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: String,
    /// Weak reference; the quiz may since have been edited or deleted.
    pub quiz_id: String,
    /// Title at completion time.
    pub quiz_title: String,
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    /// Milliseconds since the Unix epoch.
    pub finished_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_seconds: Option<u32>,
}

impl Attempt {
    pub fn selected_for(&self, question_id: &str) -> &[String] {
        self.answers
            .as_ref()
            .and_then(|answers| answers.get(question_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_mode_defaults_to_single() {
        let question: Question = serde_json::from_str(
            r#"{"id":"q","text":"t","options":[{"id":"a","text":"A","isCorrect":true}]}"#,
        )
        .unwrap();

        assert_eq!(question.mode, None);
        assert_eq!(question.effective_mode(), QuestionMode::Single);

        // Absent mode stays absent on the way back out.
        let json = serde_json::to_string(&question).unwrap();
        assert!(!json.contains("mode"));
    }

    #[test]
    fn true_false_mode_replaces_options() {
        let mut question = Question::new_single();
        question.options[0].text = "kept?".to_string();

        question.set_mode(QuestionMode::TrueFalse);

        let labels: Vec<&str> = question.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(labels, vec!["True", "False"]);
        assert!(question.options.iter().all(|o| !o.is_correct));
        assert_eq!(question.add_option(), None);
    }

    #[test]
    fn choice_mode_pads_to_three_options() {
        let mut question = Question::new_single();
        question.set_mode(QuestionMode::TrueFalse);
        question.set_mode(QuestionMode::Multiple);

        assert_eq!(question.options.len(), 3);
        assert_eq!(question.options[0].text, "True");
        assert_eq!(question.options[2].text, "");
    }

    #[test]
    fn mark_correct_toggles_only_for_multiple() {
        let mut question = Question::new_single();
        let a = question.options[0].id.clone();
        let b = question.options[1].id.clone();

        question.mark_correct(&a);
        question.mark_correct(&b);
        assert_eq!(question.correct_option_ids(), vec![b.as_str()]);

        question.set_mode(QuestionMode::Multiple);
        question.mark_correct(&a);
        assert_eq!(question.correct_option_ids(), vec![a.as_str(), b.as_str()]);
        question.mark_correct(&a);
        assert_eq!(question.correct_option_ids(), vec![b.as_str()]);
    }

    #[test]
    fn remove_option_reports_whether_anything_went() {
        let mut quiz = Quiz::new("Edits", vec![Question::new_single()]);
        let question_id = quiz.questions[0].id.clone();

        let question = quiz.question_mut(&question_id).unwrap();
        let added = question.add_option().unwrap();
        assert_eq!(question.options.len(), 4);

        assert!(question.remove_option(&added));
        assert!(!question.remove_option(&added));
        assert_eq!(question.options.len(), 3);

        question.set_mode(QuestionMode::TrueFalse);
        let true_id = question.options[0].id.clone();
        assert!(!question.remove_option(&true_id));
        assert_eq!(question.options.len(), 2);

        assert!(quiz.question_mut("missing").is_none());
        assert_eq!(quiz.question(&question_id).unwrap().options.len(), 2);
    }

    #[test]
    fn attempt_uses_camel_case_keys() {
        let attempt = Attempt {
            id: "a1".to_string(),
            quiz_id: "quiz".to_string(),
            quiz_title: "Quiz".to_string(),
            correct: 1,
            total: 2,
            percent: 50,
            finished_at: 1_700_000_000_000,
            duration_ms: Some(1200),
            answers: None,
            question_count: Some(2),
            estimated_seconds: None,
        };

        let value = serde_json::to_value(&attempt).unwrap();
        assert_eq!(value["quizId"], "quiz");
        assert_eq!(value["finishedAt"], 1_700_000_000_000u64);
        assert_eq!(value["durationMs"], 1200);
        assert!(value.get("answers").is_none());
        assert!(attempt.selected_for("q1").is_empty());
    }
}
