//! Read models for reviewing past attempts and listing results history.

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::attempt_store::AttemptStore;
use crate::quiz_model::{Attempt, Question, QuestionMode, Quiz};
use crate::quiz_store::QuizStore;
use crate::storage_port::KeyValueStore;

pub const QUIZ_MISSING_MESSAGE: &str = "Quiz no longer exists.";

const MISSING_VALUE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
    /// The option is a correct answer, whether or not it was chosen.
    Correct,
    /// Chosen but wrong.
    Incorrect,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionReview {
    pub option_id: String,
    pub text: String,
    pub selected: bool,
    pub state: OptionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    pub question_id: String,
    pub position: usize,
    pub text: String,
    pub mode: QuestionMode,
    pub options: Vec<OptionReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReview {
    pub attempt: Attempt,
    pub quiz_title: String,
    pub questions: Vec<QuestionReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    AttemptNotFound,
    /// The attempt exists but its quiz was deleted since. `message` is
    /// [`QUIZ_MISSING_MESSAGE`], ready for display.
    QuizMissing { attempt: Attempt, message: String },
    Ready(AttemptReview),
}

/// Looks up an attempt and the quiz it refers to, as currently stored.
pub fn review_attempt<Q, A>(
    quizzes: &QuizStore<Q>,
    attempts: &AttemptStore<A>,
    attempt_id: &str,
) -> Result<ReviewOutcome, AppResponse>
where
    Q: KeyValueStore,
    A: KeyValueStore,
{
    let Some(attempt) = attempts.get_attempt_by_id(attempt_id) else {
        return Ok(ReviewOutcome::AttemptNotFound);
    };

    Ok(match quizzes.get_quiz_by_id(&attempt.quiz_id)? {
        Some(quiz) => ReviewOutcome::Ready(build_review(&quiz, attempt)),
        None => ReviewOutcome::QuizMissing {
            attempt,
            message: QUIZ_MISSING_MESSAGE.to_string(),
        },
    })
}

pub fn build_review(quiz: &Quiz, attempt: Attempt) -> AttemptReview {
    let questions = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(idx, q)| review_question(idx + 1, q, attempt.selected_for(&q.id)))
        .collect();

    AttemptReview {
        quiz_title: quiz.title.clone(),
        attempt,
        questions,
    }
}

fn review_question(position: usize, question: &Question, selected: &[String]) -> QuestionReview {
    let options = question
        .options
        .iter()
        .map(|o| {
            let is_selected = selected.iter().any(|id| *id == o.id);
            let state = match (o.is_correct, is_selected) {
                (true, _) => OptionState::Correct,
                (false, true) => OptionState::Incorrect,
                (false, false) => OptionState::Muted,
            };
            OptionReview {
                option_id: o.id.clone(),
                text: o.text.clone(),
                selected: is_selected,
                state,
            }
        })
        .collect();

    QuestionReview {
        question_id: question.id.clone(),
        position,
        text: question.text.clone(),
        mode: question.effective_mode(),
        options,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub attempt_id: String,
    pub quiz_title: String,
    /// "correct/total"
    pub result: String,
    pub percent: u32,
    pub duration: String,
    pub estimate: String,
    pub finished_at: u64,
}

/// Attempts newest first, formatted for a results table.
pub fn results_history(attempts: &[Attempt]) -> Vec<HistoryEntry> {
    let mut sorted: Vec<&Attempt> = attempts.iter().collect();
    sorted.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));

    sorted
        .into_iter()
        .map(|a| HistoryEntry {
            attempt_id: a.id.clone(),
            quiz_title: a.quiz_title.clone(),
            result: format!("{}/{}", a.correct, a.total),
            percent: a.percent,
            duration: format_duration(a.duration_ms),
            estimate: format_estimate(a.estimated_seconds),
            finished_at: a.finished_at,
        })
        .collect()
}

/// `mm:ss`, or a dash when the duration was not recorded.
pub fn format_duration(duration_ms: Option<u64>) -> String {
    match duration_ms {
        Some(ms) => {
            let total_seconds = ms / 1000;
            format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
        }
        None => MISSING_VALUE.to_string(),
    }
}

pub fn format_estimate(seconds: Option<u32>) -> String {
    match seconds {
        Some(seconds) if seconds > 0 => {
            let minutes = seconds / 60;
            let rest = seconds % 60;
            if minutes > 0 {
                format!("{minutes}m {rest}s")
            } else {
                format!("{rest}s")
            }
        }
        _ => MISSING_VALUE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_and_estimates_format_like_the_results_table() {
        assert_eq!(format_duration(None), "—");
        assert_eq!(format_duration(Some(0)), "00:00");
        assert_eq!(format_duration(Some(65_999)), "01:05");
        assert_eq!(format_duration(Some(3_600_000)), "60:00");

        assert_eq!(format_estimate(None), "—");
        assert_eq!(format_estimate(Some(0)), "—");
        assert_eq!(format_estimate(Some(45)), "45s");
        assert_eq!(format_estimate(Some(165)), "2m 45s");
        assert_eq!(format_estimate(Some(120)), "2m 0s");
    }
}
