//! Scoring of submitted answers against a quiz definition.
//!
//! Grading is pure: no storage, no clock. A question counts as correct only
//! when the selected option ids are exactly the set of correct option ids, in
//! every mode. There is no partial credit, and a question without any correct
//! option can never be answered correctly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::quiz_model::{AnswerMap, Question, Quiz};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub selected: Vec<String>,
    pub correct_ids: Vec<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedGrade {
    #[serde(flatten)]
    pub result: GradeResult,
    pub questions: Vec<QuestionOutcome>,
}

/// `round(100 * correct / total)` with halves rounded up; `0` for an empty quiz.
pub fn percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (correct, total) = (u64::from(correct), u64::from(total));
    ((200 * correct + total) / (2 * total)) as u32
}

pub fn grade_question(question: &Question, selected: &[String]) -> bool {
    if selected.is_empty() {
        return false;
    }

    let correct: BTreeSet<&str> = question.correct_option_ids().into_iter().collect();
    if correct.is_empty() {
        return false;
    }

    // A repeated id makes the selection larger than the set it names.
    if selected.len() != correct.len() {
        return false;
    }

    let chosen: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    chosen == correct
}

pub fn grade(quiz: &Quiz, answers: &AnswerMap) -> GradeResult {
    let correct = quiz
        .questions
        .iter()
        .filter(|q| grade_question(q, selected_for(answers, &q.id)))
        .count() as u32;
    let total = quiz.questions.len() as u32;

    GradeResult {
        correct,
        total,
        percent: percent(correct, total),
    }
}

/// Same score as [`grade`], with the outcome of every question attached.
pub fn grade_detailed(quiz: &Quiz, answers: &AnswerMap) -> DetailedGrade {
    let questions: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .map(|q| {
            let selected = selected_for(answers, &q.id);
            QuestionOutcome {
                question_id: q.id.clone(),
                selected: selected.to_vec(),
                correct_ids: q.correct_option_ids().into_iter().map(str::to_string).collect(),
                is_correct: grade_question(q, selected),
            }
        })
        .collect();

    let correct = questions.iter().filter(|o| o.is_correct).count() as u32;
    let total = questions.len() as u32;

    DetailedGrade {
        result: GradeResult {
            correct,
            total,
            percent: percent(correct, total),
        },
        questions,
    }
}

fn selected_for<'a>(answers: &'a AnswerMap, question_id: &str) -> &'a [String] {
    answers.get(question_id).map(Vec::as_slice).unwrap_or(&[])
}
