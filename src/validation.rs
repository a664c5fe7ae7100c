//! Authoring-time checks run before a quiz is handed to the store.
//!
//! The store itself never validates. Messages identify questions by their
//! 1-based position, the way an authoring form lists them.

use crate::app_response::AppResponse;
use crate::quiz_model::{QuestionMode, Quiz, FALSE_LABEL, TRUE_LABEL};

pub fn validate_quiz(quiz: &Quiz) -> Result<(), AppResponse> {
    if quiz.title.trim().is_empty() {
        return invalid("Please enter a quiz title.");
    }
    if quiz.questions.is_empty() {
        return invalid("Add at least one question.");
    }

    for (idx, question) in quiz.questions.iter().enumerate() {
        let position = idx + 1;

        if question.text.trim().is_empty() {
            return invalid(format!("Question #{position} has empty text."));
        }
        if question.options.len() < 2 {
            return invalid(format!(
                "Question #{position} must have at least 2 answer options."
            ));
        }
        if !question.options.iter().any(|o| o.is_correct) {
            return invalid(format!(
                "Question #{position} has no correct answer selected."
            ));
        }
        if question.options.iter().any(|o| o.text.trim().is_empty()) {
            return invalid(format!("Question #{position} has an empty answer option."));
        }
        if question.effective_mode() == QuestionMode::TrueFalse {
            let labels: Vec<&str> = question.options.iter().map(|o| o.text.as_str()).collect();
            if labels != [TRUE_LABEL, FALSE_LABEL] {
                return invalid(format!(
                    "Question #{position} must have exactly the options True and False."
                ));
            }
        }
    }

    Ok(())
}

/// Trims the title and drops blank description/category before saving.
pub fn normalize_for_save(mut quiz: Quiz) -> Quiz {
    quiz.title = quiz.title.trim().to_string();
    quiz.description = non_blank(quiz.description);
    quiz.category = non_blank(quiz.category);
    quiz
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(msg: impl Into<String>) -> Result<(), AppResponse> {
    Err(AppResponse::ValidationError(msg.into()))
}
