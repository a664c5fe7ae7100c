//! In-memory state of one run through a quiz.
//!
//! A [`QuizSession`] collects selections under the per-mode rules (replace for
//! single and true/false, toggle for multiple) and turns them into an
//! [`Attempt`] once every question has been answered.

use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::app_response::AppResponse;
use crate::grading::{grade, GradeResult};
use crate::quiz_model::{new_id, AnswerMap, Attempt, QuestionMode, Quiz};

pub const INCOMPLETE_MESSAGE: &str = "Please answer all questions before finishing.";

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Attempt {
    pub fn from_grade(
        quiz: &Quiz,
        result: GradeResult,
        answers: AnswerMap,
        finished_at: u64,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            id: new_id(),
            quiz_id: quiz.id.clone(),
            quiz_title: quiz.title.clone(),
            correct: result.correct,
            total: result.total,
            percent: result.percent,
            finished_at,
            duration_ms,
            answers: Some(answers),
            question_count: Some(result.total),
            estimated_seconds: Some(quiz.estimated_seconds()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    answers: AnswerMap,
    started_at: u64,
    require_complete: bool,
}

impl QuizSession {
    pub fn start(quiz: Quiz) -> Self {
        Self::start_at(quiz, now_ms())
    }

    pub fn start_at(quiz: Quiz, started_at: u64) -> Self {
        Self {
            quiz,
            answers: AnswerMap::new(),
            started_at,
            require_complete: true,
        }
    }

    /// Allows finishing with unanswered questions; they grade as incorrect.
    pub fn allow_incomplete(mut self) -> Self {
        self.require_complete = false;
        self
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn selected(&self, question_id: &str) -> &[String] {
        self.answers
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Applies one click on `option_id` and returns the question's new selection.
    pub fn select(&mut self, question_id: &str, option_id: &str) -> Result<&[String], AppResponse> {
        let question = self.quiz.question(question_id).ok_or_else(|| {
            AppResponse::NotFound(format!("No question with id {question_id} in this quiz"))
        })?;

        if question.option(option_id).is_none() {
            return Err(AppResponse::NotFound(format!(
                "No option with id {option_id} in question {question_id}"
            )));
        }

        let mode = question.effective_mode();
        let current = self.answers.entry(question_id.to_string()).or_default();

        match mode {
            QuestionMode::Multiple => {
                if let Some(pos) = current.iter().position(|id| id == option_id) {
                    current.remove(pos);
                } else {
                    current.push(option_id.to_string());
                }
            }
            QuestionMode::Single | QuestionMode::TrueFalse => {
                *current = vec![option_id.to_string()];
            }
        }

        Ok(current.as_slice())
    }

    /// Ids of questions with nothing selected, in quiz order.
    pub fn unanswered(&self) -> Vec<&str> {
        self.quiz
            .questions
            .iter()
            .filter(|q| self.selected(&q.id).is_empty())
            .map(|q| q.id.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.unanswered().is_empty()
    }

    pub fn finish(self) -> Result<Attempt, AppResponse> {
        self.finish_at(now_ms())
    }

    /// Grades the session and builds the attempt to persist.
    pub fn finish_at(self, finished_at: u64) -> Result<Attempt, AppResponse> {
        if self.require_complete && !self.is_complete() {
            return Err(AppResponse::ValidationError(INCOMPLETE_MESSAGE.to_string()));
        }

        let result = grade(&self.quiz, &self.answers);
        let duration_ms = finished_at.saturating_sub(self.started_at);

        debug!(
            "Finished quiz {} with {}/{} correct",
            self.quiz.id, result.correct, result.total
        );

        Ok(Attempt::from_grade(
            &self.quiz,
            result,
            self.answers,
            finished_at,
            Some(duration_ms),
        ))
    }
}
