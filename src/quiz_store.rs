//! Durable quiz collection.
//!
//! All quizzes live as one JSON array under [`QUIZZES_KEY`]. Every operation is
//! a full read-modify-write of that array; there is no coordination between
//! concurrent writers sharing the same namespace.

use log::info;

use crate::app_response::AppResponse;
use crate::config::SeedPolicy;
use crate::quiz_model::{AnswerOption, Question, QuestionMode, Quiz};
use crate::storage_port::{read_collection, KeyValueStore};

pub const QUIZZES_KEY: &str = "quizzes";

/// Id of the built-in quiz every store is seeded with.
pub const DEFAULT_QUIZ_ID: &str = "mlp-quiz-1";

pub struct QuizStore<S> {
    store: S,
    seed_policy: SeedPolicy,
}

impl<S: KeyValueStore> QuizStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, SeedPolicy::OnRead)
    }

    pub fn with_policy(store: S, seed_policy: SeedPolicy) -> Self {
        Self { store, seed_policy }
    }

    /// Returns every stored quiz in insertion order.
    ///
    /// Under [`SeedPolicy::OnRead`] this first ensures the built-in quiz is
    /// present, so the first read of an empty store returns exactly that quiz.
    /// Only a failed seeding write can make this return an error.
    pub fn get_all_quizzes(&self) -> Result<Vec<Quiz>, AppResponse> {
        match self.seed_policy {
            SeedPolicy::OnRead => self.ensure_default_quiz(),
            SeedPolicy::OnStartup => Ok(self.read_all()),
        }
    }

    pub fn get_quiz_by_id(&self, id: &str) -> Result<Option<Quiz>, AppResponse> {
        Ok(self.get_all_quizzes()?.into_iter().find(|q| q.id == id))
    }

    /// Inserts `quiz`, or replaces the stored quiz with the same id in place.
    /// No validation happens here.
    pub fn save_quiz(&self, quiz: Quiz) -> Result<(), AppResponse> {
        let mut quizzes = self.get_all_quizzes()?;

        match quizzes.iter_mut().find(|q| q.id == quiz.id) {
            Some(existing) => *existing = quiz,
            None => quizzes.push(quiz),
        }

        self.write_all(&quizzes)
    }

    pub fn delete_quiz(&self, id: &str) -> Result<(), AppResponse> {
        let mut quizzes = self.get_all_quizzes()?;
        quizzes.retain(|q| q.id != id);
        self.write_all(&quizzes)
    }

    /// Seeds the built-in quiz if it is missing and returns the resulting
    /// collection. An empty store is replaced by the built-in quiz alone;
    /// otherwise it is appended after the stored quizzes.
    pub fn ensure_default_quiz(&self) -> Result<Vec<Quiz>, AppResponse> {
        let mut quizzes = self.read_all();

        if quizzes.iter().any(|q| q.id == DEFAULT_QUIZ_ID) {
            return Ok(quizzes);
        }

        if quizzes.is_empty() {
            info!("Quiz store is empty; seeding built-in quiz {DEFAULT_QUIZ_ID}");
        } else {
            info!("Built-in quiz {DEFAULT_QUIZ_ID} missing; appending it");
        }

        quizzes.push(default_quiz());
        self.write_all(&quizzes)?;
        Ok(quizzes)
    }

    fn read_all(&self) -> Vec<Quiz> {
        read_collection(&self.store, QUIZZES_KEY)
    }

    fn write_all(&self, quizzes: &[Quiz]) -> Result<(), AppResponse> {
        let json = serde_json::to_string(quizzes)?;
        self.store
            .set(QUIZZES_KEY, &json)
            .map_err(AppResponse::into_storage_error)
    }
}

fn question(id: &str, text: &str, mode: QuestionMode, options: &[(&str, bool)]) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        mode: Some(mode),
        options: options
            .iter()
            .enumerate()
            .map(|(idx, (text, is_correct))| AnswerOption {
                id: format!("{id}o{}", idx + 1),
                text: text.to_string(),
                is_correct: *is_correct,
            })
            .collect(),
    }
}

/// The built-in quiz: eleven questions covering all three modes.
pub fn default_quiz() -> Quiz {
    use QuestionMode::{Multiple, Single, TrueFalse};

    Quiz {
        id: DEFAULT_QUIZ_ID.to_string(),
        title: "My Little Pony Quiz".to_string(),
        description: Some("How well do you know the world of Equestria?".to_string()),
        category: Some("Cartoons".to_string()),
        questions: vec![
            question(
                "q1",
                "Who is the Princess of Friendship?",
                Single,
                &[("Twilight Sparkle", true), ("Pinkie Pie", false), ("Fluttershy", false)],
            ),
            question(
                "q2",
                "What is Rainbow Dash known for?",
                Single,
                &[("Baking cupcakes", false), ("Flying fast", true), ("Making dresses", false)],
            ),
            question(
                "q3",
                "Which pony loves parties the most?",
                Single,
                &[("Applejack", false), ("Pinkie Pie", true), ("Rarity", false)],
            ),
            question(
                "q4",
                "Twilight Sparkle has a dragon assistant.",
                TrueFalse,
                &[("True", true), ("False", false)],
            ),
            question(
                "q5",
                "Which of these are elements of harmony? (Select all that apply)",
                Multiple,
                &[("Loyalty", true), ("Kindness", true), ("Greed", false), ("Honesty", true)],
            ),
            question(
                "q6",
                "The capital of Equestria is Ponyville.",
                TrueFalse,
                &[("True", false), ("False", true)],
            ),
            question(
                "q7",
                "What is Fluttershy's special talent?",
                Single,
                &[
                    ("Animal care", true),
                    ("Weather control", false),
                    ("Apple farming", false),
                    ("Fashion design", false),
                ],
            ),
            question(
                "q8",
                "Select all the alicorn princesses:",
                Multiple,
                &[
                    ("Twilight Sparkle", true),
                    ("Celestia", true),
                    ("Luna", true),
                    ("Cadance", true),
                    ("Rainbow Dash", false),
                ],
            ),
            question(
                "q9",
                "Spike is a baby dragon.",
                TrueFalse,
                &[("True", true), ("False", false)],
            ),
            question(
                "q10",
                "Which pony represents the element of Generosity?",
                Single,
                &[
                    ("Rarity", true),
                    ("Applejack", false),
                    ("Pinkie Pie", false),
                    ("Fluttershy", false),
                ],
            ),
            question(
                "q11",
                "The Cutie Mark Crusaders are searching for their cutie marks. \
                 (Select all that apply)",
                Multiple,
                &[
                    ("Apple Bloom", true),
                    ("Sweetie Belle", true),
                    ("Scootaloo", true),
                    ("Diamond Tiara", false),
                ],
            ),
        ],
    }
}
