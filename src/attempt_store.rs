//! Append-only attempt log stored as one JSON array under [`ATTEMPTS_KEY`].

use crate::app_response::AppResponse;
use crate::quiz_model::Attempt;
use crate::storage_port::{read_collection, KeyValueStore};

pub const ATTEMPTS_KEY: &str = "quiz_attempts";

pub struct AttemptStore<S> {
    store: S,
}

impl<S: KeyValueStore> AttemptStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends `attempt`. Ids are not checked for duplicates.
    pub fn save_attempt(&self, attempt: Attempt) -> Result<(), AppResponse> {
        let mut attempts = self.read_all();
        attempts.push(attempt);

        let json = serde_json::to_string(&attempts)?;
        self.store
            .set(ATTEMPTS_KEY, &json)
            .map_err(AppResponse::into_storage_error)
    }

    pub fn get_attempt_by_id(&self, id: &str) -> Option<Attempt> {
        self.read_all().into_iter().find(|a| a.id == id)
    }

    /// All attempts in the order they were saved.
    pub fn get_all_attempts(&self) -> Vec<Attempt> {
        self.read_all()
    }

    pub fn clear_attempts(&self) -> Result<(), AppResponse> {
        self.store
            .remove(ATTEMPTS_KEY)
            .map_err(AppResponse::into_storage_error)
    }

    fn read_all(&self) -> Vec<Attempt> {
        read_collection(&self.store, ATTEMPTS_KEY)
    }
}
