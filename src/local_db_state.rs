use std::path::Path;

use lmdb::{Database, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::attempt_store::AttemptStore;
use crate::config::{SeedPolicy, StoreConfig};
use crate::quiz_store::QuizStore;
use crate::storage_port::KeyValueStore;

/// LMDB-backed key-value namespace holding the quiz and attempt collections.
///
/// The environment lives in `<name>.lmdb/`. Values are the JSON documents the
/// stores write; keys are the fixed collection keys.
pub struct AppDbState {
    env: Option<Environment>,
    db: Database,
    config: StoreConfig,
}

impl AppDbState {
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::init_with_config(StoreConfig::new(name))
    }

    /// Opens (creating if needed) the environment and, under
    /// [`SeedPolicy::OnStartup`], makes sure the built-in quiz is present.
    pub fn init_with_config(config: StoreConfig) -> Result<Self, AppResponse> {
        config.validate()?;

        let dir = config.lmdb_dir();
        std::fs::create_dir_all(&dir).map_err(|e| {
            AppResponse::DatabaseError(format!("Cannot create database directory {dir}: {e}"))
        })?;

        let env = Environment::new()
            .set_map_size(config.map_size)
            .open(Path::new(&dir))?;
        let db = env.open_db(None)?;

        info!("Opened quiz database at {dir}");

        let state = Self {
            env: Some(env),
            db,
            config,
        };

        if state.config.seed_policy == SeedPolicy::OnStartup {
            state.quizzes().ensure_default_quiz()?;
        }

        Ok(state)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    pub fn quizzes(&self) -> QuizStore<&Self> {
        QuizStore::with_policy(self, self.config.seed_policy)
    }

    pub fn attempts(&self) -> AttemptStore<&Self> {
        AttemptStore::new(self)
    }

    /// Drops the LMDB environment. Later calls fail with a `DatabaseError`.
    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        match self.env.take() {
            Some(env) => {
                if let Err(e) = env.sync(true) {
                    warn!("Failed to sync LMDB environment before closing: {e}");
                }
                info!("Closed quiz database {}", self.config.lmdb_dir());
                Ok(())
            }
            None => Err(AppResponse::DatabaseError("Database is already closed".to_string())),
        }
    }

    fn env(&self) -> Result<&Environment, AppResponse> {
        self.env
            .as_ref()
            .ok_or_else(|| AppResponse::DatabaseError("Database is closed".to_string()))
    }
}

impl KeyValueStore for AppDbState {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let env = self.env()?;
        let txn = env.begin_ro_txn()?;

        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Value under '{key}' is not UTF-8: {e}"))
            })?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        txn.commit()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let env = self.env().map_err(AppResponse::into_storage_error)?;
        let write = || -> Result<(), lmdb::Error> {
            let mut txn = env.begin_rw_txn()?;
            txn.put(self.db, &key, &value, WriteFlags::empty())?;
            txn.commit()
        };

        write().map_err(|e| {
            warn!("Failed to write '{key}' ({} bytes): {e}", value.len());
            AppResponse::from(e).into_storage_error()
        })?;
        debug!("Wrote '{key}' ({} bytes)", value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        let env = self.env().map_err(AppResponse::into_storage_error)?;
        let remove = || -> Result<(), lmdb::Error> {
            let mut txn = env.begin_rw_txn()?;
            match txn.del(self.db, &key, None) {
                Ok(()) | Err(lmdb::Error::NotFound) => {}
                Err(e) => return Err(e),
            }
            txn.commit()
        };

        remove().map_err(|e| {
            warn!("Failed to remove '{key}': {e}");
            AppResponse::from(e).into_storage_error()
        })?;
        debug!("Removed '{key}'");
        Ok(())
    }
}
