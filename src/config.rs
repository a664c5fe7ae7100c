//! Store configuration.
//!
//! Hosts either pass only a database name to [`create_db`](crate::create_db),
//! which uses the defaults below, or a JSON document to
//! [`create_db_with_config`](crate::create_db_with_config):
//!
//! ```json
//! { "name": "quizzes_db", "map_size": 10485760, "seed_policy": "on_startup" }
//! ```

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// When the built-in quiz is (re)inserted into the quiz collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Every collection read ensures the built-in quiz exists.
    #[default]
    OnRead,
    /// Only opening the database ensures it; reads return what is stored.
    OnStartup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database name; LMDB files live in `<name>.lmdb/`.
    pub name: String,
    #[serde(default = "default_map_size")]
    pub map_size: usize,
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_size: DEFAULT_MAP_SIZE,
            seed_policy: SeedPolicy::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.name.trim().is_empty() {
            return Err(AppResponse::BadRequest("Database name must not be empty".to_string()));
        }
        if self.map_size == 0 {
            return Err(AppResponse::BadRequest("map_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn lmdb_dir(&self) -> String {
        format!("{}.lmdb", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = StoreConfig::from_json(r#"{"name":"quiz_db"}"#).unwrap();
        assert_eq!(config, StoreConfig::new("quiz_db"));
        assert_eq!(config.lmdb_dir(), "quiz_db.lmdb");
    }

    #[test]
    fn explicit_seed_policy_is_parsed() {
        let config =
            StoreConfig::from_json(r#"{"name":"db","map_size":4096,"seed_policy":"on_startup"}"#)
                .unwrap();
        assert_eq!(config.seed_policy, SeedPolicy::OnStartup);
        assert_eq!(config.map_size, 4096);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = StoreConfig::from_json(r#"{"name":"  "}"#).unwrap_err();
        assert!(matches!(err, AppResponse::BadRequest(_)));

        let err = StoreConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, AppResponse::SerializationError(_)));
    }
}
