use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Result envelope shared by the stores, the session flow and the FFI layer.
///
/// Everything except `Ok` is an error; `Ok` carries a JSON payload when it
/// crosses the FFI boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    /// A write could not be persisted (closed environment, map full, I/O).
    StorageError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::StorageError(msg) => write!(f, "Could not save: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found".to_string()),
            LmdbError::MapFull => {
                AppResponse::StorageError("Storage capacity exceeded".to_string())
            }
            LmdbError::Corrupted | LmdbError::Panic => {
                AppResponse::DatabaseError(format!("Database is corrupted: {}", err))
            }
            other => AppResponse::DatabaseError(format!("LMDB error: {}", other)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AppResponse::Ok(_))
    }

    /// Re-tags a failed write so callers see a recoverable "could not save".
    pub fn into_storage_error(self) -> Self {
        match self {
            AppResponse::DatabaseError(msg) => AppResponse::StorageError(msg),
            other => other,
        }
    }
}
