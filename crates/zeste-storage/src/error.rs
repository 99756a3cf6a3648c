//! Storage layer error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache root could not be created; the tier is unusable
    #[error("Cache unavailable at {path}: {source}")]
    CacheUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Graph root does not exist
    #[error("Graph store not found: {0}")]
    GraphNotFound(PathBuf),

    /// Key encoding/decoding error
    #[error("Key error: {0}")]
    Key(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// In-memory record cache lock was poisoned
    #[error("Record cache lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
