//! Core error types.

use thiserror::Error;

/// Errors that can occur while building or scoring neighborhoods.
#[derive(Debug, Error)]
pub enum ZesteError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] zeste_storage::StorageError),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] zeste_embeddings::EmbeddingError),

    /// Domain type or configuration error
    #[error(transparent)]
    Types(#[from] zeste_types::TypesError),

    /// Label has more words than allowed
    #[error("Too many words in label '{label}': {count} (max {max})")]
    TooManyLabelWords {
        label: String,
        count: usize,
        max: usize,
    },

    /// Label has no words
    #[error("Empty label")]
    EmptyLabel,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
