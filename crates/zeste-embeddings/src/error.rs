//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while loading embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line in the embedding table
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Dimension mismatch
    #[error("Dimension mismatch at line {line}: expected {expected}, got {actual}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// Table contained no vectors
    #[error("Embedding table is empty: {0}")]
    Empty(String),
}
