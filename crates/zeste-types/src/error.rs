//! Error types for shared ZeSTE types.

use thiserror::Error;

/// Errors raised while parsing or loading shared types.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Relation code outside the known vocabulary
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
