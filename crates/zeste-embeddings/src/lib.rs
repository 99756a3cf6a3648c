//! # zeste-embeddings
//!
//! Read-only word embedding lookup for ZeSTE.
//!
//! Label neighborhoods are annotated with cosine similarities between words.
//! This crate loads a precomputed table (ConceptNet Numberbatch in word2vec
//! text format) once per process and answers `has` / `similarity` queries.
//!
//! ## Features
//! - word2vec text format, with or without the `count dim` header
//! - Multilingual Numberbatch: `/c/en/` terms kept, other languages skipped
//! - Vectors normalized at load so cosine similarity is a dot product
//! - `EmbeddingStore` trait so tests and callers can inject their own tables

pub mod error;
pub mod model;
pub mod table;

pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingStore};
pub use table::EmbeddingTable;
