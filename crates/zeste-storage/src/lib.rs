//! Storage layer for ZeSTE.
//!
//! Provides file-backed storage with:
//! - One JSON record per word for the relation graph, hot records in an LRU
//! - A content-addressed disk cache with atomic writes (temp file + rename)
//! - Path-safe word keys (percent-encoded file names)
//! - Offline import of ConceptNet assertion dumps into graph records

pub mod disk_cache;
pub mod error;
pub mod graph;
pub mod import;
pub mod keys;

pub use disk_cache::DiskCache;
pub use error::StorageError;
pub use graph::{FileGraphStore, MemoryGraph, RelationGraph};
pub use import::{ImportStats, Importer};
pub use keys::WordKey;
