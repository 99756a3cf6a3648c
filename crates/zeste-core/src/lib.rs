//! # zeste-core
//!
//! Zero-shot topic classification over a lexical knowledge graph.
//!
//! A label is scored against a document through its semantic neighborhood:
//! every word reachable from the label within a few ConceptNet hops,
//! annotated with embedding similarities. Tokens of the document that fall
//! inside the neighborhood contribute their similarity to the score, and the
//! relation chain that brought them in explains why.
//!
//! ## Features
//! - Bounded breadth-first expansion with four similarity variants
//! - Two-tier disk cache (per-word prefetch, per-label final)
//! - Relation and top-N / top-P% / threshold pruning
//! - Document scoring with optional n-gram augmentation
//! - Path explanations up to two hops
//! - Per-label failure isolation and cross-label normalization

pub mod cache;
pub mod classifier;
pub mod error;
pub mod expander;
pub mod explain;
pub mod filter;
pub mod ngrams;
pub mod preprocess;
pub mod scorer;

#[cfg(test)]
mod proptests;

pub use cache::{label_fingerprint, NeighborhoodCache};
pub use classifier::{Classifier, ClassifierConfig, Explanation, Highlight, ScoreRecord};
pub use error::ZesteError;
pub use expander::Expander;
pub use explain::{best_path, Path};
pub use filter::filter;
pub use ngrams::NgramCollector;
pub use preprocess::{is_stopword, Lemmatizer, Preprocessor};
pub use scorer::{augment_tokens, normalize_scores, Scorer};
