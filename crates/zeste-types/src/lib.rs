//! # zeste-types
//!
//! Shared domain types for the ZeSTE zero-shot topic classifier.
//!
//! This crate defines the data structures passed between the stores, the
//! expansion engine and the CLI:
//! - Relations: the fixed ConceptNet relation vocabulary and its inverses
//! - Records: one-hop graph records as persisted by the graph store
//! - Neighborhoods: expanded, similarity-annotated label neighborhoods
//! - Policies: filtering and scoring knobs
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use zeste_types::{RelationFilter, RelationKind};
//!
//! let filter: RelationFilter = "isa,relatedto".parse().unwrap();
//! assert!(filter.allows(&[RelationKind::IsA]));
//! ```

pub mod config;
pub mod error;
pub mod neighborhood;
pub mod policy;
pub mod record;
pub mod relation;
pub mod similarity;

pub use config::{ExpansionConfig, FilterConfig, ScoringConfig, Settings};
pub use error::TypesError;
pub use neighborhood::{Neighborhood, NeighborhoodEntry};
pub use policy::{KeepPolicy, Normalization, OovTokens};
pub use record::{GraphRecord, RecordEdge};
pub use relation::{RelationFilter, RelationKind};
pub use similarity::{SimilarityKind, SimilarityScores};

/// A normalized lowercase lexical token.
///
/// Multiword terms use underscores (`television_show`).
pub type Word = String;

/// Separator between the words of a multiword label (`music-art`).
pub const LABEL_WORD_SEPARATOR: char = '-';

/// Split a label into its constituent words.
///
/// Empty pieces are dropped, so `"space"` yields one word and `"a--b"` two.
pub fn label_words(label: &str) -> Vec<Word> {
    label
        .split(LABEL_WORD_SEPARATOR)
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_words_single() {
        assert_eq!(label_words("space"), vec!["space".to_string()]);
    }

    #[test]
    fn test_label_words_multi() {
        assert_eq!(
            label_words("Music-art"),
            vec!["music".to_string(), "art".to_string()]
        );
    }

    #[test]
    fn test_label_words_keeps_underscores() {
        assert_eq!(
            label_words("science_fiction"),
            vec!["science_fiction".to_string()]
        );
    }
}
