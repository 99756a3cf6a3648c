//! One-hop graph records.
//!
//! The relation graph store persists one record per word: the word's direct
//! neighbors, the relation kinds linking them, and the embedding similarity
//! precomputed at import time.

use serde::{Deserialize, Serialize};

use crate::relation::RelationKind;
use crate::Word;

/// A direct neighbor inside a graph record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEdge {
    /// Neighbor word
    pub word: Word,
    /// Relation kinds, each read as `neighbor --kind--> record word`
    pub rels: Vec<RelationKind>,
    /// Cosine similarity between record word and neighbor (0.0 when OOV)
    pub sim: f32,
}

/// One-hop neighborhood of a single word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// The record's own word
    pub word: Word,
    /// Neighbors in stored order; the word itself comes first as `sameas`
    pub neighbors: Vec<RecordEdge>,
}

impl GraphRecord {
    /// Create a record holding only the self entry.
    pub fn new(word: impl Into<Word>) -> Self {
        let word = word.into();
        Self {
            neighbors: vec![RecordEdge {
                word: word.clone(),
                rels: vec![RelationKind::SameAs],
                sim: 1.0,
            }],
            word,
        }
    }

    /// Add a relation to `neighbor`, merging with an existing edge.
    pub fn add_relation(&mut self, neighbor: &str, kind: RelationKind, sim: f32) {
        match self.neighbors.iter_mut().find(|e| e.word == neighbor) {
            Some(edge) => {
                if !edge.rels.contains(&kind) {
                    edge.rels.push(kind);
                }
            }
            None => self.neighbors.push(RecordEdge {
                word: neighbor.to_string(),
                rels: vec![kind],
                sim,
            }),
        }
    }

    /// Look up the edge to `neighbor`.
    pub fn get(&self, neighbor: &str) -> Option<&RecordEdge> {
        self.neighbors.iter().find(|e| e.word == neighbor)
    }

    /// Number of neighbors, self entry included.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_self_entry() {
        let record = GraphRecord::new("space");
        assert_eq!(record.len(), 1);
        let me = record.get("space").unwrap();
        assert_eq!(me.rels, vec![RelationKind::SameAs]);
        assert_eq!(me.sim, 1.0);
    }

    #[test]
    fn test_add_relation_merges_kinds() {
        let mut record = GraphRecord::new("space");
        record.add_relation("star", RelationKind::AtLocation, 0.4);
        record.add_relation("star", RelationKind::RelatedTo, 0.9);
        record.add_relation("star", RelationKind::AtLocation, 0.9);

        let star = record.get("star").unwrap();
        assert_eq!(
            star.rels,
            vec![RelationKind::AtLocation, RelationKind::RelatedTo]
        );
        // First similarity wins
        assert!((star.sim - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_record_bytes_roundtrip() {
        let mut record = GraphRecord::new("space");
        record.add_relation("star", RelationKind::AtLocation, 0.4);
        let decoded = GraphRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(record, decoded);
    }
}
