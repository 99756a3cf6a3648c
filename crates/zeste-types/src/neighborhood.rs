//! Expanded label neighborhoods.
//!
//! A neighborhood maps every word reachable from a seed within the configured
//! depth to its provenance and similarity scores. Insertion order is kept: it
//! breaks ties when filtering and survives the disk cache because the
//! neighborhood serializes as an ordered list of `(word, entry)` pairs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::relation::RelationKind;
use crate::similarity::{SimilarityKind, SimilarityScores};
use crate::Word;

/// Provenance and similarity of one word inside a neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodEntry {
    /// Words through which this word was reached, in discovery order
    pub from: Vec<Word>,
    /// Relation kinds per provenance word, parallel to `from`
    pub rels: Vec<Vec<RelationKind>>,
    /// Similarity variants
    pub sim: SimilarityScores,
}

impl NeighborhoodEntry {
    /// Entry reached through a single provenance edge.
    pub fn new(from: impl Into<Word>, rels: Vec<RelationKind>, sim: SimilarityScores) -> Self {
        Self {
            from: vec![from.into()],
            rels: vec![rels],
            sim,
        }
    }

    /// Record another provenance edge, keeping the max of each variant.
    pub fn add_provenance(
        &mut self,
        from: impl Into<Word>,
        rels: Vec<RelationKind>,
        sim: &SimilarityScores,
    ) {
        self.from.push(from.into());
        self.rels.push(rels);
        self.sim.absorb(sim);
    }

    /// Relation kinds recorded for the edge coming from `word`.
    pub fn rels_from(&self, word: &str) -> Option<&[RelationKind]> {
        self.from
            .iter()
            .position(|w| w == word)
            .and_then(|i| self.rels.get(i))
            .map(|r| r.as_slice())
    }

    /// Whether `word` is one of the provenance words.
    pub fn reached_from(&self, word: &str) -> bool {
        self.from.iter().any(|w| w == word)
    }

    /// Every relation kind on any provenance edge.
    pub fn all_rels(&self) -> impl Iterator<Item = &RelationKind> {
        self.rels.iter().flatten()
    }
}

/// Insertion-ordered mapping from word to neighborhood entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Word, NeighborhoodEntry)>", into = "Vec<(Word, NeighborhoodEntry)>")]
pub struct Neighborhood {
    order: Vec<Word>,
    entries: HashMap<Word, NeighborhoodEntry>,
}

impl Neighborhood {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&NeighborhoodEntry> {
        self.entries.get(word)
    }

    pub fn get_mut(&mut self, word: &str) -> Option<&mut NeighborhoodEntry> {
        self.entries.get_mut(word)
    }

    /// Insert a new word at the end of the order.
    ///
    /// Returns `false` and leaves the neighborhood untouched if the word is
    /// already present.
    pub fn insert(&mut self, word: impl Into<Word>, entry: NeighborhoodEntry) -> bool {
        let word = word.into();
        if self.entries.contains_key(&word) {
            return false;
        }
        self.order.push(word.clone());
        self.entries.insert(word, entry);
        true
    }

    /// Similarity of `word` for one variant, 0.0 when absent.
    pub fn similarity(&self, word: &str, kind: SimilarityKind) -> f32 {
        self.entries.get(word).map(|e| e.sim.get(kind)).unwrap_or(0.0)
    }

    /// Words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.order.iter()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &NeighborhoodEntry)> {
        self.order
            .iter()
            .filter_map(move |w| self.entries.get(w).map(|e| (w, e)))
    }

    /// Sum of one variant over every word, in insertion order.
    pub fn total(&self, kind: SimilarityKind) -> f64 {
        self.iter().map(|(_, e)| e.sim.get(kind) as f64).sum()
    }

    /// Derived neighborhood holding only `survivors`, in the original order.
    pub fn retain_words(&self, survivors: &HashSet<&str>) -> Neighborhood {
        let mut out = Neighborhood::new();
        for (word, entry) in self.iter() {
            if survivors.contains(word.as_str()) {
                out.insert(word.clone(), entry.clone());
            }
        }
        out
    }

    /// Union with another neighborhood.
    ///
    /// Shared words keep the max of each variant and concatenate provenance;
    /// new words are appended in the other neighborhood's order.
    pub fn merge(&mut self, other: &Neighborhood) {
        for (word, entry) in other.iter() {
            match self.entries.get_mut(word) {
                Some(existing) => {
                    existing.from.extend(entry.from.iter().cloned());
                    existing.rels.extend(entry.rels.iter().cloned());
                    existing.sim.absorb(&entry.sim);
                }
                None => {
                    self.insert(word.clone(), entry.clone());
                }
            }
        }
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

impl From<Vec<(Word, NeighborhoodEntry)>> for Neighborhood {
    fn from(pairs: Vec<(Word, NeighborhoodEntry)>) -> Self {
        let mut neighborhood = Neighborhood::new();
        for (word, entry) in pairs {
            neighborhood.insert(word, entry);
        }
        neighborhood
    }
}

impl From<Neighborhood> for Vec<(Word, NeighborhoodEntry)> {
    fn from(mut neighborhood: Neighborhood) -> Self {
        neighborhood
            .order
            .into_iter()
            .filter_map(|w| neighborhood.entries.remove(&w).map(|e| (w, e)))
            .collect()
    }
}
