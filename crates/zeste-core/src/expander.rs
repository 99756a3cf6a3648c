//! Label neighborhood expansion.
//!
//! Breadth-first traversal of the relation graph from a seed word, bounded
//! by depth. Hop 1 is the seed's graph record; each later hop expands the
//! words first discovered in the previous one. Every discovered word carries
//! its provenance and four similarity variants:
//!
//! - `simple`: sim(seed, x)
//! - `depth`: simple / hop
//! - `compound`: sim(seed, bridge) * sim(bridge, x)
//! - `harmonized`: 2 * compound / (sim(seed, bridge) + sim(bridge, x))
//!
//! `compound` and `harmonized` fall back to `simple` when the bridge is out
//! of vocabulary. Words reached along several paths keep the max of each
//! variant.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use zeste_embeddings::EmbeddingStore;
use zeste_storage::RelationGraph;
use zeste_types::{
    label_words, ExpansionConfig, GraphRecord, Neighborhood, NeighborhoodEntry, RelationFilter,
    RelationKind, SimilarityKind, SimilarityScores, Word,
};

use crate::cache::{prefetch_namespace, NeighborhoodCache};
use crate::error::ZesteError;
use crate::preprocess::is_stopword;

/// Builds label neighborhoods from the graph and embedding stores.
pub struct Expander {
    graph: Arc<dyn RelationGraph>,
    embeddings: Arc<dyn EmbeddingStore>,
    cache: Arc<NeighborhoodCache>,
    config: ExpansionConfig,
}

impl Expander {
    /// Expander with default settings and no cache.
    pub fn new(graph: Arc<dyn RelationGraph>, embeddings: Arc<dyn EmbeddingStore>) -> Self {
        Self {
            graph,
            embeddings,
            cache: Arc::new(NeighborhoodCache::disabled()),
            config: ExpansionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExpansionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<NeighborhoodCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Seed words of a label, checked against the configured word limit.
    pub fn label_seeds(&self, label: &str) -> Result<Vec<Word>, ZesteError> {
        let words = label_words(label);
        if words.is_empty() {
            return Err(ZesteError::EmptyLabel);
        }
        if words.len() > self.config.max_label_words {
            return Err(ZesteError::TooManyLabelWords {
                label: label.to_string(),
                count: words.len(),
                max: self.config.max_label_words,
            });
        }
        Ok(words)
    }

    /// Expand a label (one or more `-`-separated words) with the configured
    /// depth and relation filter.
    pub fn expand_label(&self, label: &str) -> Result<Neighborhood, ZesteError> {
        let words = self.label_seeds(label)?;
        self.expand(&words, self.config.depth, &self.config.allowed_rels)
    }

    /// Expand each seed and merge the results.
    ///
    /// Shared words keep the max of each variant and concatenate provenance.
    #[instrument(skip(self, allowed_rels), fields(rels = %allowed_rels))]
    pub fn expand(
        &self,
        seeds: &[Word],
        depth: usize,
        allowed_rels: &RelationFilter,
    ) -> Result<Neighborhood, ZesteError> {
        let mut merged = Neighborhood::new();
        for seed in seeds {
            let n = self.expand_word(seed, depth, allowed_rels)?;
            if merged.is_empty() {
                merged = n;
            } else {
                merged.merge(&n);
            }
        }
        debug!(words = merged.len(), "Expanded label neighborhood");
        Ok(merged)
    }

    /// Expand a single seed word, using the prefetch cache for depth > 1.
    pub fn expand_word(
        &self,
        seed: &str,
        depth: usize,
        allowed_rels: &RelationFilter,
    ) -> Result<Neighborhood, ZesteError> {
        if depth == 0 {
            return Ok(Neighborhood::new());
        }
        if !self.embeddings.has(seed) {
            debug!(seed, "Seed out of vocabulary");
            return Ok(Neighborhood::new());
        }

        let namespace = prefetch_namespace(
            depth,
            allowed_rels,
            self.config.skip_stopwords,
            self.config.skip_nonpositive,
        );
        if depth > 1 {
            if let Some(cached) = self.cache.get_prefetch(&namespace, seed) {
                return Ok(cached);
            }
        }

        let neighborhood = self.traverse(seed, depth, allowed_rels)?;
        if depth > 1 && !neighborhood.is_empty() {
            self.cache.put_prefetch(&namespace, seed, &neighborhood);
        }
        Ok(neighborhood)
    }

    fn traverse(
        &self,
        seed: &str,
        depth: usize,
        allowed_rels: &RelationFilter,
    ) -> Result<Neighborhood, ZesteError> {
        let Some(record) = self.graph.get_record(seed)? else {
            debug!(seed, "Seed has no graph record");
            return Ok(Neighborhood::new());
        };

        let mut neighborhood = Neighborhood::new();
        neighborhood.insert(
            seed,
            NeighborhoodEntry::new(seed, vec![RelationKind::SameAs], SimilarityScores::uniform(1.0)),
        );

        let mut frontier: VecDeque<Word> = VecDeque::new();
        for edge in &record.neighbors {
            if edge.word == seed || !allowed_rels.allows(&edge.rels) {
                continue;
            }
            let entry = NeighborhoodEntry::new(
                seed,
                edge.rels.clone(),
                SimilarityScores::uniform(edge.sim),
            );
            if neighborhood.insert(edge.word.clone(), entry) {
                frontier.push_back(edge.word.clone());
            }
        }

        for hop in 2..=depth {
            let mut next: VecDeque<Word> = VecDeque::new();
            while let Some(bridge) = frontier.pop_front() {
                if !self.should_expand(&bridge, &neighborhood) {
                    continue;
                }
                let Some(record) = self.bridge_record(&bridge) else {
                    continue;
                };
                let seed_bridge = self.embeddings.similarity(seed, &bridge);

                for edge in &record.neighbors {
                    if edge.word == bridge || !allowed_rels.allows(&edge.rels) {
                        continue;
                    }
                    let scores = self.scores(seed, seed_bridge, &bridge, &edge.word, hop);
                    match neighborhood.get_mut(&edge.word) {
                        Some(existing) => {
                            existing.add_provenance(bridge.as_str(), edge.rels.clone(), &scores)
                        }
                        None => {
                            let entry =
                                NeighborhoodEntry::new(bridge.as_str(), edge.rels.clone(), scores);
                            neighborhood.insert(edge.word.clone(), entry);
                            next.push_back(edge.word.clone());
                        }
                    }
                }
            }
            debug!(seed, hop, discovered = next.len(), "Expansion round");
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(neighborhood)
    }

    /// Record of a frontier word. Unreadable records are skipped so one bad
    /// entry does not fail the whole label.
    fn bridge_record(&self, word: &str) -> Option<Arc<GraphRecord>> {
        match self.graph.get_record(word) {
            Ok(record) => record,
            Err(e) => {
                warn!(word, error = %e, "Unreadable graph record, skipping");
                None
            }
        }
    }

    /// Frontier pruning: stopwords and words unrelated to the seed are not
    /// expanded further.
    fn should_expand(&self, word: &str, neighborhood: &Neighborhood) -> bool {
        if self.config.skip_stopwords && is_stopword(word) {
            return false;
        }
        if self.config.skip_nonpositive
            && neighborhood.similarity(word, SimilarityKind::Simple) <= 0.0
        {
            return false;
        }
        true
    }

    /// Similarity variants of `word` reached from `bridge` at `hop`.
    fn scores(
        &self,
        seed: &str,
        seed_bridge: Option<f32>,
        bridge: &str,
        word: &str,
        hop: usize,
    ) -> SimilarityScores {
        let Some(simple) = self.embeddings.similarity(seed, word) else {
            return SimilarityScores::default();
        };
        let depth = simple / hop as f32;
        let (compound, harmonized) = match (seed_bridge, self.embeddings.similarity(bridge, word)) {
            (Some(sb), Some(bx)) => {
                let compound = sb * bx;
                let denominator = sb + bx;
                let harmonized = if denominator != 0.0 {
                    2.0 * compound / denominator
                } else {
                    0.0
                };
                (compound, harmonized)
            }
            _ => (simple, simple),
        };
        SimilarityScores {
            simple,
            compound,
            depth,
            harmonized,
        }
    }
}
