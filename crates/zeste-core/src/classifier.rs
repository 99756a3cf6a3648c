//! Zero-shot classification.
//!
//! For each candidate label: provide its neighborhood (label cache, else
//! expand through the prefetch cache and filter), score the document
//! against it, and explain every contributing token. A failing label gets
//! score 0 and an error message without affecting its siblings. Scores are
//! finally normalized across labels and sorted descending.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use zeste_embeddings::{EmbeddingStore, EmbeddingTable};
use zeste_storage::{FileGraphStore, RelationGraph};
use zeste_types::{
    label_words, ExpansionConfig, FilterConfig, Neighborhood, ScoringConfig, Settings, Word,
    LABEL_WORD_SEPARATOR,
};

use crate::cache::{label_fingerprint, NeighborhoodCache};
use crate::error::ZesteError;
use crate::expander::Expander;
use crate::explain::{best_path, Path};
use crate::filter::filter;
use crate::ngrams::load_ngrams;
use crate::preprocess::Preprocessor;
use crate::scorer::{normalize_scores, Scorer};

/// Settings that shape classification.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub expansion: ExpansionConfig,
    pub filter: FilterConfig,
    pub scoring: ScoringConfig,
}

impl From<&Settings> for ClassifierConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            expansion: settings.expansion.clone(),
            filter: settings.filter.clone(),
            scoring: settings.scoring.clone(),
        }
    }
}

/// A token's contribution to a label, with the chain that explains it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub path: Path,
    pub token: Word,
    pub similarity: f32,
}

/// Similarity of one document token to a label (`None` outside the
/// neighborhood).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub token: Word,
    pub similarity: Option<f32>,
}

/// Result for one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub label: String,
    /// Score normalized across the labels of the request
    pub score: f64,
    /// Score before cross-label normalization
    pub raw_score: f64,
    pub explanations: Vec<Explanation>,
    pub highlights: Vec<Highlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreRecord {
    fn failed(label: &str, error: &ZesteError) -> Self {
        Self {
            label: label.to_string(),
            score: 0.0,
            raw_score: 0.0,
            explanations: Vec::new(),
            highlights: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Scores documents against arbitrary labels.
pub struct Classifier {
    expander: Expander,
    cache: Arc<NeighborhoodCache>,
    preprocessor: Preprocessor,
    scorer: Scorer,
    config: ClassifierConfig,
}

impl Classifier {
    /// Build a classifier over shared stores.
    ///
    /// The preprocessor lemmatizes against the embedding vocabulary.
    pub fn new(
        graph: Arc<dyn RelationGraph>,
        embeddings: Arc<dyn EmbeddingStore>,
        cache: NeighborhoodCache,
        config: ClassifierConfig,
    ) -> Self {
        let cache = Arc::new(cache);
        let expander = Expander::new(graph, embeddings.clone())
            .with_config(config.expansion.clone())
            .with_cache(cache.clone());
        Self {
            expander,
            cache,
            preprocessor: Preprocessor::with_vocabulary(embeddings),
            scorer: Scorer::from_config(&config.scoring, Vec::new()),
            config,
        }
    }

    /// Open the configured graph, embeddings, caches and n-gram list.
    pub fn from_settings(settings: &Settings) -> Result<Self, ZesteError> {
        let embeddings = EmbeddingTable::load(Settings::expand_path(&settings.embeddings_path))?;
        let graph = FileGraphStore::open(
            Settings::expand_path(&settings.graph_path),
            settings.record_cache_size,
        )?;
        let prefetch = Settings::expand_path(&settings.prefetch_path);
        let labels = Settings::expand_path(&settings.label_cache_path);
        let cache = NeighborhoodCache::open(Some(prefetch.as_path()), Some(labels.as_path()));

        let mut classifier = Self::new(
            Arc::new(graph),
            Arc::new(embeddings),
            cache,
            ClassifierConfig::from(settings),
        );
        if let Some(path) = &settings.scoring.ngrams_path {
            let ngrams = load_ngrams(Settings::expand_path(path))?;
            info!(count = ngrams.len(), "Loaded n-grams");
            classifier = classifier.with_ngrams(ngrams);
        }
        Ok(classifier)
    }

    /// Enable n-gram augmentation of document tokens.
    pub fn with_ngrams(mut self, ngrams: Vec<Word>) -> Self {
        self.scorer = self.scorer.with_ngrams(ngrams);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Configuration fingerprint namespacing the label cache.
    pub fn fingerprint(&self) -> String {
        label_fingerprint(
            &self.config.expansion,
            &self.config.filter.allowed_rels,
            self.config.scoring.similarity,
            &self.config.filter.keep,
        )
    }

    /// Final (filtered) neighborhood of a label, cached per configuration.
    ///
    /// Cache entries are keyed by the normalized label words, so `Space`
    /// and `space` share one entry.
    #[instrument(skip(self))]
    pub fn neighborhood(&self, label: &str) -> Result<Neighborhood, ZesteError> {
        let seeds = self.expander.label_seeds(label)?;
        let key = seeds.join(LABEL_WORD_SEPARATOR.to_string().as_str());
        let fingerprint = self.fingerprint();
        if let Some(cached) = self.cache.get_label(&fingerprint, &key) {
            return Ok(cached);
        }

        let expanded = self.expander.expand(
            &seeds,
            self.config.expansion.depth,
            &self.config.expansion.allowed_rels,
        )?;
        let filtered = filter(
            &expanded,
            &self.config.filter.allowed_rels,
            self.config.scoring.similarity,
            &self.config.filter.keep,
        );
        debug!(
            label,
            expanded = expanded.len(),
            kept = filtered.len(),
            "Built label neighborhood"
        );
        self.cache.put_label(&fingerprint, &key, &filtered);
        Ok(filtered)
    }

    /// Precompute and cache neighborhoods. Returns how many succeeded.
    pub fn warm(&self, labels: &[String]) -> usize {
        let mut ok = 0;
        for label in labels {
            match self.neighborhood(label) {
                Ok(n) => {
                    info!(label = %label, words = n.len(), "Warmed label");
                    ok += 1;
                }
                Err(e) => warn!(label = %label, error = %e, "Failed to warm label"),
            }
        }
        ok
    }

    /// Classify raw text.
    pub fn classify(&self, text: &str, labels: &[String]) -> Vec<ScoreRecord> {
        let tokens = self.preprocessor.tokenize(text);
        self.classify_tokens(&tokens, labels)
    }

    /// Classify a preprocessed document.
    #[instrument(skip(self, tokens), fields(tokens = tokens.len()))]
    pub fn classify_tokens(&self, tokens: &[Word], labels: &[String]) -> Vec<ScoreRecord> {
        let mut records: Vec<ScoreRecord> = labels
            .iter()
            .map(|label| match self.score_label(tokens, label) {
                Ok(record) => record,
                Err(e) => {
                    warn!(label = %label, error = %e, "Label failed");
                    ScoreRecord::failed(label, &e)
                }
            })
            .collect();

        let mut scores: Vec<f64> = records.iter().map(|r| r.raw_score).collect();
        normalize_scores(&mut scores);
        for (record, score) in records.iter_mut().zip(scores) {
            record.score = score;
        }
        records.sort_by(|a, b| b.score.total_cmp(&a.score));
        records
    }

    fn score_label(&self, tokens: &[Word], label: &str) -> Result<ScoreRecord, ZesteError> {
        let neighborhood = self.neighborhood(label)?;
        let variant = self.config.scoring.similarity;
        let raw_score = self.scorer.score(tokens, &neighborhood);

        let mut related: Vec<(Word, f32)> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let augmented = self.scorer.augment(tokens);
        for token in &augmented {
            let similarity = neighborhood.similarity(token, variant);
            if similarity > 0.0 && neighborhood.contains(token) && seen.insert(token.as_str()) {
                related.push((token.clone(), similarity));
            }
        }

        let mut explanations: Vec<Explanation> = Vec::new();
        for word in label_words(label) {
            for (token, similarity) in &related {
                match best_path(token, &word, &neighborhood) {
                    Some(path) => {
                        let explanation = Explanation {
                            path,
                            token: token.clone(),
                            similarity: *similarity,
                        };
                        if !explanations.contains(&explanation) {
                            explanations.push(explanation);
                        }
                    }
                    None => debug!(
                        token = %token,
                        label_word = %word,
                        "No path within two hops, explanation skipped"
                    ),
                }
            }
        }
        explanations.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        let highlights = tokens
            .iter()
            .map(|token| Highlight {
                token: token.clone(),
                similarity: neighborhood
                    .get(token)
                    .map(|entry| entry.sim.get(variant)),
            })
            .collect();

        Ok(ScoreRecord {
            label: label.to_string(),
            score: raw_score,
            raw_score,
            explanations,
            highlights,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeste_embeddings::EmbeddingTable;
    use zeste_storage::MemoryGraph;
    use zeste_types::{KeepPolicy, RelationKind};

    fn classifier(config: ClassifierConfig) -> Classifier {
        classifier_with_cache(config, NeighborhoodCache::disabled())
    }

    fn classifier_with_cache(config: ClassifierConfig, cache: NeighborhoodCache) -> Classifier {
        let embeddings = EmbeddingTable::from_vectors(vec![
            ("space", vec![1.0, 0.0, 0.0]),
            ("star", vec![0.8, 0.6, 0.0]),
            ("music", vec![0.0, 0.0, 1.0]),
            ("song", vec![0.0, 0.6, 0.8]),
        ])
        .unwrap();
        let sim = |a: &str, b: &str| embeddings.similarity(a, b).unwrap_or(0.0);
        let mut graph = MemoryGraph::new();
        graph.add_assertion("star", RelationKind::AtLocation, "space", sim("star", "space"));
        graph.add_assertion("song", RelationKind::PartOf, "music", sim("song", "music"));
        Classifier::new(
            Arc::new(graph),
            Arc::new(embeddings),
            cache,
            config,
        )
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_ranks_and_normalizes() {
        let c = classifier(ClassifierConfig::default());
        let records = c.classify("The stars shine", &labels(&["music", "space"]));
        assert_eq!(records[0].label, "space");
        assert!((records[0].score - 1.0).abs() < 1e-9);
        assert_eq!(records[1].score, 0.0);
        assert!((records[0].raw_score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_explanations_and_highlights() {
        let c = classifier(ClassifierConfig::default());
        let records = c.classify("star space", &labels(&["space"]));
        let record = &records[0];
        let paths: Vec<Vec<String>> = record.explanations.iter().map(|e| e.path.elements()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["space".to_string(), "is-label".to_string()],
                vec!["star".to_string(), "located-at".to_string(), "space".to_string()],
            ]
        );
        assert_eq!(record.highlights.len(), 2);
        assert!(record.highlights.iter().all(|h| h.similarity.is_some()));
    }

    #[test]
    fn test_unknown_tokens_highlight_none() {
        let c = classifier(ClassifierConfig::default());
        let records = c.classify_tokens(&labels(&["star", "guitar"]), &labels(&["space"]));
        assert_eq!(records[0].highlights[1].similarity, None);
    }

    #[test]
    fn test_failing_label_is_isolated() {
        let mut config = ClassifierConfig::default();
        config.expansion.max_label_words = 1;
        let c = classifier(config);
        let records = c.classify("star", &labels(&["music-space", "space"]));
        assert_eq!(records[0].label, "space");
        assert!(records[0].error.is_none());
        let failed = &records[1];
        assert_eq!(failed.label, "music-space");
        assert_eq!(failed.score, 0.0);
        assert!(failed.error.as_deref().unwrap().contains("Too many words"));
    }

    #[test]
    fn test_all_zero_scores_left_unchanged() {
        let c = classifier(ClassifierConfig::default());
        let records = c.classify("guitar", &labels(&["music", "space"]));
        assert!(records.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_neighborhood_applies_filter() {
        let mut config = ClassifierConfig::default();
        config.filter.keep = KeepPolicy::Top(1);
        let c = classifier(config);
        let n = c.neighborhood("space").unwrap();
        assert_eq!(n.words().collect::<Vec<_>>(), vec!["space"]);
    }

    #[test]
    fn test_label_cache_is_used() {
        let dir = tempfile::TempDir::new().unwrap();
        let embeddings = Arc::new(
            EmbeddingTable::from_vectors(vec![("space", vec![1.0, 0.0])]).unwrap(),
        );
        let mut graph = MemoryGraph::new();
        graph.insert(zeste_types::GraphRecord::new("space"));
        let c = Classifier::new(
            Arc::new(graph),
            embeddings,
            NeighborhoodCache::open(None, Some(dir.path())),
            ClassifierConfig::default(),
        );
        c.neighborhood("space").unwrap();
        assert!(dir.path().join(c.fingerprint()).join("space.json").is_file());
        assert_eq!(c.warm(&labels(&["space", "a-b-c"])), 2);
    }

    #[test]
    fn test_label_limit_checked_before_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        let open = || NeighborhoodCache::open(None, Some(dir.path()));
        let wide = classifier_with_cache(ClassifierConfig::default(), open());
        wide.neighborhood("space-star-music").unwrap();

        let mut config = ClassifierConfig::default();
        config.expansion.max_label_words = 2;
        let narrow = classifier_with_cache(config, open());
        assert_eq!(wide.fingerprint(), narrow.fingerprint());
        assert!(matches!(
            narrow.neighborhood("space-star-music"),
            Err(ZesteError::TooManyLabelWords { count: 3, max: 2, .. })
        ));
        assert!(matches!(narrow.neighborhood(" - "), Err(ZesteError::EmptyLabel)));
    }

    #[test]
    fn test_label_cache_key_is_normalized() {
        let dir = tempfile::TempDir::new().unwrap();
        let c = classifier_with_cache(
            ClassifierConfig::default(),
            NeighborhoodCache::open(None, Some(dir.path())),
        );
        let lower = c.neighborhood("space").unwrap();
        assert_eq!(c.neighborhood("Space").unwrap(), lower);
        assert_eq!(c.neighborhood(" SPACE- ").unwrap(), lower);

        let entries: Vec<_> = std::fs::read_dir(dir.path().join(c.fingerprint()))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("space.json")]);

        c.neighborhood("Space-Music").unwrap();
        assert!(dir.path().join(c.fingerprint()).join("space-music.json").is_file());
    }

    /// `over` bridges `space` to `cosmos`, but is a stopword.
    fn stopword_bridge(config: ClassifierConfig, cache: NeighborhoodCache) -> Classifier {
        let embeddings = EmbeddingTable::from_vectors(vec![
            ("space", vec![1.0, 0.0, 0.0]),
            ("over", vec![0.6, 0.8, 0.0]),
            ("cosmos", vec![0.8, 0.0, 0.6]),
        ])
        .unwrap();
        let sim = |a: &str, b: &str| embeddings.similarity(a, b).unwrap_or(0.0);
        let mut graph = MemoryGraph::new();
        graph.add_assertion("space", RelationKind::RelatedTo, "over", sim("space", "over"));
        graph.add_assertion("over", RelationKind::RelatedTo, "cosmos", sim("over", "cosmos"));
        Classifier::new(Arc::new(graph), Arc::new(embeddings), cache, config)
    }

    #[test]
    fn test_label_cache_separates_pruning_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let open = || NeighborhoodCache::open(None, Some(dir.path()));

        let pruned = stopword_bridge(ClassifierConfig::default(), open());
        assert!(!pruned.neighborhood("space").unwrap().contains("cosmos"));

        let mut config = ClassifierConfig::default();
        config.expansion.skip_stopwords = false;
        let unpruned = stopword_bridge(config.clone(), open());
        assert_ne!(pruned.fingerprint(), unpruned.fingerprint());
        let through_cache = unpruned.neighborhood("space").unwrap();
        assert!(through_cache.contains("cosmos"));

        let uncached = stopword_bridge(config, NeighborhoodCache::disabled());
        assert_eq!(through_cache, uncached.neighborhood("space").unwrap());
    }
}
