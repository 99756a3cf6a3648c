//! End-to-end test infrastructure for ZeSTE.
//!
//! Provides a shared TestHarness with a small fixture world:
//!
//! ```text
//! star --located-at--> space
//! love --is-a--> television_show --is-a--> space
//! song --part-of--> music
//! ```
//!
//! plus helpers to materialize the same world on disk (embeddings file,
//! assertions dump) for full-pipeline tests.

use std::path::PathBuf;
use std::sync::Arc;

use zeste_core::{Classifier, ClassifierConfig, NeighborhoodCache};
use zeste_embeddings::{EmbeddingStore, EmbeddingTable};
use zeste_storage::MemoryGraph;
use zeste_types::{RelationKind, Settings};

/// Fixture vectors. Every pair used by an edge has positive similarity.
pub const VECTORS: &[(&str, [f32; 3])] = &[
    ("space", [1.0, 0.0, 0.0]),
    ("star", [0.8, 0.6, 0.0]),
    ("television_show", [0.6, 0.0, 0.8]),
    ("love", [0.3, 0.4, 0.866]),
    ("music", [0.0, 1.0, 0.0]),
    ("song", [0.0, 0.6, 0.8]),
    ("television", [0.5, 0.1, 0.8]),
    ("show", [0.4, 0.3, 0.7]),
];

/// Fixture assertions as `(subject, relation, object)`.
pub const ASSERTIONS: &[(&str, RelationKind, &str)] = &[
    ("star", RelationKind::AtLocation, "space"),
    ("love", RelationKind::IsA, "television_show"),
    ("television_show", RelationKind::IsA, "space"),
    ("song", RelationKind::PartOf, "music"),
];

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub embeddings: Arc<EmbeddingTable>,
    pub graph: Arc<MemoryGraph>,
    /// Root of the prefetch cache tier
    pub prefetch_path: PathBuf,
    /// Root of the label cache tier
    pub label_cache_path: PathBuf,
}

impl TestHarness {
    /// Create a harness over the in-memory fixture graph.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let embeddings = Arc::new(fixture_embeddings());

        let mut graph = MemoryGraph::new();
        for (subject, kind, object) in ASSERTIONS {
            let sim = embeddings.similarity(subject, object).unwrap_or(0.0);
            graph.add_assertion(subject, *kind, object, sim);
        }

        let prefetch_path = temp_dir.path().join("prefetch");
        let label_cache_path = temp_dir.path().join("labels");

        Self {
            _temp_dir: temp_dir,
            embeddings,
            graph: Arc::new(graph),
            prefetch_path,
            label_cache_path,
        }
    }

    pub fn sim(&self, a: &str, b: &str) -> f32 {
        self.embeddings.similarity(a, b).unwrap_or(0.0)
    }

    /// Both cache tiers under the harness temp dir.
    pub fn cache(&self) -> NeighborhoodCache {
        NeighborhoodCache::open(
            Some(self.prefetch_path.as_path()),
            Some(self.label_cache_path.as_path()),
        )
    }

    /// Classifier over the fixture graph with caching enabled.
    pub fn classifier(&self, config: ClassifierConfig) -> Classifier {
        Classifier::new(self.graph.clone(), self.embeddings.clone(), self.cache(), config)
    }

    /// Classifier over the fixture graph without caches.
    pub fn uncached_classifier(&self, config: ClassifierConfig) -> Classifier {
        Classifier::new(
            self.graph.clone(),
            self.embeddings.clone(),
            NeighborhoodCache::disabled(),
            config,
        )
    }

    /// Write the fixture embeddings (word2vec text) and assertions dump
    /// (ConceptNet CSV) under the temp dir and return settings pointing at
    /// them. The graph directory is left for the importer to create.
    pub fn write_fixture_files(&self) -> Settings {
        let root = self._temp_dir.path();
        let embeddings_path = root.join("numberbatch.txt");
        let assertions_path = root.join("assertions.csv");

        std::fs::write(&embeddings_path, embeddings_text()).expect("Failed to write embeddings");
        std::fs::write(&assertions_path, assertions_text()).expect("Failed to write assertions");

        Settings {
            graph_path: root.join("graph").to_string_lossy().to_string(),
            embeddings_path: embeddings_path.to_string_lossy().to_string(),
            prefetch_path: self.prefetch_path.to_string_lossy().to_string(),
            label_cache_path: self.label_cache_path.to_string_lossy().to_string(),
            ..Settings::default()
        }
    }

    pub fn assertions_path(&self) -> PathBuf {
        self._temp_dir.path().join("assertions.csv")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Embedding table holding the fixture vectors.
pub fn fixture_embeddings() -> EmbeddingTable {
    EmbeddingTable::from_vectors(VECTORS.iter().map(|(w, v)| (*w, v.to_vec())))
        .expect("Failed to build fixture embeddings")
}

/// Fixture vectors in word2vec text format with Numberbatch-style keys.
pub fn embeddings_text() -> String {
    let mut out = format!("{} 3\n", VECTORS.len());
    for (word, v) in VECTORS {
        out.push_str(&format!("/c/en/{} {} {} {}\n", word, v[0], v[1], v[2]));
    }
    out
}

/// Fixture assertions as a ConceptNet dump, with a foreign-language line.
pub fn assertions_text() -> String {
    let mut out = String::new();
    for (subject, kind, object) in ASSERTIONS {
        let rel = format!("/r/{:?}", kind);
        out.push_str(&format!(
            "/a/[{rel}/,/c/en/{s}/,/c/en/{o}/]\t{rel}\t/c/en/{s}/n\t/c/en/{o}\t{{}}\n",
            rel = rel,
            s = subject,
            o = object
        ));
    }
    out.push_str("/a/[/r/IsA/,/c/fr/amour/,/c/en/love/]\t/r/IsA\t/c/fr/amour\t/c/en/love\t{}\n");
    out
}

/// Tokens from `words`.
pub fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Labels from `names`.
pub fn labels(names: &[&str]) -> Vec<String> {
    tokens(names)
}
