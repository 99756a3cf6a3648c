//! ConceptNet import.
//!
//! Turns a ConceptNet assertions dump (tab-separated `uri, relation, start,
//! end, info`) into one `GraphRecord` per English word. Each assertion
//! `subject --kind--> object` is written in both directions:
//! - `object`'s record gets `subject` tagged `kind`
//! - `subject`'s record gets `object` tagged `kind.inverse()`
//!
//! so traversal over records is effectively undirected. Record similarities
//! come from the embedding store (0.0 when either word is out of vocabulary).

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use zeste_embeddings::EmbeddingStore;
use zeste_types::{GraphRecord, RecordEdge, RelationKind, Word};

use crate::error::StorageError;
use crate::graph::{FileGraphStore, MemoryGraph};

const ENGLISH: &str = "en";
const PROGRESS_EVERY: usize = 100_000;

/// Counters reported at the end of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Lines read from the dump
    pub lines: usize,
    /// Assertions kept (before adding inverses)
    pub assertions: usize,
    /// Assertions with a non-English subject or object
    pub skipped_language: usize,
    /// `ExternalURL` and unknown relations
    pub skipped_relation: usize,
    /// Lines that are not valid assertion rows
    pub malformed: usize,
    /// Records produced
    pub records: usize,
    /// Records that could not be written (e.g. over-long words)
    pub failed_records: usize,
    /// Record words missing from the embedding vocabulary
    pub oov_words: usize,
}

/// Adjacency built from the dump before records are materialized.
#[derive(Debug, Default)]
pub struct AssertionIndex {
    adjacency: HashMap<Word, BTreeMap<Word, Vec<RelationKind>>>,
    stats: ImportStats,
}

impl AssertionIndex {
    fn add(&mut self, subject: &str, kind: RelationKind, object: &str) {
        self.link(object, subject, kind);
        self.link(subject, object, kind.inverse());
    }

    fn link(&mut self, owner: &str, neighbor: &str, kind: RelationKind) {
        let rels = self
            .adjacency
            .entry(owner.to_string())
            .or_default()
            .entry(neighbor.to_string())
            .or_default();
        if !rels.contains(&kind) {
            rels.push(kind);
        }
    }

    /// Number of distinct words seen.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    /// Materialize records in word order.
    ///
    /// Each record starts with its self entry, followed by the neighbors in
    /// sorted order.
    pub fn into_records<'a>(
        self,
        embeddings: &'a dyn EmbeddingStore,
    ) -> (impl Iterator<Item = GraphRecord> + 'a, ImportStats) {
        let mut stats = self.stats;
        let mut words: Vec<(Word, BTreeMap<Word, Vec<RelationKind>>)> =
            self.adjacency.into_iter().collect();
        words.sort_by(|a, b| a.0.cmp(&b.0));

        stats.records = words.len();
        stats.oov_words = words.iter().filter(|(w, _)| !embeddings.has(w)).count();

        let records = words.into_iter().map(move |(word, neighbors)| {
            let mut record = GraphRecord::new(word.clone());
            for (neighbor, rels) in neighbors {
                let sim = embeddings.similarity(&word, &neighbor).unwrap_or(0.0);
                record.neighbors.push(RecordEdge {
                    word: neighbor,
                    rels,
                    sim,
                });
            }
            record
        });
        (records, stats)
    }
}

/// A parsed ConceptNet concept URI.
#[derive(Debug, PartialEq, Eq)]
enum Concept<'a> {
    /// `/c/en/star/n/...` -> `star`
    English(&'a str),
    /// Any other language
    Foreign,
    /// Not a concept URI
    Invalid,
}

fn parse_concept(uri: &str) -> Concept<'_> {
    let mut parts = uri.split('/');
    if parts.next() != Some("") || parts.next() != Some("c") {
        return Concept::Invalid;
    }
    match (parts.next(), parts.next()) {
        (Some(ENGLISH), Some(word)) if !word.is_empty() => Concept::English(word),
        (Some(lang), Some(_)) if !lang.is_empty() && lang != ENGLISH => Concept::Foreign,
        _ => Concept::Invalid,
    }
}

/// Builds graph records from ConceptNet assertion dumps.
pub struct Importer<'a> {
    embeddings: &'a dyn EmbeddingStore,
}

impl<'a> Importer<'a> {
    pub fn new(embeddings: &'a dyn EmbeddingStore) -> Self {
        Self { embeddings }
    }

    /// Read the dump into an adjacency index.
    pub fn index<R: Read>(&self, reader: R) -> Result<AssertionIndex, StorageError> {
        let mut index = AssertionIndex::default();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            index.stats.lines += 1;
            if index.stats.lines % PROGRESS_EVERY == 0 {
                debug!(lines = index.stats.lines, words = index.len(), "Reading assertions");
            }

            let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
            if fields.len() < 4 {
                index.stats.malformed += 1;
                continue;
            }
            let (relation, start, end) = (fields[1], fields[2], fields[3]);

            let Some(kind) = RelationKind::from_conceptnet_uri(relation) else {
                index.stats.skipped_relation += 1;
                continue;
            };

            let (subject, object) = match (parse_concept(start), parse_concept(end)) {
                (Concept::English(s), Concept::English(o)) => (s, o),
                (Concept::Foreign, _) | (_, Concept::Foreign) => {
                    index.stats.skipped_language += 1;
                    continue;
                }
                _ => {
                    index.stats.malformed += 1;
                    continue;
                }
            };

            index.stats.assertions += 1;
            // The self entry already covers reflexive assertions
            if subject != object {
                index.add(subject, kind, object);
            }
        }

        info!(
            lines = index.stats.lines,
            assertions = index.stats.assertions,
            words = index.len(),
            "Assertions indexed"
        );
        Ok(index)
    }

    /// Import a dump into a file-backed graph store.
    pub fn import<R: Read>(
        &self,
        reader: R,
        store: &FileGraphStore,
    ) -> Result<ImportStats, StorageError> {
        let index = self.index(reader)?;
        let (records, mut stats) = index.into_records(self.embeddings);
        for (i, record) in records.enumerate() {
            if let Err(e) = store.put_record(&record) {
                warn!(word = %record.word, error = %e, "Failed to write graph record, skipping");
                stats.failed_records += 1;
            }
            if (i + 1) % PROGRESS_EVERY == 0 {
                info!(written = i + 1, total = stats.records, "Writing graph records");
            }
        }
        info!(
            records = stats.records,
            skipped_language = stats.skipped_language,
            skipped_relation = stats.skipped_relation,
            malformed = stats.malformed,
            failed_records = stats.failed_records,
            "Import complete"
        );
        Ok(stats)
    }

    /// Import a dump file into a file-backed graph store.
    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        store: &FileGraphStore,
    ) -> Result<ImportStats, StorageError> {
        let path = path.as_ref();
        info!(path = %path.display(), target = %store.root().display(), "Importing ConceptNet assertions");
        self.import(File::open(path)?, store)
    }

    /// Import a dump into an in-memory graph.
    pub fn import_into_memory<R: Read>(
        &self,
        reader: R,
    ) -> Result<(MemoryGraph, ImportStats), StorageError> {
        let index = self.index(reader)?;
        let (records, stats) = index.into_records(self.embeddings);
        let mut graph = MemoryGraph::new();
        for record in records {
            graph.insert(record);
        }
        Ok((graph, stats))
    }
}
