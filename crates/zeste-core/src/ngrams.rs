//! N-gram vocabulary for phrase augmentation.
//!
//! Collects multiword phrases (`television_show`, `new_york`) from a corpus
//! of preprocessed documents. Only phrases frequent enough across documents
//! and known to the embedding vocabulary are kept, since a phrase the graph
//! cannot score is useless to the scorer.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use zeste_embeddings::EmbeddingStore;
use zeste_types::Word;

use crate::error::ZesteError;

/// N-gram counter over tokenized documents.
pub struct NgramCollector {
    /// Phrase -> number of documents containing it
    doc_frequencies: HashMap<Word, usize>,
    /// Number of documents
    doc_count: usize,
    max_n: usize,
}

impl NgramCollector {
    /// Count 2..=max_n grams over `documents`.
    pub fn new(documents: &[Vec<Word>], max_n: usize) -> Self {
        let mut doc_frequencies: HashMap<Word, usize> = HashMap::new();

        for doc in documents {
            let mut unique: HashSet<Word> = HashSet::new();
            for n in 2..=max_n {
                for window in doc.windows(n) {
                    unique.insert(window.join("_"));
                }
            }
            // Each phrase counted once per document
            for phrase in unique {
                *doc_frequencies.entry(phrase).or_insert(0) += 1;
            }
        }

        Self {
            doc_frequencies,
            doc_count: documents.len(),
            max_n,
        }
    }

    /// Number of documents containing `phrase`.
    pub fn document_frequency(&self, phrase: &str) -> usize {
        self.doc_frequencies.get(phrase).copied().unwrap_or(0)
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Phrases seen in at least `min_df` documents and, when a vocabulary
    /// is given, present in it. Sorted.
    pub fn collect(&self, min_df: usize, vocabulary: Option<&dyn EmbeddingStore>) -> Vec<Word> {
        let mut phrases: Vec<Word> = self
            .doc_frequencies
            .iter()
            .filter(|(_, df)| **df >= min_df)
            .filter(|(phrase, _)| vocabulary.map_or(true, |v| v.has(phrase)))
            .map(|(phrase, _)| phrase.clone())
            .collect();
        phrases.sort();
        info!(
            candidates = self.doc_frequencies.len(),
            kept = phrases.len(),
            min_df,
            "Collected n-grams"
        );
        phrases
    }
}

/// Read an n-gram list, one phrase per line. Blank lines are skipped.
pub fn load_ngrams(path: impl AsRef<Path>) -> Result<Vec<Word>, ZesteError> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Write an n-gram list, one phrase per line.
pub fn save_ngrams(path: impl AsRef<Path>, ngrams: &[Word]) -> Result<(), ZesteError> {
    let mut writer = BufWriter::new(fs::File::create(path.as_ref())?);
    for ngram in ngrams {
        writeln!(writer, "{}", ngram)?;
    }
    writer.flush()?;
    Ok(())
}
