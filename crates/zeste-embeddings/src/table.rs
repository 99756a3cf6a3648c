//! In-memory embedding table loaded from word2vec text files.
//!
//! Each line is `word v1 v2 ... vD`. An optional first line `count dim` is
//! accepted. Multilingual Numberbatch keys look like `/c/en/word`; only the
//! English ones are kept and the prefix is stripped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingStore};

const ENGLISH_PREFIX: &str = "/c/en/";
const URI_PREFIX: &str = "/c/";

/// Word -> normalized vector table.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    dimension: usize,
    vectors: HashMap<String, Embedding>,
}

impl EmbeddingTable {
    /// Build a table from `(word, vector)` pairs.
    ///
    /// Vectors are normalized. Pairs whose dimension differs from the first
    /// pair are rejected.
    pub fn from_vectors<I, W>(pairs: I) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (W, Vec<f32>)>,
        W: Into<String>,
    {
        let mut table = Self::default();
        for (i, (word, values)) in pairs.into_iter().enumerate() {
            table.insert(i + 1, word.into(), values)?;
        }
        Ok(table)
    }

    /// Load a word2vec text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading embedding table");
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        if table.is_empty() {
            return Err(EmbeddingError::Empty(path.display().to_string()));
        }
        info!(
            words = table.len(),
            dimension = table.dimension,
            "Embedding table loaded"
        );
        Ok(table)
    }

    /// Parse word2vec text from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EmbeddingError> {
        let reader = BufReader::new(reader);
        let mut table = Self::default();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split(' ');
            let raw_word = match parts.next() {
                Some(w) if !w.is_empty() => w,
                _ => {
                    return Err(EmbeddingError::Parse {
                        line: line_no,
                        message: "missing word".to_string(),
                    })
                }
            };
            let rest: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();

            if line_no == 1 && is_header(raw_word, &rest) {
                debug!(header = line, "Skipping word2vec header");
                if let Some(dim) = rest.first().and_then(|d| d.parse().ok()) {
                    table.dimension = dim;
                }
                continue;
            }

            let word = match normalize_key(raw_word) {
                Some(w) => w,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let values = rest
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| EmbeddingError::Parse {
                    line: line_no,
                    message: e.to_string(),
                })?;

            table.insert(line_no, word, values)?;
        }

        if skipped > 0 {
            debug!(skipped, "Skipped non-English embedding rows");
        }
        Ok(table)
    }

    fn insert(&mut self, line: usize, word: String, values: Vec<f32>) -> Result<(), EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::Parse {
                line,
                message: format!("no vector for '{}'", word),
            });
        }
        if self.dimension == 0 {
            self.dimension = values.len();
        } else if values.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                line,
                expected: self.dimension,
                actual: values.len(),
            });
        }
        self.vectors.insert(word, Embedding::new(values));
        Ok(())
    }

    /// Vocabulary, unordered.
    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.vectors.keys()
    }
}

impl EmbeddingStore for EmbeddingTable {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn get(&self, word: &str) -> Option<&Embedding> {
        self.vectors.get(word)
    }
}

fn is_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}

/// Strip the `/c/en/` prefix; `None` for other languages.
fn normalize_key(raw: &str) -> Option<String> {
    if let Some(rest) = raw.strip_prefix(ENGLISH_PREFIX) {
        // /c/en/word/n/... carries a part-of-speech suffix
        let word = rest.split('/').next().unwrap_or(rest);
        return (!word.is_empty()).then(|| word.to_lowercase());
    }
    if raw.starts_with(URI_PREFIX) {
        return None;
    }
    Some(raw.to_lowercase())
}
