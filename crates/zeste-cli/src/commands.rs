//! Command implementations.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use zeste_core::ngrams::save_ngrams;
use zeste_core::{Classifier, NgramCollector, Preprocessor};
use zeste_embeddings::{EmbeddingStore, EmbeddingTable};
use zeste_storage::{FileGraphStore, Importer};
use zeste_types::{Settings, Word};

use crate::cli::TuningArgs;

/// Load settings, apply CLI overrides and install the tracing subscriber.
pub fn init(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    tuning: Option<&TuningArgs>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    if let Some(tuning) = tuning {
        tuning.apply(&mut settings);
        settings.validate().context("Invalid command-line overrides")?;
    }

    // Results go to stdout, logs to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(settings)
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn load_embeddings(path: &str) -> Result<EmbeddingTable> {
    let path = Settings::expand_path(path);
    EmbeddingTable::load(&path)
        .with_context(|| format!("Failed to load embeddings from {}", path.display()))
}

fn open_classifier(settings: &Settings) -> Result<Classifier> {
    Classifier::from_settings(settings).context("Failed to open classifier stores")
}

/// Build the graph store from an assertions dump.
pub fn import_graph(
    settings: &Settings,
    assertions: &Path,
    embeddings_override: Option<&str>,
    graph_override: Option<&str>,
) -> Result<()> {
    let embeddings = load_embeddings(embeddings_override.unwrap_or(&settings.embeddings_path))?;
    let graph_path = Settings::expand_path(graph_override.unwrap_or(&settings.graph_path));

    let store = FileGraphStore::create(&graph_path, settings.record_cache_size)
        .with_context(|| format!("Failed to create graph store at {}", graph_path.display()))?;
    let stats = Importer::new(&embeddings)
        .import_file(assertions, &store)
        .with_context(|| format!("Failed to import {}", assertions.display()))?;

    print_json(&stats, true)
}

/// Collect n-grams from a corpus file.
pub fn collect_ngrams(
    settings: &Settings,
    corpus: &Path,
    output: &Path,
    max_n: usize,
    min_df: usize,
) -> Result<()> {
    if max_n < 2 {
        bail!("--max-n must be at least 2");
    }
    let embeddings: Arc<dyn EmbeddingStore> = Arc::new(load_embeddings(&settings.embeddings_path)?);
    let preprocessor = Preprocessor::with_vocabulary(embeddings.clone());

    let file = fs::File::open(corpus)
        .with_context(|| format!("Failed to open corpus {}", corpus.display()))?;
    let mut documents: Vec<Vec<Word>> = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            documents.push(preprocessor.tokenize(&line));
        }
    }
    info!(documents = documents.len(), "Corpus tokenized");

    let ngrams = NgramCollector::new(&documents, max_n).collect(min_df, Some(embeddings.as_ref()));
    save_ngrams(output, &ngrams)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} n-grams written to {}", ngrams.len(), output.display());
    Ok(())
}

/// Classify a document and print the ranked labels as JSON.
pub fn classify(
    settings: &Settings,
    text: Option<&str>,
    file: Option<&Path>,
    labels: &[String],
    top: Option<usize>,
    pretty: bool,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Provide the document text or --file"),
    };

    let classifier = open_classifier(settings)?;
    let mut records = classifier.classify(&text, labels);
    if let Some(top) = top {
        records.truncate(top);
    }
    print_json(&records, pretty)
}

#[derive(Serialize)]
struct NeighborhoodRow<'a> {
    word: &'a str,
    similarity: f32,
    from: &'a [Word],
}

/// Print the most similar words of a label's final neighborhood.
pub fn show_neighborhood(settings: &Settings, label: &str, limit: usize) -> Result<()> {
    let classifier = open_classifier(settings)?;
    let neighborhood = classifier
        .neighborhood(label)
        .with_context(|| format!("Failed to build neighborhood for '{}'", label))?;
    let variant = settings.scoring.similarity;

    let mut rows: Vec<NeighborhoodRow> = neighborhood
        .iter()
        .map(|(word, entry)| NeighborhoodRow {
            word,
            similarity: entry.sim.get(variant),
            from: &entry.from,
        })
        .collect();
    rows.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    rows.truncate(limit);

    println!("{} words in '{}' ({} similarity)", neighborhood.len(), label, variant);
    print_json(&rows, true)
}

/// Print the relation chains linking a document to a label.
pub fn explain(settings: &Settings, text: &str, label: &str) -> Result<()> {
    let classifier = open_classifier(settings)?;
    let records = classifier.classify(text, &[label.to_string()]);
    let Some(record) = records.first() else {
        bail!("No result for '{}'", label);
    };
    if let Some(error) = &record.error {
        bail!("Failed to score '{}': {}", label, error);
    }

    println!("{}: {:.6}", record.label, record.raw_score);
    if record.explanations.is_empty() {
        println!("  no document token is related to '{}'", label);
    }
    for explanation in &record.explanations {
        println!(
            "  {:.4}  {}  ({})",
            explanation.similarity,
            explanation.path,
            explanation.path.describe()
        );
    }
    Ok(())
}

/// Precompute label neighborhoods.
pub fn warm(settings: &Settings, labels: &[String]) -> Result<()> {
    let classifier = open_classifier(settings)?;
    let ok = classifier.warm(labels);
    println!("{}/{} labels cached", ok, labels.len());
    if ok < labels.len() {
        bail!("{} labels failed", labels.len() - ok);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify_requires_text() {
        let settings = Settings::default();
        let err = classify(&settings, None, None, &["space".to_string()], None, false).unwrap_err();
        assert!(err.to_string().contains("--file"));
    }

    #[test]
    fn test_ngrams_rejects_unigrams() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let err = collect_ngrams(
            &settings,
            &dir.path().join("corpus.txt"),
            &dir.path().join("out.txt"),
            1,
            1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max-n"));
    }

    #[test]
    fn test_missing_embeddings_has_context() {
        let dir = TempDir::new().unwrap();
        let err = load_embeddings(&dir.path().join("missing.txt").to_string_lossy()).unwrap_err();
        assert!(err.to_string().contains("Failed to load embeddings"));
    }
}
