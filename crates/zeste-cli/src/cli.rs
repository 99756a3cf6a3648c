//! CLI argument parsing for zeste.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use zeste_types::{KeepPolicy, Normalization, RelationFilter, Settings, SimilarityKind};

/// ZeSTE zero-shot topic classifier
///
/// Scores documents against arbitrary labels through their ConceptNet
/// neighborhoods.
#[derive(Parser, Debug)]
#[command(name = "zeste")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/zeste/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the graph store from a ConceptNet assertions dump
    Import {
        /// Tab-separated assertions file
        assertions: PathBuf,

        /// Override embeddings path
        #[arg(long)]
        embeddings: Option<String>,

        /// Override graph output directory
        #[arg(long)]
        graph: Option<String>,
    },

    /// Collect an n-gram list from a corpus (one document per line)
    Ngrams {
        corpus: PathBuf,

        /// Output file, one phrase per line
        #[arg(short, long)]
        output: PathBuf,

        /// Longest n-gram
        #[arg(long, default_value = "3")]
        max_n: usize,

        /// Minimum number of documents a phrase must appear in
        #[arg(long, default_value = "2")]
        min_df: usize,
    },

    /// Classify a document against labels
    Classify {
        /// Document text (read from --file when absent)
        text: Option<String>,

        /// Read the document from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Comma-separated labels
        #[arg(short = 'L', long, value_delimiter = ',', required = true)]
        labels: Vec<String>,

        /// Number of results to print
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the final neighborhood of a label
    Neighborhood {
        label: String,

        /// Maximum words to print, most similar first
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Explain how a document's tokens relate to a label
    Explain {
        text: String,

        label: String,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Precompute and cache label neighborhoods
    Warm {
        /// Comma-separated labels
        #[arg(value_delimiter = ',', required = true)]
        labels: Vec<String>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

/// Per-invocation overrides of the expansion, filter and scoring settings.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Expansion depth
    #[arg(long)]
    pub depth: Option<usize>,

    /// Relations followed during expansion (`all` or comma-separated)
    #[arg(long)]
    pub rels: Option<RelationFilter>,

    /// Relations required to survive filtering
    #[arg(long)]
    pub filter_rels: Option<RelationFilter>,

    /// Similarity variant
    #[arg(long)]
    pub similarity: Option<SimilarityKind>,

    /// Keep policy (all, topN, topP%, threshT)
    #[arg(long)]
    pub keep: Option<KeepPolicy>,

    /// Score normalization (none, inter_len, max_score)
    #[arg(long)]
    pub normalize: Option<Normalization>,

    /// N-gram list used to augment document tokens
    #[arg(long)]
    pub ngrams: Option<String>,
}

impl TuningArgs {
    /// Apply the overrides that were given.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(depth) = self.depth {
            settings.expansion.depth = depth;
        }
        if let Some(rels) = &self.rels {
            settings.expansion.allowed_rels = rels.clone();
        }
        if let Some(rels) = &self.filter_rels {
            settings.filter.allowed_rels = rels.clone();
        }
        if let Some(similarity) = self.similarity {
            settings.scoring.similarity = similarity;
        }
        if let Some(keep) = self.keep {
            settings.filter.keep = keep;
        }
        if let Some(normalize) = self.normalize {
            settings.scoring.normalize = normalize;
        }
        if let Some(path) = &self.ngrams {
            settings.scoring.ngrams_path = Some(path.clone());
        }
    }
}
