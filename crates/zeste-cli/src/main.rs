//! ZeSTE zero-shot topic classifier
//!
//! # Usage
//!
//! ```bash
//! zeste import conceptnet-assertions-5.7.0.csv
//! zeste ngrams corpus.txt --output ngrams.txt
//! zeste classify "The stars shine tonight" --labels space,music,sport
//! zeste neighborhood space --keep top100
//! zeste explain "love television show" space
//! zeste warm space,music,sport
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/zeste/config.toml)
//! 3. Environment variables (ZESTE_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use zeste_cli::{
    classify, collect_ngrams, explain, import_graph, init, show_neighborhood, warm, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Import {
            assertions,
            embeddings,
            graph,
        } => {
            let settings = init(config, log_level, None)?;
            import_graph(&settings, &assertions, embeddings.as_deref(), graph.as_deref())?;
        }
        Commands::Ngrams {
            corpus,
            output,
            max_n,
            min_df,
        } => {
            let settings = init(config, log_level, None)?;
            collect_ngrams(&settings, &corpus, &output, max_n, min_df)?;
        }
        Commands::Classify {
            text,
            file,
            labels,
            top,
            pretty,
            tuning,
        } => {
            let settings = init(config, log_level, Some(&tuning))?;
            classify(&settings, text.as_deref(), file.as_deref(), &labels, top, pretty)?;
        }
        Commands::Neighborhood {
            label,
            limit,
            tuning,
        } => {
            let settings = init(config, log_level, Some(&tuning))?;
            show_neighborhood(&settings, &label, limit)?;
        }
        Commands::Explain {
            text,
            label,
            tuning,
        } => {
            let settings = init(config, log_level, Some(&tuning))?;
            explain(&settings, &text, &label)?;
        }
        Commands::Warm { labels, tuning } => {
            let settings = init(config, log_level, Some(&tuning))?;
            warm(&settings, &labels)?;
        }
    }

    Ok(())
}
