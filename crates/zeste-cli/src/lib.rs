//! zeste command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (import, ngrams, classify, neighborhood, explain, warm)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, TuningArgs};
pub use commands::{classify, collect_ngrams, explain, import_graph, init, show_neighborhood, warm};
