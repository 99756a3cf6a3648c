//! Configuration loading for ZeSTE.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/zeste/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;
use crate::policy::{KeepPolicy, Normalization, OovTokens};
use crate::relation::RelationFilter;
use crate::similarity::SimilarityKind;

/// Neighborhood expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Number of hops explored from each label word
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Relations followed during traversal
    #[serde(default)]
    pub allowed_rels: RelationFilter,

    /// Do not expand frontier words that are stopwords
    #[serde(default = "default_true")]
    pub skip_stopwords: bool,

    /// Do not expand frontier words with non-positive similarity to the seed
    #[serde(default = "default_true")]
    pub skip_nonpositive: bool,

    /// Maximum number of words in a multiword label
    #[serde(default = "default_max_label_words")]
    pub max_label_words: usize,
}

fn default_depth() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_max_label_words() -> usize {
    50
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            allowed_rels: RelationFilter::All,
            skip_stopwords: true,
            skip_nonpositive: true,
            max_label_words: default_max_label_words(),
        }
    }
}

/// Neighborhood pruning settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Relations a word must be reached by to survive
    #[serde(default)]
    pub allowed_rels: RelationFilter,

    /// Similarity cutoff policy
    #[serde(default)]
    pub keep: KeepPolicy,
}

/// Document scoring settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Similarity variant used for filtering and scoring
    #[serde(default)]
    pub similarity: SimilarityKind,

    /// Per-label normalization
    #[serde(default)]
    pub normalize: Normalization,

    /// Treatment of zero-similarity matches in `inter_len`
    #[serde(default)]
    pub oov_tokens: OovTokens,

    /// Optional file with one n-gram per line used to augment tokens
    #[serde(default)]
    pub ngrams_path: Option<String>,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory of one-hop graph records
    #[serde(default = "default_graph_path")]
    pub graph_path: String,

    /// word2vec-format embedding table (Numberbatch)
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: String,

    /// Root of the per-depth prefetch cache
    #[serde(default = "default_prefetch_path")]
    pub prefetch_path: String,

    /// Root of the per-label neighborhood cache
    #[serde(default = "default_label_cache_path")]
    pub label_cache_path: String,

    /// Number of graph records kept in memory
    #[serde(default = "default_record_cache_size")]
    pub record_cache_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub expansion: ExpansionConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn data_dir(leaf: &str) -> String {
    ProjectDirs::from("", "", "zeste")
        .map(|p| p.data_local_dir().join(leaf))
        .unwrap_or_else(|| PathBuf::from(format!("./{}", leaf)))
        .to_string_lossy()
        .to_string()
}

fn default_graph_path() -> String {
    data_dir("graph")
}

fn default_embeddings_path() -> String {
    data_dir("numberbatch-en-19.08.txt")
}

fn default_prefetch_path() -> String {
    data_dir("prefetch")
}

fn default_label_cache_path() -> String {
    data_dir("labels")
}

fn default_record_cache_size() -> usize {
    4096
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_path: default_graph_path(),
            embeddings_path: default_embeddings_path(),
            prefetch_path: default_prefetch_path(),
            label_cache_path: default_label_cache_path(),
            record_cache_size: default_record_cache_size(),
            log_level: default_log_level(),
            expansion: ExpansionConfig::default(),
            filter: FilterConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/zeste/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ZESTE_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "zeste")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("graph_path", default_graph_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("embeddings_path", default_embeddings_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("prefetch_path", default_prefetch_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("label_cache_path", default_label_cache_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("record_cache_size", default_record_cache_size() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ZESTE_GRAPH_PATH, ZESTE_EXPANSION__DEPTH, ZESTE_SCORING__NORMALIZE, ...
        builder = builder.add_source(
            Environment::with_prefix("ZESTE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.expansion.max_label_words == 0 {
            return Err(TypesError::Config(
                "expansion.max_label_words must be > 0".to_string(),
            ));
        }
        if self.record_cache_size == 0 {
            return Err(TypesError::Config(
                "record_cache_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand ~ in a configured path.
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.expansion.depth, 2);
        assert!(settings.expansion.allowed_rels.is_all());
        assert_eq!(settings.filter.keep, KeepPolicy::All);
        assert_eq!(settings.scoring.similarity, SimilarityKind::Simple);
        assert_eq!(settings.scoring.normalize, Normalization::None);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("zeste.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
graph_path = "/data/graph"

[expansion]
depth = 3
allowed_rels = "isa,relatedto"

[filter]
keep = "top-100"

[scoring]
similarity = "compound"
normalize = "max_score"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.graph_path, "/data/graph");
        assert_eq!(settings.expansion.depth, 3);
        assert!(!settings.expansion.allowed_rels.is_all());
        assert_eq!(settings.filter.keep, KeepPolicy::Top(100));
        assert_eq!(settings.scoring.similarity, SimilarityKind::Compound);
        assert_eq!(settings.scoring.normalize, Normalization::MaxScore);
        // Untouched sections keep their defaults
        assert!(settings.expansion.skip_stopwords);
        assert_eq!(settings.expansion.max_label_words, 50);
    }

    #[test]
    fn test_validate_rejects_zero_label_words() {
        let mut settings = Settings::default();
        settings.expansion.max_label_words = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(Settings::expand_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.expansion.depth, settings.expansion.depth);
        assert_eq!(decoded.filter.keep, settings.filter.keep);
    }
}
