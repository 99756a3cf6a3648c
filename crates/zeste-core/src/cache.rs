//! Two-tier neighborhood cache.
//!
//! - Prefetch tier: expanded single-word neighborhoods, one directory per
//!   expansion configuration (`{prefetch}/{depth}[-{rels}]/{word}.json`).
//!   Only depth > 1 is cached; depth 1 is the graph record itself.
//! - Label tier: final, filtered label neighborhoods, one directory per
//!   configuration fingerprint (`{labels}/{fingerprint}/{label}.json`).
//!
//! Entries are never invalidated. A tier whose root cannot be created is
//! disabled with a warning; failed reads and writes are logged and treated
//! as misses so callers always fall back to recomputation.

use std::path::Path;

use tracing::{debug, warn};

use zeste_storage::DiskCache;
use zeste_types::{ExpansionConfig, KeepPolicy, Neighborhood, RelationFilter, SimilarityKind};

/// Cache directory name for an expansion configuration.
///
/// Pruning flags are part of the name only when they differ from the
/// defaults, so the common layout stays `{depth}[-{rels}]`.
pub fn prefetch_namespace(
    depth: usize,
    rels: &RelationFilter,
    skip_stopwords: bool,
    skip_nonpositive: bool,
) -> String {
    let mut name = depth.to_string();
    if let Some(fp) = rels.fingerprint() {
        name.push('-');
        name.push_str(&fp);
    }
    if !skip_stopwords {
        name.push_str("-stopwords");
    }
    if !skip_nonpositive {
        name.push_str("-nonpositive");
    }
    name
}

/// Fingerprint of everything that shapes a final label neighborhood.
///
/// Frontier pruning flags are appended the way [`prefetch_namespace`] does.
pub fn label_fingerprint(
    expansion: &ExpansionConfig,
    filter_rels: &RelationFilter,
    variant: SimilarityKind,
    keep: &KeepPolicy,
) -> String {
    let rels = |f: &RelationFilter| f.fingerprint().unwrap_or_else(|| "all".to_string());
    let mut fingerprint = format!(
        "d{}_{}_{}_{}_{}",
        expansion.depth,
        rels(&expansion.allowed_rels),
        rels(filter_rels),
        variant,
        keep
    );
    if !expansion.skip_stopwords {
        fingerprint.push_str("-stopwords");
    }
    if !expansion.skip_nonpositive {
        fingerprint.push_str("-nonpositive");
    }
    fingerprint
}

/// Prefetch and label tiers over disk caches.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodCache {
    prefetch: Option<DiskCache>,
    labels: Option<DiskCache>,
}

fn open_tier(root: Option<&Path>, tier: &str) -> Option<DiskCache> {
    let root = root?;
    match DiskCache::open(root) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(tier, error = %e, "Neighborhood cache unavailable, computing uncached");
            None
        }
    }
}

impl NeighborhoodCache {
    /// Cache with both tiers disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open the tiers whose roots are given.
    pub fn open(prefetch_root: Option<&Path>, label_root: Option<&Path>) -> Self {
        Self {
            prefetch: open_tier(prefetch_root, "prefetch"),
            labels: open_tier(label_root, "labels"),
        }
    }

    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch.is_some()
    }

    pub fn labels_enabled(&self) -> bool {
        self.labels.is_some()
    }

    /// Cached expansion of `word` in the given prefetch namespace.
    pub fn get_prefetch(&self, namespace: &str, word: &str) -> Option<Neighborhood> {
        let tier = self.prefetch.as_ref()?;
        read(tier, namespace, word, "prefetch")
    }

    pub fn put_prefetch(&self, namespace: &str, word: &str, neighborhood: &Neighborhood) {
        if let Some(tier) = &self.prefetch {
            write(tier, namespace, word, neighborhood, "prefetch");
        }
    }

    /// Cached final neighborhood of `label` under `fingerprint`.
    pub fn get_label(&self, fingerprint: &str, label: &str) -> Option<Neighborhood> {
        let tier = self.labels.as_ref()?;
        read(tier, fingerprint, label, "labels")
    }

    pub fn put_label(&self, fingerprint: &str, label: &str, neighborhood: &Neighborhood) {
        if let Some(tier) = &self.labels {
            write(tier, fingerprint, label, neighborhood, "labels");
        }
    }
}

fn read(tier: &DiskCache, namespace: &str, key: &str, name: &str) -> Option<Neighborhood> {
    let dir = match tier.namespace(namespace) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(tier = name, namespace, error = %e, "Cache namespace unavailable");
            return None;
        }
    };
    match dir.get::<Neighborhood>(key) {
        Ok(Some(n)) => {
            debug!(tier = name, key, words = n.len(), "Neighborhood cache hit");
            Some(n)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(tier = name, key, error = %e, "Unreadable cache entry, recomputing");
            None
        }
    }
}

fn write(tier: &DiskCache, namespace: &str, key: &str, neighborhood: &Neighborhood, name: &str) {
    let result = tier
        .namespace(namespace)
        .and_then(|dir| dir.put(key, neighborhood));
    if let Err(e) = result {
        warn!(tier = name, key, error = %e, "Failed to write neighborhood cache");
    }
}
