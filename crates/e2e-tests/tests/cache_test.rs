//! Neighborhood cache E2E tests.
//!
//! Verifies the on-disk layout of both tiers, that cached neighborhoods are
//! served without touching the graph, graceful degradation when a cache
//! root cannot be created, and depth monotonicity.

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::{labels, TestHarness};
use zeste_core::{Classifier, ClassifierConfig, NeighborhoodCache};
use zeste_storage::MemoryGraph;
use zeste_types::KeepPolicy;

#[test]
fn test_cache_file_layout() {
    let harness = TestHarness::new();
    let classifier = harness.classifier(ClassifierConfig::default());

    classifier.neighborhood("space").unwrap();

    assert!(harness.prefetch_path.join("2").join("space.json").is_file());
    assert!(harness
        .label_cache_path
        .join(classifier.fingerprint())
        .join("space.json")
        .is_file());
}

#[test]
fn test_depth_one_skips_prefetch_tier() {
    let harness = TestHarness::new();
    let mut config = ClassifierConfig::default();
    config.expansion.depth = 1;
    let classifier = harness.classifier(config);

    classifier.neighborhood("space").unwrap();

    assert!(!harness.prefetch_path.join("1").exists());
    assert!(harness
        .label_cache_path
        .join(classifier.fingerprint())
        .join("space.json")
        .is_file());
}

/// Once cached, neighborhoods are served without the graph.
#[test]
fn test_cached_tiers_serve_without_graph() {
    let harness = TestHarness::new();
    let expected = harness
        .classifier(ClassifierConfig::default())
        .neighborhood("space")
        .unwrap();

    // Label tier
    let classifier = Classifier::new(
        Arc::new(MemoryGraph::new()),
        harness.embeddings.clone(),
        harness.cache(),
        ClassifierConfig::default(),
    );
    assert_eq!(classifier.neighborhood("space").unwrap(), expected);

    // Prefetch tier alone, with a configuration the label tier has not seen
    let mut config = ClassifierConfig::default();
    config.filter.keep = KeepPolicy::Top(2);
    let classifier = Classifier::new(
        Arc::new(MemoryGraph::new()),
        harness.embeddings.clone(),
        NeighborhoodCache::open(Some(harness.prefetch_path.as_path()), None),
        config,
    );
    let top: Vec<String> = classifier.neighborhood("space").unwrap().words().cloned().collect();
    assert_eq!(top, vec!["space".to_string(), "star".to_string()]);
}

#[test]
fn test_label_cache_is_keyed_by_configuration() {
    let harness = TestHarness::new();
    let all = harness.classifier(ClassifierConfig::default());

    let mut config = ClassifierConfig::default();
    config.filter.keep = KeepPolicy::Top(1);
    let top1 = harness.classifier(config);

    assert_ne!(all.fingerprint(), top1.fingerprint());
    assert_eq!(all.neighborhood("space").unwrap().len(), 4);
    assert_eq!(top1.neighborhood("space").unwrap().len(), 1);
    assert_eq!(all.neighborhood("space").unwrap().len(), 4);
}

/// A cache root that cannot be created disables the tier; results match
/// the uncached computation.
#[test]
fn test_unavailable_cache_degrades_to_uncached() {
    let harness = TestHarness::new();
    let blocker = harness._temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let cache = NeighborhoodCache::open(Some(blocker.join("prefetch").as_path()), Some(blocker.as_path()));
    assert!(!cache.prefetch_enabled());
    assert!(!cache.labels_enabled());

    let degraded = Classifier::new(
        harness.graph.clone(),
        harness.embeddings.clone(),
        cache,
        ClassifierConfig::default(),
    );
    let uncached = harness.uncached_classifier(ClassifierConfig::default());

    let doc = "stars on television";
    let names = labels(&["space", "music"]);
    assert_eq!(degraded.classify(doc, &names), uncached.classify(doc, &names));
}

#[test]
fn test_warm_populates_label_tier() {
    let harness = TestHarness::new();
    let classifier = harness.classifier(ClassifierConfig::default());

    assert_eq!(classifier.warm(&labels(&["space", "music"])), 2);
    let dir = harness.label_cache_path.join(classifier.fingerprint());
    assert!(dir.join("space.json").is_file());
    assert!(dir.join("music.json").is_file());
}

#[test]
fn test_neighborhood_grows_with_depth() {
    let harness = TestHarness::new();
    let words_at = |depth: usize| -> HashSet<String> {
        let mut config = ClassifierConfig::default();
        config.expansion.depth = depth;
        harness
            .uncached_classifier(config)
            .neighborhood("space")
            .unwrap()
            .words()
            .cloned()
            .collect()
    };

    let d0 = words_at(0);
    let d1 = words_at(1);
    let d2 = words_at(2);
    let d3 = words_at(3);

    assert!(d0.is_empty());
    assert!(d1.is_subset(&d2));
    assert!(d2.is_subset(&d3));
    assert!(!d1.contains("love"));
    assert!(d2.contains("love"));
}
