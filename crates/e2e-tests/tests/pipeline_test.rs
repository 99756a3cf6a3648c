//! Full pipeline E2E tests: embeddings file + ConceptNet dump -> imported
//! graph store -> classifier opened from settings.

use std::collections::HashSet;

use pretty_assertions::assert_eq;

use e2e_tests::{labels, TestHarness};
use zeste_core::{Classifier, ClassifierConfig};
use zeste_embeddings::{EmbeddingStore, EmbeddingTable};
use zeste_storage::{FileGraphStore, Importer, RelationGraph};

fn import(harness: &TestHarness) -> zeste_types::Settings {
    let settings = harness.write_fixture_files();
    let embeddings = EmbeddingTable::load(&settings.embeddings_path).unwrap();
    let store = FileGraphStore::create(&settings.graph_path, 16).unwrap();

    let stats = Importer::new(&embeddings)
        .import_file(harness.assertions_path(), &store)
        .unwrap();
    assert_eq!(stats.lines, 5);
    assert_eq!(stats.assertions, 4);
    assert_eq!(stats.skipped_language, 1);
    assert_eq!(stats.records, 6);
    assert_eq!(store.record_count().unwrap(), 6);

    settings
}

#[test]
fn test_import_round_trip() {
    let harness = TestHarness::new();
    let settings = import(&harness);

    let store = FileGraphStore::open(&settings.graph_path, 16).unwrap();
    let record = store.get_record("space").unwrap().expect("space record");
    let star = record.get("star").expect("star edge");
    assert!((star.sim - harness.sim("space", "star")).abs() < 1e-6);

    assert!(store.get_record("amour").unwrap().is_none());
}

#[test]
fn test_embeddings_file_matches_fixture() {
    let harness = TestHarness::new();
    let settings = harness.write_fixture_files();
    let loaded = EmbeddingTable::load(&settings.embeddings_path).unwrap();

    assert_eq!(loaded.len(), harness.embeddings.len());
    assert_eq!(loaded.dimension(), 3);
    let a = loaded.similarity("television_show", "love").unwrap();
    let b = harness.sim("television_show", "love");
    assert!((a - b).abs() < 1e-6);
}

#[test]
fn test_classifier_from_settings() {
    let harness = TestHarness::new();
    let settings = import(&harness);
    let classifier = Classifier::from_settings(&settings).unwrap();

    let records = classifier.classify("The stars were shining", &labels(&["music", "space"]));
    assert_eq!(records[0].label, "space");
    assert!((records[0].score - 1.0).abs() < 1e-9);

    // Same words as the in-memory fixture graph
    let from_disk: HashSet<String> = classifier.neighborhood("space").unwrap().words().cloned().collect();
    let from_memory: HashSet<String> = harness
        .uncached_classifier(ClassifierConfig::from(&settings))
        .neighborhood("space")
        .unwrap()
        .words()
        .cloned()
        .collect();
    assert_eq!(from_disk, from_memory);
}

#[test]
fn test_missing_graph_is_reported() {
    let harness = TestHarness::new();
    let settings = harness.write_fixture_files();
    assert!(Classifier::from_settings(&settings).is_err());
}
