//! Relation graph store.
//!
//! The graph is persisted as one JSON `GraphRecord` per word under a root
//! directory (`{root}/{word}.json`). Records are read-only at serving time;
//! the hottest ones are kept in a bounded LRU behind a mutex.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::{debug, info};

use zeste_types::{GraphRecord, RelationKind};

use crate::disk_cache::DiskCache;
use crate::error::StorageError;

/// Read-only word -> one-hop record lookup.
pub trait RelationGraph: Send + Sync {
    /// Record of `word`; `Ok(None)` when the word is not in the graph.
    fn get_record(&self, word: &str) -> Result<Option<Arc<GraphRecord>>, StorageError>;
}

/// Graph store backed by one JSON file per word.
pub struct FileGraphStore {
    records: DiskCache,
    /// Negative lookups are cached too, as `None`
    cache: Mutex<LruCache<String, Option<Arc<GraphRecord>>>>,
}

impl FileGraphStore {
    /// Open an existing graph directory for reading.
    pub fn open(root: impl AsRef<Path>, cache_size: usize) -> Result<Self, StorageError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(StorageError::GraphNotFound(root.to_path_buf()));
        }
        info!(path = %root.display(), cache_size, "Opening graph store");
        Self::with_cache(DiskCache::open(root)?, cache_size)
    }

    /// Create (or reuse) a graph directory for writing records.
    pub fn create(root: impl AsRef<Path>, cache_size: usize) -> Result<Self, StorageError> {
        Self::with_cache(DiskCache::open(root)?, cache_size)
    }

    fn with_cache(records: DiskCache, cache_size: usize) -> Result<Self, StorageError> {
        let size = NonZeroUsize::new(cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            records,
            cache: Mutex::new(LruCache::new(size)),
        })
    }

    pub fn root(&self) -> &Path {
        self.records.root()
    }

    /// Path of the record file for `word`.
    pub fn record_path(&self, word: &str) -> PathBuf {
        self.records.path_for(word)
    }

    /// Write a record, replacing any previous version.
    pub fn put_record(&self, record: &GraphRecord) -> Result<(), StorageError> {
        self.records.put(&record.word, record)?;
        let mut cache = self.cache.lock().map_err(|_| StorageError::LockPoisoned)?;
        cache.pop(&record.word);
        Ok(())
    }

    /// Number of records on disk.
    pub fn record_count(&self) -> Result<usize, StorageError> {
        Ok(self.records.keys()?.len())
    }
}

impl RelationGraph for FileGraphStore {
    fn get_record(&self, word: &str) -> Result<Option<Arc<GraphRecord>>, StorageError> {
        {
            let mut cache = self.cache.lock().map_err(|_| StorageError::LockPoisoned)?;
            if let Some(hit) = cache.get(word) {
                return Ok(hit.clone());
            }
        }

        let record = self.records.get::<GraphRecord>(word)?.map(Arc::new);
        if record.is_none() {
            debug!(word, "No graph record");
        }

        let mut cache = self.cache.lock().map_err(|_| StorageError::LockPoisoned)?;
        cache.put(word.to_string(), record.clone());
        Ok(record)
    }
}

/// In-memory graph, used for tests and small fixture graphs.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    records: HashMap<String, Arc<GraphRecord>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: GraphRecord) {
        self.records.insert(record.word.clone(), Arc::new(record));
    }

    /// Add the assertion `subject --kind--> object` in both directions.
    ///
    /// `object`'s record gets `subject` tagged `kind`; `subject`'s record
    /// gets `object` tagged with the inverse kind.
    pub fn add_assertion(&mut self, subject: &str, kind: RelationKind, object: &str, sim: f32) {
        self.record_mut(object).add_relation(subject, kind, sim);
        self.record_mut(subject)
            .add_relation(object, kind.inverse(), sim);
    }

    fn record_mut(&mut self, word: &str) -> &mut GraphRecord {
        let entry = self
            .records
            .entry(word.to_string())
            .or_insert_with(|| Arc::new(GraphRecord::new(word)));
        Arc::make_mut(entry)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &GraphRecord> {
        self.records.values().map(|r| r.as_ref())
    }
}

impl RelationGraph for MemoryGraph {
    fn get_record(&self, word: &str) -> Result<Option<Arc<GraphRecord>>, StorageError> {
        Ok(self.records.get(word).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn space_record() -> GraphRecord {
        let mut record = GraphRecord::new("space");
        record.add_relation("star", RelationKind::AtLocation, 0.4);
        record
    }

    #[test]
    fn test_open_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = FileGraphStore::open(dir.path().join("nope"), 16);
        assert!(matches!(result, Err(StorageError::GraphNotFound(_))));
    }

    #[test]
    fn test_put_and_get_record() {
        let dir = TempDir::new().unwrap();
        let store = FileGraphStore::create(dir.path(), 16).unwrap();
        store.put_record(&space_record()).unwrap();

        let reopened = FileGraphStore::open(dir.path(), 16).unwrap();
        let record = reopened.get_record("space").unwrap().unwrap();
        assert_eq!(*record, space_record());
        assert_eq!(reopened.record_count().unwrap(), 1);
        assert!(reopened.record_path("space").is_file());
    }

    #[test]
    fn test_missing_word_is_none_and_cached() {
        let dir = TempDir::new().unwrap();
        let store = FileGraphStore::create(dir.path(), 16).unwrap();
        assert!(store.get_record("nebula").unwrap().is_none());
        // Writing through the store invalidates the negative entry
        let mut record = GraphRecord::new("nebula");
        record.add_relation("space", RelationKind::RelatedTo, 0.3);
        store.put_record(&record).unwrap();
        assert!(store.get_record("nebula").unwrap().is_some());
    }

    #[test]
    fn test_lru_serves_after_file_removed() {
        let dir = TempDir::new().unwrap();
        let store = FileGraphStore::create(dir.path(), 16).unwrap();
        store.put_record(&space_record()).unwrap();
        assert!(store.get_record("space").unwrap().is_some());
        std::fs::remove_file(store.record_path("space")).unwrap();
        assert!(store.get_record("space").unwrap().is_some());
    }

    #[test]
    fn test_memory_graph_assertion_is_bidirectional() {
        let mut graph = MemoryGraph::new();
        graph.add_assertion("star", RelationKind::AtLocation, "space", 0.4);

        let space = graph.get_record("space").unwrap().unwrap();
        assert_eq!(space.get("star").unwrap().rels, vec![RelationKind::AtLocation]);
        assert_eq!(space.neighbors[0].word, "space");

        let star = graph.get_record("star").unwrap().unwrap();
        assert_eq!(star.get("space").unwrap().rels, vec![RelationKind::LocationOf]);
        assert_eq!(graph.len(), 2);
    }
}
