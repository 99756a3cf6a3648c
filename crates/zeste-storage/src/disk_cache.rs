//! Content-addressed disk cache.
//!
//! Values are JSON files under a root directory, one per key. A missing file
//! is a miss. Writes go to a temp file in the same directory and are then
//! renamed over the target, so a reader sees either nothing or a complete
//! value. Concurrent writers of the same key race; the last rename wins.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::keys::{encode, WordKey};

/// JSON value cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Open a cache, creating the root directory if needed.
    ///
    /// Returns `CacheUnavailable` when the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StorageError::CacheUnavailable {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Open a sub-cache in `{root}/{name}`.
    pub fn namespace(&self, name: &str) -> Result<DiskCache, StorageError> {
        DiskCache::open(self.root.join(encode(name)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(WordKey::new(key).file_name())
    }

    /// Whether a value is stored for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Load the value stored under `key`; `Ok(None)` on a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "Disk cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&bytes)?;
        debug!(key, "Disk cache hit");
        Ok(Some(value))
    }

    /// Store `value` under `key` atomically.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
        }
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        debug!(key, path = %path.display(), "Disk cache write");
        Ok(())
    }

    /// Keys currently stored, in no particular order.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            // Temp files from in-flight writes have no .json suffix
            if let Ok(key) = WordKey::from_file_name(name) {
                keys.push(key.word);
            }
        }
        Ok(keys)
    }
}
