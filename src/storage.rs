//! Storage backends for todomaster
//!
//! Persisted state is a flat key/value document. The store reads and writes
//! whole keys (`tasks`, `history`, `settings`, ...) and never partial records.
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   storage.json        # The key/value document
//!   storage.json.lock   # Advisory lock held while writing
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the storage document inside the data directory
pub const STORAGE_FILE: &str = "storage.json";

/// A persistent key/value area
///
/// Keys map to arbitrary JSON values. `get` only returns keys that are
/// present; missing keys are simply absent from the result.
pub trait KeyValueStore {
    /// Read the requested keys
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write every entry, replacing existing values
    fn set(&mut self, entries: Map<String, Value>) -> Result<()>;

    /// Delete keys; missing keys are ignored
    fn remove(&mut self, keys: &[&str]) -> Result<()>;

    /// Bytes currently used by the whole area
    fn bytes_in_use(&self) -> Result<u64>;
}

/// JSON document on disk, rewritten atomically under a lock
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStorage {
    /// Storage rooted at `data_dir/storage.json`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path to the storage document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|err| Error::storage("read", format!("{}: {err}", self.path.display())))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::storage(
                "read",
                format!("{} is not a JSON object", self.path.display()),
            )),
            Err(err) => Err(Error::storage(
                "read",
                format!("{}: {err}", self.path.display()),
            )),
        }
    }

    /// Read-modify-write the document while holding the lock
    fn update_document<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), self.lock_timeout_ms)?;

        // An unreadable document is replaced rather than blocking every write
        let mut document = self.read_document().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "replacing unreadable storage document");
            Map::new()
        });
        mutate(&mut document);

        let json = serde_json::to_string_pretty(&Value::Object(document))?;
        lock::write_atomic(&self.path, json.as_bytes())
            .map_err(|err| Error::storage("write", err.to_string()))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut document = self.read_document()?;
        let mut found = Map::new();
        for key in keys {
            if let Some(value) = document.remove(*key) {
                found.insert((*key).to_string(), value);
            }
        }
        tracing::debug!(path = %self.path.display(), requested = keys.len(), found = found.len(), "storage get");
        Ok(found)
    }

    fn set(&mut self, entries: Map<String, Value>) -> Result<()> {
        let count = entries.len();
        self.update_document(|document| document.extend(entries))?;
        tracing::debug!(path = %self.path.display(), keys = count, "storage set");
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<()> {
        self.update_document(|document| {
            for key in keys {
                document.remove(*key);
            }
        })
    }

    fn bytes_in_use(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(Error::storage("usage", err.to_string())),
        }
    }
}

/// In-memory key/value area with switchable failures
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Map<String, Value>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate from an existing document
    pub fn with_document(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// The raw document, for inspection
    pub fn document(&self) -> &Map<String, Value> {
        &self.data
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        if self.fail_reads {
            return Err(Error::storage("read", "storage unavailable"));
        }
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.data
                    .get(*key)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&mut self, entries: Map<String, Value>) -> Result<()> {
        if self.fail_writes {
            return Err(Error::storage("write", "storage unavailable"));
        }
        self.data.extend(entries);
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::storage("write", "storage unavailable"));
        }
        for key in keys {
            self.data.remove(*key);
        }
        Ok(())
    }

    fn bytes_in_use(&self) -> Result<u64> {
        let bytes = serde_json::to_vec(&self.data)?;
        Ok(bytes.len() as u64)
    }
}
