//! Durable key-value storage
//!
//! Stands in for browser local storage: small string values under fixed keys
//! that survive restarts. Operations are synchronous so callers can persist
//! before returning from a mutation.

use crate::domain::{GodwitError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Durable string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Reads a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read. A missing key
    /// is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value; removing a missing key succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under a directory
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            GodwitError::Storage(format!(
                "Failed to create storage directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the stored values
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GodwitError::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        std::fs::write(&tmp, value)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                GodwitError::Storage(format!("Failed to write {}: {e}", path.display()))
            })?;

        tracing::trace!(key = key, path = %path.display(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GodwitError::Storage(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}

/// In-memory store for tests and embedding hosts without a disk
///
/// Counts successful writes and can be told to fail them, which lets tests
/// observe write-through behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes subsequent `set` calls fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw snapshot of a stored value
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GodwitError::Storage(format!(
                "Write to '{key}' rejected: storage unavailable"
            )));
        }
        self.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
