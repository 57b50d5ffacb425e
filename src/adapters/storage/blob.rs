//! Transient local artifacts
//!
//! A blob is fetched binary content made locally addressable by URL, the way
//! a browser object URL is. Every created blob must be released exactly once
//! by its owner; see `core::artifact::ArtifactSlot` for the ownership rules.

use crate::domain::{GodwitError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use url::Url;
use uuid::Uuid;

/// Locally addressable URL of a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for transient local artifacts
pub trait BlobStore: Send + Sync {
    /// Stores bytes and returns a URL addressing them
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be stored.
    fn create(&self, content_type: &str, bytes: &[u8]) -> Result<BlobUrl>;

    /// Releases a blob
    ///
    /// Returns `Ok(false)` when the URL was not live (already released or
    /// never created here).
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource could not be freed.
    fn release(&self, url: &BlobUrl) -> Result<bool>;

    /// Number of blobs created and not yet released
    fn live_count(&self) -> usize;
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "text/plain" => "txt",
        _ => "bin",
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Blobs written as files under an artifact directory, addressed by `file://` URLs
#[derive(Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
    live: Mutex<HashMap<BlobUrl, PathBuf>>,
}

impl FileBlobStore {
    /// Opens (and creates if needed) the artifact directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or resolved.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            GodwitError::Storage(format!(
                "Failed to create artifact directory {}: {e}",
                dir.display()
            ))
        })?;
        let dir = dir.canonicalize().map_err(|e| {
            GodwitError::Storage(format!(
                "Failed to resolve artifact directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            live: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hands a blob over to the caller, who keeps the file on disk
    ///
    /// The blob no longer counts as live and will not be removed on release.
    pub fn persist(&self, url: &BlobUrl) -> Option<PathBuf> {
        lock(&self.live).remove(url)
    }
}

impl BlobStore for FileBlobStore {
    fn create(&self, content_type: &str, bytes: &[u8]) -> Result<BlobUrl> {
        let path = self
            .dir
            .join(format!("{}.{}", Uuid::new_v4(), extension_for(content_type)));
        std::fs::write(&path, bytes).map_err(|e| {
            GodwitError::Storage(format!("Failed to write artifact {}: {e}", path.display()))
        })?;

        let url = Url::from_file_path(&path).map_err(|_| {
            GodwitError::Storage(format!("Artifact path is not absolute: {}", path.display()))
        })?;
        let url = BlobUrl(url.to_string());

        tracing::debug!(url = %url, size = bytes.len(), "Created artifact blob");
        lock(&self.live).insert(url.clone(), path);
        Ok(url)
    }

    fn release(&self, url: &BlobUrl) -> Result<bool> {
        let Some(path) = lock(&self.live).remove(url) else {
            return Ok(false);
        };
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(GodwitError::Storage(format!(
                    "Failed to remove artifact {}: {e}",
                    path.display()
                )))
            }
        }
        tracing::debug!(url = %url, "Released artifact blob");
        Ok(true)
    }

    fn live_count(&self) -> usize {
        lock(&self.live).len()
    }
}

/// In-memory blobs addressed by `blob:godwit/<uuid>` URLs
///
/// Records every release so tests can assert exactly-once semantics.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<BlobUrl, (String, Vec<u8>)>>,
    released: Mutex<Vec<BlobUrl>>,
    created: Mutex<HashSet<BlobUrl>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type and bytes of a live blob
    pub fn get(&self, url: &BlobUrl) -> Option<(String, Vec<u8>)> {
        lock(&self.blobs).get(url).cloned()
    }

    /// Every URL released so far, in release order
    pub fn released(&self) -> Vec<BlobUrl> {
        lock(&self.released).clone()
    }

    /// How many times a URL has been released
    pub fn release_count(&self, url: &BlobUrl) -> usize {
        lock(&self.released).iter().filter(|u| *u == url).count()
    }

    /// Number of blobs ever created
    pub fn created_count(&self) -> usize {
        lock(&self.created).len()
    }
}

impl BlobStore for MemoryBlobStore {
    fn create(&self, content_type: &str, bytes: &[u8]) -> Result<BlobUrl> {
        let url = BlobUrl(format!("blob:godwit/{}", Uuid::new_v4()));
        lock(&self.blobs).insert(url.clone(), (content_type.to_string(), bytes.to_vec()));
        lock(&self.created).insert(url.clone());
        Ok(url)
    }

    fn release(&self, url: &BlobUrl) -> Result<bool> {
        if lock(&self.blobs).remove(url).is_none() {
            return Ok(false);
        }
        lock(&self.released).push(url.clone());
        Ok(true)
    }

    fn live_count(&self) -> usize {
        lock(&self.blobs).len()
    }
}
