//! Single-owner holder for an artifact URL
//!
//! A slot holds at most one live blob. Assigning a new URL releases the one it
//! replaces; dropping the slot releases whatever it still holds.

use super::payload::ArtifactUrl;
use crate::adapters::storage::{BlobStore, BlobUrl};
use std::fmt;
use std::sync::Arc;

pub struct ArtifactSlot {
    blobs: Arc<dyn BlobStore>,
    current: Option<ArtifactUrl>,
}

impl ArtifactSlot {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&ArtifactUrl> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Holds `url`, releasing the previously held blob
    ///
    /// Re-assigning the URL already held is a no-op.
    pub fn assign(&mut self, url: ArtifactUrl) {
        if self.current.as_ref() == Some(&url) {
            return;
        }
        let previous = self.current.replace(url);
        if let Some(ArtifactUrl::Blob(blob)) = previous {
            self.release(&blob);
        }
    }

    /// Releases and forgets the held URL
    pub fn clear(&mut self) {
        if let Some(ArtifactUrl::Blob(blob)) = self.current.take() {
            self.release(&blob);
        }
    }

    /// Takes the URL out of the slot; the caller becomes its owner
    pub fn take(&mut self) -> Option<ArtifactUrl> {
        self.current.take()
    }

    fn release(&self, blob: &BlobUrl) {
        match self.blobs.release(blob) {
            Ok(true) => tracing::trace!(url = %blob, "Released superseded artifact"),
            Ok(false) => tracing::warn!(url = %blob, "Artifact was not live when released"),
            Err(e) => tracing::warn!(url = %blob, error = %e, "Failed to release artifact"),
        }
    }
}

impl Drop for ArtifactSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSlot")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
