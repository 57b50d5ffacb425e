//! Document and artifact lifecycle
//!
//! - [`manager`] - document upload/listing, URL resolution, artifact fetches
//! - [`payload`] - classification of PDF-producing responses
//! - [`slot`] - single-owner holder that releases superseded blobs
//! - [`preview`] - inline preview eligibility

pub mod manager;
pub mod payload;
pub mod preview;
pub mod slot;

pub use manager::ArtifactManager;
pub use payload::{ArtifactPayload, ArtifactUrl};
pub use preview::{is_previewable, preview_mode, PreviewMode, PREVIEWABLE_EXTENSIONS};
pub use slot::ArtifactSlot;
