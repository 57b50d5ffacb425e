//! Local durable storage
//!
//! - [`kv`] - string values under fixed keys (draft, session hint)
//! - [`blob`] - transient local artifacts with explicit release

pub mod blob;
pub mod kv;

pub use blob::{BlobStore, BlobUrl, FileBlobStore, MemoryBlobStore};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
