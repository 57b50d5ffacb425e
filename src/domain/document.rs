//! Supporting travel documents attached to a registration

use super::ids::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata returned after an upload and by the document listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: DocumentId,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Builds an upload, guessing the content type from the extension
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Lower-cased text after the last `.` of a file name
///
/// A bare dotfile such as `.png` counts as having that extension. The name is
/// matched as given, so trailing whitespace is part of the extension.
pub fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type hint used for multipart uploads
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("scan.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("README"), None);
        assert_eq!(extension(".bashrc").as_deref(), Some("bashrc"));
        assert_eq!(extension("scan.pdf ").as_deref(), Some("pdf "));
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_upload_guesses_content_type() {
        let upload = DocumentUpload::new("ticket.JPG", vec![1, 2, 3]);
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(
            DocumentUpload::new("notes.xyz", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_meta_parses() {
        let meta: DocumentMeta =
            serde_json::from_str(r#"{"id":3,"fileName":"boarding.pdf","sizeBytes":1024}"#)
                .unwrap();
        assert_eq!(meta.id.get(), 3);
        assert_eq!(meta.size_bytes, Some(1024));
        assert!(meta.created_at.is_none());
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eticket.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let upload = DocumentUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "eticket.pdf");
        assert_eq!(upload.content_type, "application/pdf");
        assert_eq!(upload.bytes, b"%PDF-1.4");
    }
}
