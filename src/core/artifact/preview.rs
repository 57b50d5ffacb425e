//! Inline preview eligibility

use crate::domain::document::extension;

/// Extensions that can be previewed inline
pub const PREVIEWABLE_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "gif", "webp"];

/// How a document is offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    Inline,
    DownloadOnly,
}

/// True when the file name ends in an allow-listed extension (case-insensitive)
pub fn is_previewable(file_name: &str) -> bool {
    extension(file_name)
        .map(|ext| PREVIEWABLE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn preview_mode(file_name: &str) -> PreviewMode {
    if is_previewable(file_name) {
        PreviewMode::Inline
    } else {
        PreviewMode::DownloadOnly
    }
}
