//! Document upload and artifact retrieval

use super::payload::{ArtifactPayload, ArtifactUrl};
use super::slot::ArtifactSlot;
use crate::adapters::api::{endpoints, ApiGateway};
use crate::adapters::storage::{BlobStore, BlobUrl};
use crate::domain::{
    DocumentId, DocumentMeta, DocumentUpload, GodwitError, RegistrationId, Result, UploadError,
};
use std::sync::Arc;

/// Uploads supporting documents and turns artifact responses into URLs
///
/// # Example
///
/// ```rust,no_run
/// use godwit::adapters::api::HttpGateway;
/// use godwit::adapters::storage::MemoryBlobStore;
/// use godwit::config::ApiConfig;
/// use godwit::core::artifact::ArtifactManager;
/// use godwit::domain::{DocumentId, RegistrationId};
/// use std::sync::Arc;
///
/// # fn example() -> godwit::domain::Result<()> {
/// let gateway = Arc::new(HttpGateway::new(&ApiConfig::default())?);
/// let artifacts = ArtifactManager::new(gateway, Arc::new(MemoryBlobStore::new()));
///
/// let reg = RegistrationId::new(7).map_err(godwit::domain::GodwitError::Other)?;
/// let doc = DocumentId::new(3).map_err(godwit::domain::GodwitError::Other)?;
/// println!("{}", artifacts.resolve_view_url(reg, doc));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ArtifactManager {
    gateway: Arc<dyn ApiGateway>,
    blobs: Arc<dyn BlobStore>,
}

impl ArtifactManager {
    pub fn new(gateway: Arc<dyn ApiGateway>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { gateway, blobs }
    }

    /// Empty slot backed by this manager's blob store
    pub fn new_slot(&self) -> ArtifactSlot {
        ArtifactSlot::new(self.blobs.clone())
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Uploads the supporting document for a saved registration
    ///
    /// File type and size policy belongs to the backend; nothing is checked
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`GodwitError::Upload`] when the server rejects the file, or a
    /// connection error when it cannot be reached.
    pub async fn upload_document(
        &self,
        registration: RegistrationId,
        file: &DocumentUpload,
    ) -> Result<DocumentMeta> {
        let path = endpoints::registration_document_upload(registration);
        let body = self.gateway.post_form(&path, file).await.map_err(|e| match e {
            GodwitError::Http(http) => {
                let message = http.raw_body.trim();
                let message = if message.is_empty() {
                    "the server rejected the file".to_string()
                } else {
                    message.chars().take(200).collect()
                };
                GodwitError::Upload(UploadError::new(Some(http.status), message))
            }
            other => other,
        })?;

        let meta: DocumentMeta = body.decode_required()?;
        tracing::info!(
            registration_id = %registration,
            document_id = %meta.id,
            file_name = %meta.file_name,
            "Document uploaded"
        );
        Ok(meta)
    }

    /// Documents attached to a registration; `204` is an empty list
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the listing call.
    pub async fn list_documents(&self, registration: RegistrationId) -> Result<Vec<DocumentMeta>> {
        let body = self
            .gateway
            .get_json(&endpoints::registration_documents(registration))
            .await?;
        Ok(body.decode::<Vec<DocumentMeta>>()?.unwrap_or_default())
    }

    pub fn resolve_view_url(&self, registration: RegistrationId, document: DocumentId) -> String {
        self.gateway
            .urls()
            .normalize(&endpoints::registration_document_view(registration, document))
    }

    pub fn resolve_download_url(&self, registration: RegistrationId, document: DocumentId) -> String {
        self.gateway
            .urls()
            .normalize(&endpoints::registration_document_download(registration, document))
    }

    /// Normalizes a server-provided artifact location
    ///
    /// # Errors
    ///
    /// Returns an error for a blank location.
    pub fn resolve_remote_url(&self, url: &str) -> Result<ArtifactUrl> {
        if url.trim().is_empty() {
            return Err(GodwitError::InvalidResponse(
                "Invalid pdfUrl returned.".to_string(),
            ));
        }
        Ok(ArtifactUrl::Remote(self.gateway.urls().normalize(url.trim())))
    }

    /// Fetches an artifact and makes it locally addressable
    ///
    /// The caller owns the returned blob and must release it, normally by
    /// handing it to an [`ArtifactSlot`].
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the fetch, an invalid
    /// response error when JSON comes back instead of a document, or a
    /// storage error when the blob cannot be created.
    pub async fn fetch_artifact_blob(&self, url: &str) -> Result<BlobUrl> {
        let raw = self.gateway.get_binary(url).await?;
        if raw.is_json() {
            return Err(GodwitError::InvalidResponse(format!(
                "Expected a document from {url}, got JSON"
            )));
        }
        let content_type = raw
            .content_type
            .clone()
            .unwrap_or_else(|| "application/pdf".to_string());
        let blob = self.blobs.create(&content_type, &raw.bytes)?;
        tracing::debug!(source = url, blob = %blob, size = raw.bytes.len(), "Fetched artifact");
        Ok(blob)
    }

    /// Resolves a classified response into a displayable URL
    ///
    /// `pdf_path_for_id` maps the identifier-only shape to the endpoint that
    /// serves its PDF.
    ///
    /// # Errors
    ///
    /// Returns an error when the follow-up fetch fails or the blob cannot be
    /// created.
    pub async fn resolve_payload<F>(
        &self,
        payload: ArtifactPayload,
        pdf_path_for_id: F,
    ) -> Result<ArtifactUrl>
    where
        F: FnOnce(u64) -> Result<String> + Send,
    {
        match payload {
            ArtifactPayload::Binary {
                content_type,
                bytes,
            } => Ok(ArtifactUrl::Blob(self.blobs.create(&content_type, &bytes)?)),
            ArtifactPayload::Url(url) => self.resolve_remote_url(&url),
            ArtifactPayload::Id(id) => {
                let path = pdf_path_for_id(id)?;
                Ok(ArtifactUrl::Blob(self.fetch_artifact_blob(&path).await?))
            }
        }
    }
}

impl std::fmt::Debug for ArtifactManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactManager")
            .field("base", &self.gateway.urls().base())
            .field("live_blobs", &self.blobs.live_count())
            .finish()
    }
}
