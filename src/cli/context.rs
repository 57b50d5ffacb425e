//! Shared wiring for commands
//!
//! Builds the gateway, stores and providers a command needs from the loaded
//! configuration, and maps library errors onto exit codes.

use super::exit_codes;
use crate::adapters::api::{ApiGateway, HttpGateway};
use crate::adapters::storage::{BlobStore, FileBlobStore, FileStore, KeyValueStore};
use crate::config::{load_config_or_default, GodwitConfig};
use crate::core::artifact::{ArtifactManager, ArtifactUrl};
use crate::core::draft::DraftStore;
use crate::core::patient::PatientPortal;
use crate::core::session::SessionProvider;
use crate::core::workflow::ConsultationWorkflow;
use crate::domain::{ConsultationId, GodwitError, Identity, Practitioner, Result};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs to talk to the backend and local storage
pub struct CommandContext {
    pub config: GodwitConfig,
    pub gateway: Arc<dyn ApiGateway>,
    pub store: Arc<dyn KeyValueStore>,
    pub blobs: Arc<FileBlobStore>,
    pub artifacts: ArtifactManager,
    pub session: Arc<SessionProvider>,
}

impl CommandContext {
    /// Wires the context from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a bad API base, or a storage error
    /// when the data or artifact directory cannot be opened.
    pub fn new(config: GodwitConfig) -> Result<Self> {
        let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config.api)?);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.data_dir)?);
        let blobs = Arc::new(FileBlobStore::open(&config.storage.artifact_dir)?);
        let blob_store: Arc<dyn BlobStore> = blobs.clone();
        let artifacts = ArtifactManager::new(gateway.clone(), blob_store);
        let session = Arc::new(SessionProvider::new(gateway.clone(), store.clone()));

        Ok(Self {
            config,
            gateway,
            store,
            blobs,
            artifacts,
            session,
        })
    }

    /// Loads configuration (defaults when the file is absent) and wires a context
    ///
    /// Prints the failure and returns the exit code when either step fails.
    pub fn load(config_path: &str) -> std::result::Result<Self, i32> {
        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Err(exit_codes::CONFIGURATION);
            }
        };
        Self::new(config).map_err(|e| report_error(&e))
    }

    pub fn drafts(&self) -> Arc<DraftStore> {
        Arc::new(DraftStore::load(self.store.clone()))
    }

    pub fn portal(&self) -> PatientPortal {
        PatientPortal::new(self.gateway.clone(), self.artifacts.clone())
    }

    pub fn workflow(&self, id: ConsultationId) -> ConsultationWorkflow {
        ConsultationWorkflow::new(
            id,
            self.gateway.clone(),
            self.artifacts.clone(),
            Practitioner::from(&self.config.practitioner),
        )
    }

    /// Signs in with the configured credentials unless a session exists
    ///
    /// # Errors
    ///
    /// Returns the error from [`SessionProvider::ensure_signed_in`].
    pub async fn sign_in(&self) -> Result<Identity> {
        self.session
            .ensure_signed_in(&self.config.credentials)
            .await
    }

    /// Keeps an artifact on disk after the command ends
    ///
    /// Local blobs are handed over from the blob store and moved to `output`
    /// when given. Remote URLs are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be moved to `output`.
    pub fn keep_artifact(&self, url: &ArtifactUrl, output: Option<&Path>) -> Result<String> {
        let blob = match url {
            ArtifactUrl::Remote(remote) => return Ok(remote.clone()),
            ArtifactUrl::Blob(blob) => blob,
        };
        let Some(path) = self.blobs.persist(blob) else {
            return Ok(blob.to_string());
        };
        match output {
            Some(output) => {
                move_file(&path, output)?;
                Ok(output.display().to_string())
            }
            None => Ok(path.display().to_string()),
        }
    }
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}

/// Exit code for a library error
pub fn exit_code_for(error: &GodwitError) -> i32 {
    match error {
        GodwitError::Configuration(_) => exit_codes::CONFIGURATION,
        GodwitError::Validation(_) => exit_codes::VALIDATION,
        GodwitError::PartialSuccess(_) => exit_codes::PARTIAL_SUCCESS,
        GodwitError::Http(_)
        | GodwitError::Connection(_)
        | GodwitError::Authentication(_)
        | GodwitError::InvalidResponse(_)
        | GodwitError::Upload(_) => exit_codes::CONNECTION,
        _ => exit_codes::FATAL,
    }
}

/// Prints a library error for the user and returns its exit code
pub fn report_error(error: &GodwitError) -> i32 {
    match error {
        GodwitError::Validation(errors) => {
            println!("❌ Please fix the following:");
            for field in errors.iter() {
                println!("   - {field}");
            }
        }
        GodwitError::PartialSuccess(partial) => {
            println!("⚠️  {partial}");
            println!("   Reference: #{}", partial.primary_id());
        }
        GodwitError::Cancelled => println!("⚠️  Cancelled"),
        other => println!("❌ {other}"),
    }
    tracing::debug!(error = %error, "Command failed");
    exit_code_for(error)
}
