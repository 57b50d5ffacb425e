//! Documents command implementation
//!
//! Lists the supporting documents of the latest registration and can
//! download one of them into the artifact directory.

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::core::artifact::{preview_mode, ArtifactUrl, PreviewMode};
use crate::domain::GodwitError;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the documents command
#[derive(Args, Debug)]
pub struct DocumentsArgs {
    /// Registration email; defaults to the signed-in user's
    #[arg(long)]
    pub email: Option<String>,

    /// Download the document with this id
    #[arg(long, value_name = "DOCUMENT_ID")]
    pub download: Option<u64>,

    /// Where to save the downloaded document
    #[arg(short, long, requires = "download")]
    pub output: Option<PathBuf>,
}

impl DocumentsArgs {
    /// Execute the documents command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        let identity = match ctx.sign_in().await {
            Ok(identity) => identity,
            Err(e) => return Ok(report_error(&e)),
        };

        let Some(email) = self.email.clone().or(identity.email) else {
            println!("❌ No email for the signed-in user; pass --email");
            return Ok(exit_codes::VALIDATION);
        };

        let portal = ctx.portal();
        let registration = match portal.latest_registration(&email).await {
            Ok(Some(registration)) => registration,
            Ok(None) => {
                println!("No registration found for {email}");
                return Ok(exit_codes::OK);
            }
            Err(e) => return Ok(report_error(&e)),
        };
        let Some(registration_id) = registration.id else {
            println!("No saved registration for {email}");
            return Ok(exit_codes::OK);
        };

        let documents = match ctx.artifacts.list_documents(registration_id).await {
            Ok(documents) => documents,
            Err(e) => return Ok(report_error(&e)),
        };
        if documents.is_empty() {
            println!("No documents for registration #{registration_id}");
            return Ok(exit_codes::OK);
        }

        println!("📎 Documents for registration #{registration_id}");
        for doc in &documents {
            let size = doc
                .size_bytes
                .map(|s| format!("{s} bytes"))
                .unwrap_or_else(|| "size unknown".to_string());
            println!("  #{} {} ({size})", doc.id, doc.file_name);
            if preview_mode(&doc.file_name) == PreviewMode::Inline {
                println!(
                    "     view:     {}",
                    ctx.artifacts.resolve_view_url(registration_id, doc.id)
                );
            }
            println!(
                "     download: {}",
                ctx.artifacts.resolve_download_url(registration_id, doc.id)
            );
        }

        let Some(wanted) = self.download else {
            return Ok(exit_codes::OK);
        };
        let Some(doc) = documents.iter().find(|d| d.id.get() == wanted) else {
            println!("❌ Document #{wanted} is not attached to registration #{registration_id}");
            return Ok(exit_codes::VALIDATION);
        };

        let url = ctx.artifacts.resolve_download_url(registration_id, doc.id);
        let saved = ctx
            .artifacts
            .fetch_artifact_blob(&url)
            .await
            .and_then(|blob| ctx.keep_artifact(&ArtifactUrl::Blob(blob), self.output.as_deref()));
        match saved {
            Ok(path) => {
                println!("✅ Saved {} to {path}", doc.file_name);
                Ok(exit_codes::OK)
            }
            Err(e @ GodwitError::Io(_)) => {
                println!("❌ Downloaded but could not save: {e}");
                Ok(exit_codes::FATAL)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }
}
