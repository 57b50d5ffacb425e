//! Register command implementation
//!
//! Submits the saved draft: creates the registration, uploads the optional
//! supporting document, then sets up the account. A registration saved
//! without its document exits with the partial-success code; re-running
//! with `--retry-upload` uploads only the document.

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::core::cancel::CancellationToken;
use crate::core::draft::{RegistrationWizard, SubmissionOutcome};
use crate::domain::{DocumentUpload, GodwitError};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the register command
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Supporting travel document (e-ticket or boarding pass)
    #[arg(short, long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Upload the document for an already saved registration
    #[arg(long, requires = "document")]
    pub retry_upload: bool,
}

impl RegisterArgs {
    /// Execute the register command
    pub async fn execute(&self, config_path: &str, token: &CancellationToken) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        let document = match &self.document {
            Some(path) => match DocumentUpload::from_path(path).await {
                Ok(doc) => Some(doc),
                Err(e) => {
                    println!("❌ Cannot read document {}", path.display());
                    println!("   Error: {e}");
                    return Ok(exit_codes::VALIDATION);
                }
            },
            None => None,
        };

        let mut wizard = RegistrationWizard::new(
            ctx.drafts(),
            ctx.gateway.clone(),
            ctx.artifacts.clone(),
            ctx.session.clone(),
        );

        let result = match (self.retry_upload, document) {
            (true, Some(doc)) => {
                println!("📤 Uploading {} for the saved registration", doc.file_name);
                wizard.retry_document_upload(doc, token).await
            }
            (_, document) => {
                println!("📨 Submitting registration");
                wizard.submit(document, token).await
            }
        };

        match result {
            Ok(outcome) => {
                print_outcome(&outcome);
                Ok(exit_codes::OK)
            }
            Err(GodwitError::PartialSuccess(partial)) => {
                println!("⚠️  Registration #{} saved", partial.primary_id());
                println!("   The document could not be uploaded: {}", partial.cause);
                if let Some(path) = &self.document {
                    println!(
                        "   Retry with: godwit register --retry-upload --document {}",
                        path.display()
                    );
                }
                Ok(exit_codes::PARTIAL_SUCCESS)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }
}

fn print_outcome(outcome: &SubmissionOutcome) {
    println!("✅ Registration #{} saved", outcome.registration_id);
    if let Some(doc) = &outcome.document {
        println!("   Document uploaded: {} (#{})", doc.file_name, doc.id);
    }
    match &outcome.signed_in {
        Some(identity) => println!("   Signed in as {}", identity.display_name()),
        None => println!("   Sign in to view your care history"),
    }
}
