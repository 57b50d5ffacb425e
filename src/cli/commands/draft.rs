//! Draft command implementation
//!
//! Shows, edits, validates and clears the registration draft persisted in
//! the data directory. Every edit is written through before it is reported.

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::core::draft::{validate_all, validate_step, DraftStore, WizardStep};
use crate::domain::{RegistrationDraft, RegistrationField};
use clap::{Args, Subcommand};

/// Arguments for the draft command
#[derive(Args, Debug)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftAction,
}

#[derive(Subcommand, Debug)]
pub enum DraftAction {
    /// Print every field of the draft
    Show,

    /// Set one field, by label ("First Name") or API name ("firstName")
    Set { field: String, value: String },

    /// Discard the draft
    Clear,

    /// Validate one wizard step (1-3), or everything
    Check {
        #[arg(long)]
        step: Option<u8>,
    },
}

impl DraftArgs {
    /// Execute the draft command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        let drafts = ctx.drafts();

        match &self.action {
            DraftAction::Show => {
                print_draft(&drafts.get_draft());
                Ok(exit_codes::OK)
            }
            DraftAction::Set { field, value } => Ok(set_field(&drafts, field, value)),
            DraftAction::Clear => match drafts.complete_submission() {
                Ok(()) => {
                    println!("🗑️  Draft cleared");
                    Ok(exit_codes::OK)
                }
                Err(e) => Ok(report_error(&e)),
            },
            DraftAction::Check { step } => Ok(check(&drafts.get_draft(), *step)),
        }
    }
}

fn set_field(drafts: &DraftStore, field: &str, value: &str) -> i32 {
    let Some(field) = RegistrationField::lookup(field) else {
        println!("❌ Unknown field: {field}");
        println!("   Known fields:");
        for known in RegistrationField::ALL {
            println!("   - {known}");
        }
        return exit_codes::VALIDATION;
    };

    let parsed = match field.parse(value) {
        Ok(parsed) => parsed,
        Err(message) => {
            println!("❌ {message}");
            return exit_codes::VALIDATION;
        }
    };

    match drafts.set_field(field, parsed) {
        Ok(draft) => {
            println!("✅ {field}: {}", draft.get(field));
            exit_codes::OK
        }
        Err(e) => report_error(&e),
    }
}

fn check(draft: &RegistrationDraft, step: Option<u8>) -> i32 {
    let result = match step {
        Some(n) => match WizardStep::from_number(n) {
            Some(step) => {
                println!("🔍 Checking step {n}: {}", step.title());
                validate_step(draft, step)
            }
            None => {
                println!("❌ Unknown step {n}; steps are 1 to {}", WizardStep::ALL.len());
                return exit_codes::VALIDATION;
            }
        },
        None => {
            println!("🔍 Checking the whole registration");
            validate_all(draft)
        }
    };

    match result {
        Ok(()) => {
            println!("✅ Ready");
            exit_codes::OK
        }
        Err(errors) => {
            for error in errors.iter() {
                println!("   - {error}");
            }
            exit_codes::VALIDATION
        }
    }
}

fn print_draft(draft: &RegistrationDraft) {
    println!("📋 Registration draft");
    if let Some(id) = draft.id {
        println!("   Saved as registration #{id} (document upload pending)");
    }
    println!();
    for step in WizardStep::ALL {
        println!("Step {}: {}", step.number(), step.title());
        for field in step.fields() {
            println!("  {:<28} {}", field.label(), draft.get(*field));
        }
        println!();
    }
}
