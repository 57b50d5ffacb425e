//! Doctor command implementation
//!
//! Clinician commands: list and review consultations, issue a prescription
//! or a referral and save the resulting PDF. When an entity is created but
//! its PDF cannot be fetched, `doctor pdf` fetches only the PDF.

use crate::adapters::api::endpoints;
use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::core::artifact::ArtifactUrl;
use crate::core::cancel::CancellationToken;
use crate::core::workflow::{list_consultations, ConsultationWorkflow, LatestPrescription};
use crate::domain::{
    Access, Consultation, ConsultationId, ConsultationStatus, GodwitError, PrescriptionDraft,
    PrescriptionId, ReferralId, Role,
};
use clap::{ArgGroup, Args, Subcommand};
use std::path::{Path, PathBuf};

/// Arguments for the doctor command
#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(subcommand)]
    pub action: DoctorAction,
}

#[derive(Subcommand, Debug)]
pub enum DoctorAction {
    /// List consultations
    List {
        /// Only consultations with this status (e.g. PENDING, IN_PROGRESS)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one consultation
    Show {
        consultation: u64,

        /// Also print the referral letter preview
        #[arg(long)]
        preview_referral: bool,
    },

    /// Issue a prescription and save its PDF
    Prescribe(PrescribeArgs),

    /// Issue a referral letter and save its PDF
    Refer(ReferArgs),

    /// Fetch the PDF of an already created prescription or referral
    Pdf(PdfArgs),
}

#[derive(Args, Debug)]
pub struct PrescribeArgs {
    pub consultation: u64,

    #[arg(long, default_value = "")]
    pub history: String,

    #[arg(long, default_value = "")]
    pub diagnosis: String,

    /// Medicine line (repeatable)
    #[arg(long)]
    pub medicine: Vec<String>,

    #[arg(long, default_value = "")]
    pub recommendations: String,

    /// Where to save the PDF
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReferArgs {
    pub consultation: u64,

    /// Letter body; defaults to the letter generated from the consultation
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the letter body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Print the letter preview without creating the referral
    #[arg(long)]
    pub preview: bool,

    /// Where to save the PDF
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["prescription", "referral"])))]
pub struct PdfArgs {
    #[arg(long)]
    pub prescription: Option<u64>,

    #[arg(long)]
    pub referral: Option<u64>,

    /// Where to save the PDF
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DoctorArgs {
    /// Execute the doctor command
    pub async fn execute(&self, config_path: &str, token: &CancellationToken) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        if let Err(e) = ctx.sign_in().await {
            return Ok(report_error(&e));
        }
        match ctx.session.authorize(Some(&Role::Doctor)) {
            Access::Granted(identity) => {
                tracing::debug!(email = ?identity.email, "Doctor access granted");
            }
            Access::SignInRequired => {
                println!("❌ Sign-in required");
                return Ok(exit_codes::CONNECTION);
            }
            Access::Forbidden(identity) => {
                println!("❌ {} is not a doctor", identity.display_name());
                return Ok(exit_codes::CONNECTION);
            }
        }

        match &self.action {
            DoctorAction::List { status } => list(&ctx, status.as_deref()).await,
            DoctorAction::Show {
                consultation,
                preview_referral,
            } => show(&ctx, *consultation, *preview_referral, token).await,
            DoctorAction::Prescribe(args) => args.execute(&ctx, token).await,
            DoctorAction::Refer(args) => args.execute(&ctx, token).await,
            DoctorAction::Pdf(args) => args.execute(&ctx).await,
        }
    }
}

fn parse_id<T>(raw: u64, parse: fn(u64) -> Result<T, String>) -> Result<T, i32> {
    parse(raw).map_err(|message| {
        println!("❌ {message}");
        exit_codes::VALIDATION
    })
}

/// Creates a workflow for `raw` and loads its consultation
async fn load_workflow(
    ctx: &CommandContext,
    raw: u64,
    token: &CancellationToken,
) -> Result<ConsultationWorkflow, i32> {
    let id = parse_id(raw, ConsultationId::new)?;
    let mut workflow = ctx.workflow(id);
    workflow.load(token).await.map_err(|e| report_error(&e))?;
    Ok(workflow)
}

async fn list(ctx: &CommandContext, status: Option<&str>) -> anyhow::Result<i32> {
    let status = status.map(|s| ConsultationStatus::from(s.to_string()));
    let rows = match list_consultations(ctx.gateway.as_ref(), status.as_ref()).await {
        Ok(rows) => rows,
        Err(e) => return Ok(report_error(&e)),
    };

    if rows.is_empty() {
        println!("No consultations.");
        return Ok(exit_codes::OK);
    }

    println!(
        "{:<8} {:<25} {:<30} {:<12} {:<17}",
        "ID", "Patient", "Email", "Status", "Created"
    );
    println!("{}", "-".repeat(95));
    for row in rows {
        println!(
            "{:<8} {:<25} {:<30} {:<12} {:<17}",
            row.id,
            row.patient_name.as_deref().unwrap_or("-"),
            row.patient_email.as_deref().unwrap_or("-"),
            row.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            row.created_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }
    Ok(exit_codes::OK)
}

async fn show(
    ctx: &CommandContext,
    raw: u64,
    preview_referral: bool,
    token: &CancellationToken,
) -> anyhow::Result<i32> {
    let workflow = match load_workflow(ctx, raw, token).await {
        Ok(workflow) => workflow,
        Err(code) => return Ok(code),
    };
    let Some(consultation) = workflow.consultation() else {
        return Ok(exit_codes::FATAL);
    };
    print_consultation(consultation);

    match workflow.latest_prescription() {
        Some(LatestPrescription::Present(meta)) => {
            let when = meta
                .created_at
                .map(|d| d.format(" on %Y-%m-%d").to_string())
                .unwrap_or_default();
            println!("Latest prescription: #{}{when}", meta.id);
        }
        Some(LatestPrescription::Unavailable(reason)) => {
            println!("Latest prescription: unavailable ({reason})");
        }
        Some(LatestPrescription::None) | None => println!("Latest prescription: none yet"),
    }

    if preview_referral {
        if let Some(preview) = workflow.referral_preview() {
            println!();
            print!("{preview}");
        }
    }
    Ok(exit_codes::OK)
}

fn print_consultation(consultation: &Consultation) {
    println!("🩺 Consultation #{}", consultation.id);
    println!(
        "   Patient: {}",
        consultation.patient_name().unwrap_or_else(|| "-".into())
    );
    if let Some(id) = &consultation.patient_id {
        println!("   Patient ID: {id}");
    }
    if let Some(status) = &consultation.status {
        println!("   Status: {status}");
    }
    if let Some(location) = &consultation.current_location {
        println!("   Location: {location}");
    }
    if let Some(phone) = &consultation.contact_phone {
        println!("   Contact: {phone}");
        if let Some(link) = consultation.whatsapp_link() {
            println!("   WhatsApp: {link}");
        }
    }
    println!();
    println!("Answers:");
    for (question, answer) in &consultation.answers {
        println!("  {question}: {answer}");
        if let Some(note) = consultation.note_for(question) {
            println!("     {note}");
        }
    }
    println!();
}

fn print_saved(ctx: &CommandContext, what: &str, url: &ArtifactUrl, output: Option<&Path>) -> i32 {
    match ctx.keep_artifact(url, output) {
        Ok(location) => {
            println!("✅ {what} saved: {location}");
            exit_codes::OK
        }
        Err(e) => {
            println!("❌ {what} PDF retrieved but could not be saved: {e}");
            exit_codes::FATAL
        }
    }
}

impl PrescribeArgs {
    async fn execute(&self, ctx: &CommandContext, token: &CancellationToken) -> anyhow::Result<i32> {
        let mut workflow = match load_workflow(ctx, self.consultation, token).await {
            Ok(workflow) => workflow,
            Err(code) => return Ok(code),
        };

        let mut draft = PrescriptionDraft::new().with_medicines(self.medicine.iter().cloned());
        draft.history = self.history.clone();
        draft.diagnosis = self.diagnosis.clone();
        draft.recommendations = self.recommendations.clone();
        *workflow.prescription_draft_mut() = draft;

        match workflow.submit_prescription(token).await {
            Ok(url) => {
                let url = workflow.take_prescription_artifact().unwrap_or(url);
                let what = match workflow.created_prescription() {
                    Some(id) => format!("Prescription #{id}"),
                    None => "Prescription".to_string(),
                };
                Ok(print_saved(ctx, &what, &url, self.output.as_deref()))
            }
            Err(GodwitError::PartialSuccess(partial)) => {
                let message = workflow
                    .prescription_state()
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| partial.to_string());
                println!("⚠️  {message}");
                println!(
                    "   Retry with: godwit doctor pdf --prescription {}",
                    partial.primary_id()
                );
                Ok(exit_codes::PARTIAL_SUCCESS)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }
}

impl ReferArgs {
    async fn execute(&self, ctx: &CommandContext, token: &CancellationToken) -> anyhow::Result<i32> {
        let mut workflow = match load_workflow(ctx, self.consultation, token).await {
            Ok(workflow) => workflow,
            Err(code) => return Ok(code),
        };

        let body = match (&self.body, &self.body_file) {
            (Some(body), _) => Some(body.clone()),
            (None, Some(path)) => match tokio::fs::read_to_string(path).await {
                Ok(body) => Some(body),
                Err(e) => {
                    println!("❌ Cannot read {}: {e}", path.display());
                    return Ok(exit_codes::VALIDATION);
                }
            },
            (None, None) => None,
        };
        if let Some(body) = body {
            workflow.referral_draft_mut().body = body;
        }

        if self.preview {
            if let Some(preview) = workflow.referral_preview() {
                print!("{preview}");
            }
            return Ok(exit_codes::OK);
        }

        match workflow.submit_referral(token).await {
            Ok(url) => {
                let url = workflow.take_referral_artifact().unwrap_or(url);
                let what = match workflow.created_referral() {
                    Some(id) => format!("Referral #{id}"),
                    None => "Referral".to_string(),
                };
                Ok(print_saved(ctx, &what, &url, self.output.as_deref()))
            }
            Err(GodwitError::PartialSuccess(partial)) => {
                let message = workflow
                    .referral_state()
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| partial.to_string());
                println!("⚠️  {message}");
                println!(
                    "   Retry with: godwit doctor pdf --referral {}",
                    partial.primary_id()
                );
                Ok(exit_codes::PARTIAL_SUCCESS)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }
}

impl PdfArgs {
    fn path(&self) -> Result<(String, String), i32> {
        match (self.prescription, self.referral) {
            (Some(raw), _) => {
                let id = parse_id(raw, PrescriptionId::new)?;
                Ok((endpoints::doctor_prescription_pdf(id), format!("Prescription #{id}")))
            }
            (None, Some(raw)) => {
                let id = parse_id(raw, ReferralId::new)?;
                Ok((endpoints::doctor_referral_pdf(id), format!("Referral #{id}")))
            }
            (None, None) => Err(exit_codes::VALIDATION),
        }
    }

    async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let (path, what) = match self.path() {
            Ok(target) => target,
            Err(code) => return Ok(code),
        };
        match ctx.artifacts.fetch_artifact_blob(&path).await {
            Ok(blob) => Ok(print_saved(
                ctx,
                &what,
                &ArtifactUrl::Blob(blob),
                self.output.as_deref(),
            )),
            Err(e) => Ok(report_error(&e)),
        }
    }
}
