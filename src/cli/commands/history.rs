//! History command implementation
//!
//! Shows the signed-in patient's care history and links to the latest
//! prescription and referral. "Nothing yet" is reported, not treated as
//! a failure.

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::core::artifact::ArtifactUrl;
use crate::domain::{CareHistory, Result};
use clap::Args;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show the latest prescription and referral links
    #[arg(long)]
    pub latest_only: bool,
}

impl HistoryArgs {
    /// Execute the history command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(e) = ctx.sign_in().await {
            return Ok(report_error(&e));
        }
        let portal = ctx.portal();

        if !self.latest_only {
            match portal.care_history().await {
                Ok(history) => print_history(history.as_ref()),
                Err(e) => return Ok(report_error(&e)),
            }
        }

        print_latest("Latest prescription", portal.latest_prescription_url().await);
        print_latest("Latest referral", portal.latest_referral_url().await);
        Ok(exit_codes::OK)
    }
}

fn print_history(history: Option<&CareHistory>) {
    let Some(history) = history.filter(|h| !h.items.is_empty()) else {
        println!("No consultations with prescriptions yet.");
        println!();
        return;
    };

    let patient = &history.patient;
    println!("🩺 Care history for {}", patient.name);
    if let Some(id) = &patient.patient_id {
        println!("   Patient ID: {id}");
    }
    if let Some(dob) = patient.dob {
        println!("   Date of birth: {}", dob.format("%d/%m/%Y"));
    }
    println!();

    for item in &history.items {
        let date = item
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("#{} {date} {}", item.consultation_id, item.location_travelling_to);
        if !item.presenting_complaint.is_empty() {
            println!("   Complaint: {}", item.presenting_complaint);
        }
        if !item.diagnosis.is_empty() {
            println!("   Diagnosis: {}", item.diagnosis);
        }
        for line in item.medicine_lines() {
            println!("   💊 {line}");
        }
        if !item.recommendations.is_empty() {
            println!("   Advice: {}", item.recommendations);
        }
        println!();
    }
}

fn print_latest(label: &str, result: Result<Option<ArtifactUrl>>) {
    match result {
        Ok(Some(url)) => println!("{label}: {url}"),
        Ok(None) => println!("{label}: none yet"),
        Err(e) => println!("{label}: unavailable ({e})"),
    }
}
