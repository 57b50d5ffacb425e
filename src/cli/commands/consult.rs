//! Consult command implementation
//!
//! Logs a consultation for the signed-in patient. Answers are given as
//! `question=yes|no`, notes as `question=text`.

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::domain::{Answer, NewConsultation};
use clap::Args;

/// Arguments for the consult command
#[derive(Args, Debug)]
pub struct ConsultArgs {
    /// Where the patient is now
    #[arg(long)]
    pub location: String,

    #[arg(long, default_value = "")]
    pub contact_name: String,

    #[arg(long, default_value = "")]
    pub contact_phone: String,

    #[arg(long, default_value = "")]
    pub contact_address: String,

    /// Intake answer, QUESTION=yes|no (repeatable)
    #[arg(long = "answer", value_name = "QUESTION=yes|no")]
    pub answers: Vec<String>,

    /// Detail note for a question, QUESTION=TEXT (repeatable)
    #[arg(long = "note", value_name = "QUESTION=TEXT")]
    pub notes: Vec<String>,
}

impl ConsultArgs {
    /// Execute the consult command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(message) => {
                println!("❌ {message}");
                return Ok(exit_codes::VALIDATION);
            }
        };

        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };
        if let Err(e) = ctx.sign_in().await {
            return Ok(report_error(&e));
        }

        match ctx.portal().log_consultation(request).await {
            Ok(receipt) => {
                println!("✅ Consultation #{} logged", receipt.id);
                if let Some(status) = receipt.status {
                    println!("   Status: {status}");
                }
                Ok(exit_codes::OK)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }

    fn build_request(&self) -> Result<NewConsultation, String> {
        let mut request = NewConsultation {
            current_location: self.location.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            contact_phone: self.contact_phone.trim().to_string(),
            contact_address: self.contact_address.trim().to_string(),
            ..Default::default()
        };

        for raw in &self.answers {
            let (question, value) = split_pair(raw)?;
            let answer = match value.to_ascii_lowercase().as_str() {
                "yes" | "y" => Answer::Yes,
                "no" | "n" => Answer::No,
                other => return Err(format!("{question}: expected yes or no, got '{other}'")),
            };
            request = request.answer(question, answer, None);
        }

        for raw in &self.notes {
            let (question, note) = split_pair(raw)?;
            if !request.answers.contains_key(question) {
                return Err(format!("Note given for unanswered question '{question}'"));
            }
            request
                .details_by_question
                .insert(question.to_string(), note.to_string());
        }

        Ok(request.normalized())
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("Expected QUESTION=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(answers: &[&str], notes: &[&str]) -> ConsultArgs {
        ConsultArgs {
            location: " Lisbon ".into(),
            contact_name: String::new(),
            contact_phone: String::new(),
            contact_address: String::new(),
            answers: answers.iter().map(|s| s.to_string()).collect(),
            notes: notes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_request() {
        let request = args(&["fever=yes", "rash=No"], &["fever= since Tuesday ", "rash=  "])
            .build_request()
            .unwrap();
        assert_eq!(request.current_location, "Lisbon");
        assert_eq!(request.answers.get("fever"), Some(&Answer::Yes));
        assert_eq!(request.answers.get("rash"), Some(&Answer::No));
        assert_eq!(
            request.details_by_question.get("fever").map(String::as_str),
            Some("since Tuesday")
        );
        assert!(!request.details_by_question.contains_key("rash"));
    }

    #[test]
    fn test_build_request_rejects_bad_pairs() {
        assert!(args(&["fever"], &[]).build_request().is_err());
        assert!(args(&["fever=maybe"], &[]).build_request().is_err());
        assert!(args(&[], &["fever=hot"]).build_request().is_err());
    }
}
