//! Consultation records
//!
//! Consultations are server-owned. The client reads them and, on the patient
//! side, logs new ones; the clinician side spawns prescriptions and referrals
//! from them.

use super::ids::{ConsultationId, PatientRef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Consultation progress as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConsultationStatus {
    Pending,
    InProgress,
    Completed,
    Logged,
    Other(String),
}

impl From<String> for ConsultationStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => ConsultationStatus::Pending,
            "IN_PROGRESS" => ConsultationStatus::InProgress,
            "COMPLETED" | "DONE" => ConsultationStatus::Completed,
            "LOGGED" => ConsultationStatus::Logged,
            _ => ConsultationStatus::Other(value),
        }
    }
}

impl From<ConsultationStatus> for String {
    fn from(status: ConsultationStatus) -> Self {
        match status {
            ConsultationStatus::Pending => "PENDING".to_string(),
            ConsultationStatus::InProgress => "IN_PROGRESS".to_string(),
            ConsultationStatus::Completed => "COMPLETED".to_string(),
            ConsultationStatus::Logged => "LOGGED".to_string(),
            ConsultationStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConsultationStatus::Pending => "Pending",
            ConsultationStatus::InProgress => "In progress",
            ConsultationStatus::Completed => "Completed",
            ConsultationStatus::Logged => "Logged",
            ConsultationStatus::Other(s) => s.as_str(),
        };
        f.write_str(label)
    }
}

/// Patient block embedded in a consultation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientSummary {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub dob: Option<NaiveDate>,
}

impl PatientSummary {
    /// First and last name joined, `None` when both are blank
    pub fn full_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }
}

/// Full consultation as returned by `GET /doctor/consultations/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: ConsultationId,

    #[serde(default, deserialize_with = "lenient_patient_ref")]
    pub patient_id: Option<PatientRef>,

    #[serde(default)]
    pub patient: PatientSummary,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub current_location: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_phone: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_address: Option<String>,

    /// Intake answers keyed by question id, usually "Yes" or "No"
    #[serde(default)]
    pub answers: BTreeMap<String, String>,

    /// Free-text notes keyed by question id
    #[serde(default)]
    pub details_by_question: BTreeMap<String, String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: Option<ConsultationStatus>,
}

impl Consultation {
    /// Question ids answered "Yes", in key order
    pub fn positive_answers(&self) -> Vec<&str> {
        self.answers
            .iter()
            .filter(|(_, a)| a.trim().eq_ignore_ascii_case("yes"))
            .map(|(q, _)| q.as_str())
            .collect()
    }

    /// Note recorded against a question, if any
    pub fn note_for(&self, question_id: &str) -> Option<&str> {
        self.details_by_question
            .get(question_id)
            .map(String::as_str)
            .filter(|n| !n.trim().is_empty())
    }

    /// Patient name, falling back to the contact name
    pub fn patient_name(&self) -> Option<String> {
        self.patient
            .full_name()
            .or_else(|| self.contact_name.clone())
    }

    /// WhatsApp deep link for the contact phone, if one is usable
    pub fn whatsapp_link(&self) -> Option<String> {
        let phone = self.contact_phone.as_deref()?;
        let digits: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        let digits = digits.trim_start_matches('+').trim_start_matches('0');
        (!digits.is_empty()).then(|| format!("https://wa.me/{digits}"))
    }
}

/// Row returned by `GET /doctor/consultations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationSummary {
    pub id: ConsultationId,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ConsultationStatus>,
}

/// Yes/No intake answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

/// Patient-side request to log a consultation (`POST /consultations`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsultation {
    pub current_location: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub answers: BTreeMap<String, Answer>,
    pub details_by_question: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

impl NewConsultation {
    /// Records an answer, with an optional note kept only when non-blank
    pub fn answer(
        mut self,
        question_id: impl Into<String>,
        answer: Answer,
        note: Option<&str>,
    ) -> Self {
        let question_id = question_id.into();
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            self.details_by_question
                .insert(question_id.clone(), note.to_string());
        }
        self.answers.insert(question_id, answer);
        self
    }

    /// Trims notes and drops blank ones
    pub fn normalized(mut self) -> Self {
        self.details_by_question = self
            .details_by_question
            .into_iter()
            .map(|(q, n)| (q, n.trim().to_string()))
            .filter(|(_, n)| !n.is_empty())
            .collect();
        self
    }
}

/// Response to `POST /consultations`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsultationReceipt {
    pub id: ConsultationId,
    #[serde(default)]
    pub status: Option<ConsultationStatus>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

pub(crate) fn lenient_patient_ref<'de, D>(deserializer: D) -> Result<Option<PatientRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => PatientRef::new(s).ok(),
        Some(serde_json::Value::Number(n)) => PatientRef::new(n.to_string()).ok(),
        _ => None,
    })
}

/// Accepts `YYYY-MM-DD`, a full RFC 3339 timestamp, blank or null
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_date(&s)))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}
