//! Prescription composition and metadata

use super::errors::{FieldError, ValidationErrors};
use super::ids::PrescriptionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field names used in prescription validation messages
pub const DIAGNOSIS_FIELD: &str = "Diagnosis";
pub const MEDICINES_FIELD: &str = "Medicines";

/// Prescription being composed by a clinician
///
/// Starts with one empty medicine line so there is always a line to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionDraft {
    pub history: String,
    pub diagnosis: String,
    medicines: Vec<String>,
    pub recommendations: String,
}

impl Default for PrescriptionDraft {
    fn default() -> Self {
        Self {
            history: String::new(),
            diagnosis: String::new(),
            medicines: vec![String::new()],
            recommendations: String::new(),
        }
    }
}

impl PrescriptionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Medicine lines as edited, blanks included
    pub fn medicines(&self) -> &[String] {
        &self.medicines
    }

    /// Appends an empty medicine line and returns its index
    pub fn add_medicine(&mut self) -> usize {
        self.medicines.push(String::new());
        self.medicines.len() - 1
    }

    /// Replaces the text of a medicine line
    ///
    /// Returns `false` when the index is out of range.
    pub fn set_medicine(&mut self, index: usize, line: impl Into<String>) -> bool {
        match self.medicines.get_mut(index) {
            Some(slot) => {
                *slot = line.into();
                true
            }
            None => false,
        }
    }

    /// Removes a medicine line, keeping at least one editable line
    pub fn remove_medicine(&mut self, index: usize) -> bool {
        if index >= self.medicines.len() {
            return false;
        }
        self.medicines.remove(index);
        if self.medicines.is_empty() {
            self.medicines.push(String::new());
        }
        true
    }

    /// Replaces every medicine line at once
    pub fn with_medicines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.medicines = lines.into_iter().map(Into::into).collect();
        if self.medicines.is_empty() {
            self.medicines.push(String::new());
        }
        self
    }

    /// Validates and builds the request body
    ///
    /// Diagnosis must be non-blank and at least one medicine line must be
    /// non-blank after trimming. Blank lines are dropped from the request.
    ///
    /// # Errors
    ///
    /// Returns every failing field, not just the first.
    pub fn validate(&self) -> Result<PrescriptionRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.diagnosis.trim().is_empty() {
            errors.push(FieldError::required(DIAGNOSIS_FIELD));
        }

        let medicines: Vec<String> = self
            .medicines
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if medicines.is_empty() {
            errors.push(FieldError::new(
                MEDICINES_FIELD,
                "Add at least one medicine",
            ));
        }

        errors.into_result(PrescriptionRequest {
            history: self.history.trim().to_string(),
            diagnosis: self.diagnosis.trim().to_string(),
            medicines,
            recommendations: self.recommendations.trim().to_string(),
        })
    }
}

/// Body of `POST /doctor/consultations/{id}/prescriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrescriptionRequest {
    pub history: String,
    pub diagnosis: String,
    pub medicines: Vec<String>,
    pub recommendations: String,
}

/// Response to a prescription create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PrescriptionCreated {
    pub id: PrescriptionId,
}

/// Metadata of an existing prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionMeta {
    pub id: PrescriptionId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Server-relative or absolute PDF location
    #[serde(default)]
    pub pdf_url: Option<String>,
}
