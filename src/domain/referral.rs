//! Referral letters
//!
//! The letter body is pre-populated from the consultation using a fixed
//! template and is freely editable afterwards.

use super::consultation::Consultation;
use super::errors::{FieldError, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Field name used in referral validation messages
pub const LETTER_BODY_FIELD: &str = "Letter Body";

const DATE_FORMAT: &str = "%d/%m/%Y";

const NAME_PLACEHOLDER: &str = "the patient";
const DOB_PLACEHOLDER: &str = "not recorded";
const LOCATION_PLACEHOLDER: &str = "the stated location";
const DATE_PLACEHOLDER: &str = "the date of consultation";
const PATIENT_ID_PLACEHOLDER: &str = "not recorded";

/// Referring clinician shown on the letter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
    pub name: String,
    pub registration: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Referral letter being composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralDraft {
    pub body: String,
}

impl ReferralDraft {
    /// Builds the initial letter from the consultation
    pub fn from_consultation(consultation: &Consultation, practitioner: &Practitioner) -> Self {
        Self {
            body: letter_body(consultation, practitioner),
        }
    }

    /// Validates and builds the request body
    ///
    /// # Errors
    ///
    /// Fails when the letter body is blank.
    pub fn validate(&self) -> Result<ReferralRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.body.trim().is_empty() {
            errors.push(FieldError::required(LETTER_BODY_FIELD));
        }
        errors.into_result(ReferralRequest {
            paragraph: self.body.clone(),
        })
    }
}

/// Body of `POST /doctor/consultations/{id}/referrals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralRequest {
    pub paragraph: String,
}

struct LetterFields {
    name: String,
    dob: String,
    location: String,
    date: String,
    patient_id: String,
}

impl LetterFields {
    fn from_consultation(c: &Consultation) -> Self {
        Self {
            name: c
                .patient
                .full_name()
                .unwrap_or_else(|| NAME_PLACEHOLDER.to_string()),
            dob: c
                .patient
                .dob
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| DOB_PLACEHOLDER.to_string()),
            location: c
                .current_location
                .clone()
                .unwrap_or_else(|| LOCATION_PLACEHOLDER.to_string()),
            date: c
                .created_at
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| DATE_PLACEHOLDER.to_string()),
            patient_id: c
                .patient_id
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| PATIENT_ID_PLACEHOLDER.to_string()),
        }
    }
}

/// Renders the default letter body for a consultation
pub fn letter_body(consultation: &Consultation, practitioner: &Practitioner) -> String {
    let f = LetterFields::from_consultation(consultation);
    let signatory = if practitioner.name.trim().is_empty() {
        "Referring Practitioner"
    } else {
        practitioner.name.trim()
    };

    format!(
        "Dear Dr (To Whom it May Concern),\n\
         \n\
         I am writing to refer {name}, born on {dob}, Patient ID: {pid}. During their travel to \
         {location} on {date}, they presented with symptoms as assessed during the \
         tele-consultation. Kindly review and consider further evaluation and management.\n\
         \n\
         The patient's relevant medical history and current medication have been reviewed \
         during the consultation. Based on the presenting complaint, please consider local \
         assessment, and additional investigations if clinically indicated.\n\
         \n\
         Thank you for considering this referral. Please feel free to contact me if you require \
         any additional information.\n\
         \n\
         Sincerely,\n\
         \n\
         {signatory}\n\
         Digital Signature Area\n\
         Referring Practitioner",
        name = f.name,
        dob = f.dob,
        pid = f.patient_id,
        location = f.location,
        date = f.date,
    )
}

/// Renders a plain-text preview: patient block, practitioner block, letter body
pub fn render_preview(
    consultation: &Consultation,
    practitioner: &Practitioner,
    body: &str,
) -> String {
    let f = LetterFields::from_consultation(consultation);
    let or_dash = |s: &str| {
        if s.trim().is_empty() {
            "-".to_string()
        } else {
            s.trim().to_string()
        }
    };
    let name = consultation
        .patient
        .full_name()
        .unwrap_or_else(|| "-".to_string());
    let dob = consultation
        .patient
        .dob
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    let pid = consultation
        .patient_id
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "REFERRAL LETTER (PREVIEW)");
    let _ = writeln!(out);
    let _ = writeln!(out, "Patient Information");
    let _ = writeln!(out, "  Patient Name:   {name}");
    let _ = writeln!(out, "  Patient ID:     {pid}");
    let _ = writeln!(out, "  Date of Birth:  {dob}");
    let _ = writeln!(out, "  Location:       {}", f.location);
    let _ = writeln!(out);
    let _ = writeln!(out, "Referral From");
    let _ = writeln!(out, "  GP Name:        {}", or_dash(&practitioner.name));
    let _ = writeln!(out, "  GMS Number:     {}", or_dash(&practitioner.registration));
    let _ = writeln!(out, "  Address:        {}", or_dash(&practitioner.address));
    let _ = writeln!(out, "  Email:          {}", or_dash(&practitioner.email));
    let _ = writeln!(out, "  Contact Number: {}", or_dash(&practitioner.phone));
    let _ = writeln!(out);
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out
}
