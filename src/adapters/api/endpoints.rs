//! Backend endpoint paths, relative to the API base

use crate::domain::ids::{
    ConsultationId, DocumentId, PrescriptionId, ReferralId, RegistrationId,
};
use crate::domain::ConsultationStatus;

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_ME: &str = "/auth/me";

pub const REGISTRATIONS: &str = "/registrations";
pub const CONSULTATIONS: &str = "/consultations";
pub const CARE_HISTORY_MINE: &str = "/care-history/mine";
pub const PRESCRIPTIONS_LATEST: &str = "/prescriptions/latest";
pub const REFERRALS_LATEST: &str = "/referrals/latest";
pub const DOCTOR_CONSULTATIONS: &str = "/doctor/consultations";

/// `GET /registrations?email=`
pub fn registrations_by_email(email: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email.trim())
        .finish();
    format!("{REGISTRATIONS}?{query}")
}

/// `POST /registrations/{id}/document`
pub fn registration_document_upload(id: RegistrationId) -> String {
    format!("{REGISTRATIONS}/{id}/document")
}

/// `GET /registrations/{id}/documents`
pub fn registration_documents(id: RegistrationId) -> String {
    format!("{REGISTRATIONS}/{id}/documents")
}

pub fn registration_document_view(id: RegistrationId, doc: DocumentId) -> String {
    format!("{REGISTRATIONS}/{id}/documents/{doc}/view")
}

pub fn registration_document_download(id: RegistrationId, doc: DocumentId) -> String {
    format!("{REGISTRATIONS}/{id}/documents/{doc}/download")
}

/// `GET /doctor/consultations`, optionally filtered by status
pub fn doctor_consultations(status: Option<&ConsultationStatus>) -> String {
    match status {
        Some(status) => {
            let raw: String = status.clone().into();
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("status", &raw)
                .finish();
            format!("{DOCTOR_CONSULTATIONS}?{query}")
        }
        None => DOCTOR_CONSULTATIONS.to_string(),
    }
}

pub fn doctor_consultation(id: ConsultationId) -> String {
    format!("{DOCTOR_CONSULTATIONS}/{id}")
}

pub fn doctor_prescriptions(id: ConsultationId) -> String {
    format!("{DOCTOR_CONSULTATIONS}/{id}/prescriptions")
}

pub fn doctor_latest_prescription(id: ConsultationId) -> String {
    format!("{DOCTOR_CONSULTATIONS}/{id}/prescriptions/latest")
}

pub fn doctor_prescription_pdf(id: PrescriptionId) -> String {
    format!("/doctor/prescriptions/{id}/pdf")
}

pub fn doctor_referrals(id: ConsultationId) -> String {
    format!("{DOCTOR_CONSULTATIONS}/{id}/referrals")
}

pub fn doctor_referral_pdf(id: ReferralId) -> String {
    format!("/doctor/referrals/{id}/pdf")
}
