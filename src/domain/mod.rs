//! Domain models and types for Godwit.
//!
//! This module contains the records exchanged with the telemedicine backend,
//! the client-side drafts built from them, and the error taxonomy shared by
//! every layer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RegistrationId`], [`ConsultationId`], [`PrescriptionId`], ...)
//! - **Drafts** ([`RegistrationDraft`], [`PrescriptionDraft`], [`ReferralDraft`])
//! - **Server records** ([`Consultation`], [`DocumentMeta`], [`CareHistory`], [`Identity`])
//! - **Error types** ([`GodwitError`], [`HttpError`], [`ValidationErrors`], [`PartialSuccessError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes, so they cannot be mixed up:
//!
//! ```rust
//! use godwit::domain::{ConsultationId, PrescriptionId};
//!
//! # fn example() -> Result<(), String> {
//! let consultation = ConsultationId::new(12)?;
//! let prescription = PrescriptionId::new(42)?;
//!
//! // This won't compile
//! // let wrong: ConsultationId = prescription;
//! # Ok(())
//! # }
//! ```
//!
//! # Empty states
//!
//! "Nothing yet" responses (`204`, empty bodies) are not errors. Queries that
//! can legitimately find nothing return `Option` or an empty collection.

pub mod care_history;
pub mod consultation;
pub mod document;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod prescription;
pub mod referral;
pub mod registration;
pub mod result;

// Re-export commonly used types for convenience
pub use care_history::{CareHistory, CareHistoryItem, CareHistoryPatient};
pub use consultation::{
    Answer, Consultation, ConsultationReceipt, ConsultationStatus, ConsultationSummary,
    NewConsultation, PatientSummary,
};
pub use document::{DocumentMeta, DocumentUpload};
pub use errors::{
    FieldError, FollowUp, GodwitError, HttpError, PartialSuccessError, PrimaryEffect, UploadError,
    ValidationErrors,
};
pub use identity::{Access, Identity, Role};
pub use ids::{
    ConsultationId, DocumentId, PatientRef, PrescriptionId, ReferralId, RegistrationId, UserId,
};
pub use prescription::{PrescriptionCreated, PrescriptionDraft, PrescriptionMeta, PrescriptionRequest};
pub use referral::{Practitioner, ReferralDraft, ReferralRequest};
pub use registration::{
    AccountPassword, FieldKind, FieldValue, PackageLength, RegistrationDraft, RegistrationField,
    RegistrationRecord,
};
pub use result::Result;
