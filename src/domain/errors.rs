//! Domain error types
//!
//! This module defines the error hierarchy for Godwit. All errors are
//! domain-specific and don't expose third-party HTTP or storage types.
//!
//! The taxonomy follows how failures are surfaced to the initiating view:
//!
//! - [`HttpError`] - the backend answered outside the 2xx range
//! - [`ValidationErrors`] - client-side, field-scoped, raised before any network call
//! - [`PartialSuccessError`] - the primary effect committed but a dependent follow-up failed
//! - [`UploadError`] - the backend rejected a supporting document
//!
//! "Nothing yet" (`204`, empty bodies) is not an error and is modelled with `Option`.

use super::ids::{PrescriptionId, ReferralId, RegistrationId};
use std::fmt;
use thiserror::Error;

/// Maximum number of characters of a raw response body shown to users.
const BODY_PREVIEW_CHARS: usize = 200;

/// Main Godwit error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum GodwitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-2xx response from the backend
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Client-side validation failures
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Primary effect committed, dependent follow-up failed
    #[error(transparent)]
    PartialSuccess(#[from] PartialSuccessError),

    /// Supporting document rejected
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Sign-in failures
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Durable storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The operation observed its cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl GodwitError {
    /// Whether this error carries an already-committed primary effect
    pub fn is_partial_success(&self) -> bool {
        matches!(self, GodwitError::PartialSuccess(_))
    }

    /// Whether this error is the result of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GodwitError::Cancelled)
    }
}

/// Non-2xx HTTP response
///
/// Carries the status code and the raw body exactly as received. The
/// `Display` form truncates the body so it can be shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {}", body_preview(.raw_body))]
pub struct HttpError {
    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub raw_body: String,
}

impl HttpError {
    /// Creates a new HTTP error
    pub fn new(status: u16, raw_body: impl Into<String>) -> Self {
        Self {
            status,
            raw_body: raw_body.into(),
        }
    }

    /// Client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Missing or insufficient session
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Resource not found
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

fn body_preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        body.to_string()
    } else {
        let mut preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        preview.push('…');
        preview
    }
}

/// A single field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as presented to the user
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Creates a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for "is required" failures
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} is required");
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// All validation failures found in one pass
///
/// Validation is not fail-fast: every failing field is reported so the user
/// sees all problems at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a failure
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// True when nothing failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the failures
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Names of the failing fields, in report order
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// Message for a specific field, if it failed
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.message.clone()).collect();
        write!(f, "Validation failed: {}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Effect that committed before a follow-up failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryEffect {
    /// Registration record saved
    RegistrationSaved(RegistrationId),
    /// Prescription created
    PrescriptionCreated(PrescriptionId),
    /// Referral created
    ReferralCreated(ReferralId),
}

impl PrimaryEffect {
    /// Identifier assigned by the backend for the committed effect
    pub fn id(&self) -> u64 {
        match self {
            PrimaryEffect::RegistrationSaved(id) => id.get(),
            PrimaryEffect::PrescriptionCreated(id) => id.get(),
            PrimaryEffect::ReferralCreated(id) => id.get(),
        }
    }
}

impl fmt::Display for PrimaryEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryEffect::RegistrationSaved(id) => write!(f, "registration #{id} saved"),
            PrimaryEffect::PrescriptionCreated(id) => write!(f, "prescription #{id} created"),
            PrimaryEffect::ReferralCreated(id) => write!(f, "referral #{id} created"),
        }
    }
}

/// Dependent follow-up step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Supporting document upload after registration
    DocumentUpload,
    /// Prescription PDF retrieval
    PrescriptionPdf,
    /// Referral PDF retrieval
    ReferralPdf,
}

impl fmt::Display for FollowUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowUp::DocumentUpload => write!(f, "document upload"),
            FollowUp::PrescriptionPdf => write!(f, "prescription PDF retrieval"),
            FollowUp::ReferralPdf => write!(f, "referral PDF retrieval"),
        }
    }
}

/// Primary effect committed, follow-up failed
///
/// Preserves the primary effect's identifier for user-facing acknowledgment
/// and for retrying only the failed follow-up.
#[derive(Debug, Error)]
#[error("{effect}, but {follow_up} failed: {cause}")]
pub struct PartialSuccessError {
    /// What committed
    pub effect: PrimaryEffect,

    /// What failed afterwards
    pub follow_up: FollowUp,

    /// Why the follow-up failed
    #[source]
    pub cause: Box<GodwitError>,
}

impl PartialSuccessError {
    /// Creates a new partial success error
    pub fn new(effect: PrimaryEffect, follow_up: FollowUp, cause: GodwitError) -> Self {
        Self {
            effect,
            follow_up,
            cause: Box::new(cause),
        }
    }

    /// Identifier of the committed effect
    pub fn primary_id(&self) -> u64 {
        self.effect.id()
    }
}

/// Supporting document rejected by the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Upload rejected{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
pub struct UploadError {
    /// HTTP status, when the backend answered
    pub status: Option<u16>,

    /// Reason reported by the backend
    pub message: String,
}

impl UploadError {
    /// Creates a new upload error
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GodwitError {
    fn from(err: std::io::Error) -> Self {
        GodwitError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GodwitError {
    fn from(err: serde_json::Error) -> Self {
        GodwitError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for GodwitError {
    fn from(err: toml::de::Error) -> Self {
        GodwitError::Configuration(format!("TOML parse error: {err}"))
    }
}
