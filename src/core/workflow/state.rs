//! Consultation detail view states

use crate::core::artifact::ArtifactUrl;
use crate::domain::{Consultation, PrescriptionMeta};

/// Latest existing prescription for the consultation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestPrescription {
    /// None yet (`204` or empty body)
    None,
    Present(PrescriptionMeta),
    /// The lookup failed; the view still loads
    Unavailable(String),
}

/// Loaded consultation plus opportunistic extras
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyView {
    pub consultation: Consultation,
    pub latest_prescription: LatestPrescription,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready(Box<ReadyView>),
    LoadFailed(String),
}

impl ViewState {
    pub fn ready(&self) -> Option<&ReadyView> {
        match self {
            ViewState::Ready(view) => Some(view),
            _ => None,
        }
    }
}

/// State of one sub-flow (prescription or referral)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Composing,
    Submitting,
    Succeeded(ArtifactUrl),
    /// Nothing was created
    Failed { message: String },
    /// The entity was created but its PDF could not be retrieved; only the
    /// fetch needs retrying
    PdfFailed { created_id: u64, message: String },
}

impl FlowState {
    /// User-facing message for the failure states
    pub fn message(&self) -> Option<&str> {
        match self {
            FlowState::Failed { message } | FlowState::PdfFailed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Identifier whose PDF fetch can be retried
    pub fn retryable_id(&self) -> Option<u64> {
        match self {
            FlowState::PdfFailed { created_id, .. } => Some(*created_id),
            _ => None,
        }
    }

    pub fn artifact(&self) -> Option<&ArtifactUrl> {
        match self {
            FlowState::Succeeded(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, FlowState::Submitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_state_accessors() {
        let failed = FlowState::PdfFailed {
            created_id: 42,
            message: "Prescription #42 created, but the PDF could not be retrieved: HTTP 500".into(),
        };
        assert_eq!(failed.retryable_id(), Some(42));
        assert!(failed.message().unwrap().contains("#42"));
        assert!(failed.artifact().is_none());

        let ok = FlowState::Succeeded(ArtifactUrl::Remote("https://x/a.pdf".into()));
        assert_eq!(ok.retryable_id(), None);
        assert!(ok.message().is_none());
        assert!(ok.artifact().is_some());

        assert!(FlowState::Submitting.is_busy());
        assert_eq!(
            FlowState::Failed { message: "no".into() }.retryable_id(),
            None
        );
    }
}
