//! Clinician consultation workflow
//!
//! - [`controller`] - [`ConsultationWorkflow`], loading and the prescription sub-flow
//! - [`referral`] - the referral sub-flow
//! - [`state`] - view and sub-flow states

pub mod controller;
pub mod referral;
pub mod state;

pub use controller::{list_consultations, ConsultationWorkflow};
pub use state::{FlowState, LatestPrescription, ReadyView, ViewState};
