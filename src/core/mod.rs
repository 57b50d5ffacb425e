//! Core orchestration for Godwit.
//!
//! This module holds the client-side flows that sit between the backend API
//! and whatever drives them (the CLI, or an embedding application).
//!
//! # Modules
//!
//! - [`draft`] - registration draft store and the three-step wizard
//! - [`session`] - current-user session, login, logout and role gating
//! - [`artifact`] - document upload, artifact URLs and blob lifetimes
//! - [`workflow`] - consultation review, prescription and referral issuing
//! - [`patient`] - patient-side queries (care history, latest artifacts)
//! - [`cancel`] - cooperative cancellation for in-flight operations
//!
//! # Partial success
//!
//! Multi-step operations can commit their first step on the server and then
//! fail a follow-up (a registration saved without its document, a
//! prescription created without its PDF). Those surface as
//! [`GodwitError::PartialSuccess`](crate::domain::GodwitError::PartialSuccess)
//! carrying the committed identifier, so callers can retry only the
//! follow-up.
//!
//! # Example
//!
//! ```rust,no_run
//! use godwit::adapters::api::{ApiGateway, HttpGateway};
//! use godwit::adapters::storage::MemoryBlobStore;
//! use godwit::config::ApiConfig;
//! use godwit::core::artifact::ArtifactManager;
//! use godwit::core::cancel::CancelHandle;
//! use godwit::core::workflow::ConsultationWorkflow;
//! use godwit::domain::{ConsultationId, Practitioner};
//! use std::sync::Arc;
//!
//! # async fn example() -> godwit::domain::Result<()> {
//! let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&ApiConfig::default())?);
//! let artifacts = ArtifactManager::new(gateway.clone(), Arc::new(MemoryBlobStore::new()));
//! let id = ConsultationId::new(12).map_err(godwit::domain::GodwitError::Other)?;
//!
//! let cancel = CancelHandle::new();
//! let mut workflow = ConsultationWorkflow::new(id, gateway, artifacts, Practitioner::default());
//! workflow.load(&cancel.token()).await?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cancel;
pub mod draft;
pub mod patient;
pub mod session;
pub mod workflow;
