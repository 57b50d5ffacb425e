// Godwit - Travel-health telemedicine client
// Copyright (c) 2025 Godwit Contributors
// Licensed under the MIT License

//! # Godwit - travel-health telemedicine client
//!
//! Godwit is the client-side orchestration layer of a travel-health
//! telemedicine service: patients register for a travel package and log
//! consultations, doctors review them and issue prescriptions and referral
//! letters as PDFs.
//!
//! ## Overview
//!
//! This library provides:
//! - **Registration** with a write-through persisted draft and a three-step wizard
//! - **Sessions** against a cookie-based backend, with role gating
//! - **Documents and artifacts**: supporting-document upload, PDF retrieval and
//!   explicit release of local artifacts
//! - **Clinician workflow**: consultation → prescription → referral, with
//!   partial success reported when a PDF cannot be fetched after creation
//! - **Patient queries**: care history and latest prescription/referral
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Orchestration (draft, session, artifact, workflow, patient)
//! - [`adapters`] - External integrations (backend HTTP API, local storage)
//! - [`domain`] - Records, identifiers and the error taxonomy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use godwit::adapters::api::{ApiGateway, HttpGateway};
//! use godwit::adapters::storage::{FileStore, MemoryBlobStore};
//! use godwit::config::load_config_or_default;
//! use godwit::core::artifact::ArtifactManager;
//! use godwit::core::cancel::CancelHandle;
//! use godwit::core::draft::{DraftStore, RegistrationWizard};
//! use godwit::core::session::SessionProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("godwit.toml")?;
//! let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config.api)?);
//! let store = Arc::new(FileStore::open(&config.storage.data_dir)?);
//!
//! let drafts = Arc::new(DraftStore::load(store.clone()));
//! let artifacts = ArtifactManager::new(gateway.clone(), Arc::new(MemoryBlobStore::new()));
//! let session = Arc::new(SessionProvider::new(gateway.clone(), store));
//!
//! let mut wizard = RegistrationWizard::new(drafts, gateway, artifacts, session);
//! let cancel = CancelHandle::new();
//! let outcome = wizard.submit(None, &cancel.token()).await?;
//! println!("Registration #{} saved", outcome.registration_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`] with a
//! [`domain::GodwitError`]. Client-side validation failures never reach the
//! network; operations whose first step committed report
//! [`domain::GodwitError::PartialSuccess`] with the committed identifier.
//! Nothing is retried automatically.
//!
//! ## Logging
//!
//! Godwit uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(registration_id = 7, "Registration saved");
//! warn!(prescription_id = 42, "PDF could not be retrieved");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
