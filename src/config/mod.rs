//! Configuration management for Godwit.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Godwit uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `GODWIT_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Type-safe configuration structs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use godwit::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("godwit.toml")?;
//! println!("API base: {}", config.api.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ApiConfig`] - backend base URL, origin, optional timeout, TLS
//! - [`StorageConfig`] - durable store and artifact directories
//! - [`CredentialsConfig`] - sign-in credentials for CLI commands
//! - [`PractitionerConfig`] - referring practitioner for referral letters
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "/api"
//! origin = "https://clinic.example.com"
//!
//! [credentials]
//! email = "doctor@example.com"
//! password = "${GODWIT_PASSWORD}"
//!
//! [practitioner]
//! name = "Dr. Grace Hopper"
//! registration = "GMS-12345"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApiConfig, ApplicationConfig, CredentialsConfig, GodwitConfig, LoggingConfig,
    PractitionerConfig, StorageConfig,
};
pub use secret::{secret_string, secrets_equal, SecretString, SecretValue};
