//! Configuration schema types
//!
//! This module defines the configuration structure for Godwit.

use crate::config::SecretString;
use crate::domain::Practitioner;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Main Godwit configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GodwitConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local durable storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Credentials for commands that need a signed-in session
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Referring practitioner used in referral letters
    #[serde(default)]
    pub practitioner: PractitionerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GodwitConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.storage.validate()?;
        self.credentials.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base, absolute (`https://host/api`) or origin-relative (`/api`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin used to resolve a relative base and prefixed paths
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Optional request timeout; absent means none
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Enable TLS certificate verification
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        let origin = url::Url::parse(&self.origin)
            .map_err(|e| format!("Invalid api.origin '{}': {}", self.origin, e))?;
        if origin.scheme() != "http" && origin.scheme() != "https" {
            return Err(format!(
                "api.origin must use http or https, got '{}'",
                origin.scheme()
            ));
        }

        if self.timeout_seconds == Some(0) {
            return Err("api.timeout_seconds must be > 0 when set".to_string());
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            timeout_seconds: None,
            tls_verify: true,
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the durable key-value store (draft, session hint)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding fetched artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.data_dir.trim().is_empty() {
            return Err("storage.data_dir cannot be empty".to_string());
        }
        if self.artifact_dir.trim().is_empty() {
            return Err("storage.artifact_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// Sign-in credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Account email
    #[serde(default)]
    pub email: Option<String>,

    /// Account password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl CredentialsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.password.is_some() && self.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err("credentials.password is set but credentials.email is missing".to_string());
        }
        Ok(())
    }

    /// True when both an email and a non-blank password are configured
    pub fn is_complete(&self) -> bool {
        let has_email = self.email.as_deref().is_some_and(|e| !e.trim().is_empty());
        let has_password = self
            .password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_blank());
        has_email && has_password
    }
}

/// Referring practitioner details
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PractitionerConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub registration: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl From<&PractitionerConfig> for Practitioner {
    fn from(config: &PractitionerConfig) -> Self {
        Practitioner {
            name: config.name.clone(),
            registration: config.registration.clone(),
            address: config.address.clone(),
            email: config.email.clone(),
            phone: config.phone.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    option_env!("GODWIT_API_BASE").unwrap_or("/api").to_string()
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> String {
    ".godwit".to_string()
}

fn default_artifact_dir() -> String {
    ".godwit/artifacts".to_string()
}

fn default_local_path() -> String {
    ".godwit/logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
