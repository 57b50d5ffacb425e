//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::GodwitConfig;
use super::secret::secret_string;
use crate::domain::errors::GodwitError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "godwit.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GodwitConfig
/// 4. Applies environment variable overrides (GODWIT_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use godwit::config::loader::load_config;
///
/// let config = load_config("godwit.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GodwitConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GodwitError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GodwitError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: GodwitConfig = toml::from_str(&contents)
        .map_err(|e| GodwitError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        GodwitError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads configuration, or starts from defaults when the file is absent
///
/// Overrides from the environment still apply to the defaults, so a bare
/// `GODWIT_API_BASE_URL=...` is enough to point the client somewhere.
///
/// # Errors
///
/// Returns an error if the file exists but is invalid, or if the defaults
/// combined with overrides fail validation.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<GodwitConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = GodwitConfig::default();
    apply_env_overrides(&mut config);
    config.validate().map_err(|e| {
        GodwitError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. Every missing variable is reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| GodwitError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(GodwitError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_flag(name: &str, default: bool) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|val| val.trim().parse().unwrap_or(default))
}

/// Applies environment variable overrides using GODWIT_* prefix
///
/// Environment variables follow the pattern: GODWIT_<SECTION>_<KEY>
/// For example: GODWIT_API_BASE_URL, GODWIT_STORAGE_DATA_DIR
fn apply_env_overrides(config: &mut GodwitConfig) {
    if let Ok(val) = std::env::var("GODWIT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("GODWIT_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("GODWIT_API_ORIGIN") {
        config.api.origin = val;
    }
    if let Ok(val) = std::env::var("GODWIT_API_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.trim().parse() {
            config.api.timeout_seconds = Some(seconds);
        }
    }
    if let Some(flag) = env_flag("GODWIT_API_TLS_VERIFY", true) {
        config.api.tls_verify = flag;
    }

    if let Ok(val) = std::env::var("GODWIT_STORAGE_DATA_DIR") {
        config.storage.data_dir = val;
    }
    if let Ok(val) = std::env::var("GODWIT_STORAGE_ARTIFACT_DIR") {
        config.storage.artifact_dir = val;
    }

    if let Ok(val) = std::env::var("GODWIT_CREDENTIALS_EMAIL") {
        config.credentials.email = Some(val);
    }
    if let Ok(val) = std::env::var("GODWIT_CREDENTIALS_PASSWORD") {
        config.credentials.password = Some(secret_string(val));
    }

    if let Ok(val) = std::env::var("GODWIT_PRACTITIONER_NAME") {
        config.practitioner.name = val;
    }
    if let Ok(val) = std::env::var("GODWIT_PRACTITIONER_REGISTRATION") {
        config.practitioner.registration = val;
    }

    if let Some(flag) = env_flag("GODWIT_LOGGING_LOCAL_ENABLED", true) {
        config.logging.local_enabled = flag;
    }
    if let Ok(val) = std::env::var("GODWIT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("GODWIT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
