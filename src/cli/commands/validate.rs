//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Godwit configuration file.

use crate::adapters::api::UrlResolver;
use crate::cli::exit_codes;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as its last step
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let resolved = match UrlResolver::new(&config.api.base_url, &config.api.origin) {
            Ok(urls) => urls.base().to_string(),
            Err(e) => {
                println!("❌ Invalid API base");
                println!("   Error: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  API Base: {resolved}");
        match config.api.timeout_seconds {
            Some(seconds) => println!("  Request Timeout: {seconds}s"),
            None => println!("  Request Timeout: none"),
        }
        println!("  TLS Verify: {}", config.api.tls_verify);
        println!("  Data Directory: {}", config.storage.data_dir);
        println!("  Artifact Directory: {}", config.storage.artifact_dir);
        println!(
            "  Credentials: {}",
            if config.credentials.is_complete() {
                config.credentials.email.as_deref().unwrap_or_default()
            } else {
                "not configured"
            }
        );
        if !config.practitioner.name.trim().is_empty() {
            println!("  Practitioner: {}", config.practitioner.name);
        }
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(exit_codes::OK)
    }
}
