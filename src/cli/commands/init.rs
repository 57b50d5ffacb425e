//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_codes;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "godwit.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Godwit configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_codes::CONFIGURATION);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your backend address", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set GODWIT_EMAIL and GODWIT_PASSWORD");
                println!("  3. Validate configuration: godwit validate-config");
                println!("  4. Start a registration: godwit draft show");
                println!();
                Ok(exit_codes::OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_codes::FATAL)
            }
        }
    }
}

/// Sample configuration with every section and its defaults
pub fn sample_config() -> &'static str {
    r#"# Godwit Configuration File
# Travel-health telemedicine client

[application]
log_level = "info"  # trace | debug | info | warn | error

[api]
# Absolute (https://clinic.example.com/api) or relative to the origin (/api)
base_url = "/api"
origin = "http://localhost:8080"
# Request timeout in seconds; leave unset for no client-side timeout
# timeout_seconds = 30
tls_verify = true

[storage]
# Saved registration draft and session hint
data_dir = ".godwit"
# Downloaded prescription and referral PDFs
artifact_dir = ".godwit/artifacts"

[credentials]
# Needed by commands that require a signed-in session
# email = "${GODWIT_EMAIL}"
# password = "${GODWIT_PASSWORD}"

[practitioner]
# Referring clinician printed on referral letters
name = ""
registration = ""
address = ""
email = ""
phone = ""

[logging]
local_enabled = true
local_path = ".godwit/logs"
local_rotation = "daily"  # daily | hourly
"#
}
