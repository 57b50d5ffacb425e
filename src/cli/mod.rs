//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Godwit using clap.

pub mod commands;
pub mod context;

use crate::config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const CONFIGURATION: i32 = 2;
    pub const VALIDATION: i32 = 3;
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
    pub const PARTIAL_SUCCESS: i32 = 6;
}

/// Godwit - travel-health telemedicine client
#[derive(Parser, Debug)]
#[command(name = "godwit")]
#[command(version, about, long_about = None)]
#[command(author = "Godwit Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "GODWIT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GODWIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Inspect and edit the saved registration draft
    Draft(commands::draft::DraftArgs),

    /// Submit the registration draft
    Register(commands::register::RegisterArgs),

    /// Show the signed-in user
    Whoami(commands::whoami::WhoamiArgs),

    /// Log a new consultation
    Consult(commands::consult::ConsultArgs),

    /// Show care history and latest prescription and referral
    History(commands::history::HistoryArgs),

    /// List documents attached to the latest registration
    Documents(commands::documents::DocumentsArgs),

    /// Clinician commands
    Doctor(commands::doctor::DoctorArgs),
}
