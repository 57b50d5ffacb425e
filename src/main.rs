// Godwit - Travel-health telemedicine client
// Copyright (c) 2025 Godwit Contributors
// Licensed under the MIT License

use clap::Parser;
use godwit::cli::{exit_codes, Cli, Commands};
use godwit::config::{load_config_or_default, LoggingConfig};
use godwit::core::cancel::{CancelHandle, CancellationToken};
use godwit::logging::init_logging;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when it loads; a broken config is
    // reported by the command itself
    let config = load_config_or_default(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = config.map(|c| c.logging).unwrap_or(LoggingConfig {
        local_enabled: false,
        ..Default::default()
    });

    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_codes::FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Godwit - travel-health telemedicine client"
    );

    // Cancelling the handle stops in-flight commands at their next checkpoint
    let cancel = Arc::new(CancelHandle::new());
    let token = cancel.token();

    let signal_handle = cancel.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, cancelling");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                    if tokio::signal::ctrl_c().await.is_err() {
                        return;
                    }
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                }
            }
            eprintln!("\n⚠️  Interrupted, stopping...");
            signal_handle.cancel();
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                eprintln!("\n⚠️  Interrupted, stopping...");
                signal_handle.cancel();
            }
        }
    });

    let exit_code = match execute_command(&cli, &token).await {
        Ok(code) => code,
        Err(e) => {
            godwit::log_error_with_context!(e, "Command execution failed");
            eprintln!("Error: {e}");
            exit_codes::FATAL
        }
    };

    drop(_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, token: &CancellationToken) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Draft(args) => args.execute(&cli.config).await,
        Commands::Register(args) => args.execute(&cli.config, token).await,
        Commands::Whoami(args) => args.execute(&cli.config).await,
        Commands::Consult(args) => args.execute(&cli.config).await,
        Commands::History(args) => args.execute(&cli.config).await,
        Commands::Documents(args) => args.execute(&cli.config).await,
        Commands::Doctor(args) => args.execute(&cli.config, token).await,
    }
}
