//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output on stderr
//! - optional JSON file logging with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use godwit::logging::init_logging;
//! use godwit::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an operation whose primary effect committed but whose follow-up failed
///
/// Takes a [`PartialSuccessError`](crate::domain::PartialSuccessError).
///
/// # Example
///
/// ```no_run
/// use godwit::log_partial_success;
/// use godwit::domain::{FollowUp, GodwitError, PartialSuccessError, PrescriptionId, PrimaryEffect};
///
/// let err = PartialSuccessError::new(
///     PrimaryEffect::PrescriptionCreated(PrescriptionId::new(42).unwrap()),
///     FollowUp::PrescriptionPdf,
///     GodwitError::Connection("reset".to_string()),
/// );
/// log_partial_success!(&err);
/// ```
#[macro_export]
macro_rules! log_partial_success {
    ($partial:expr) => {
        tracing::warn!(
            primary_id = $partial.primary_id(),
            effect = %$partial.effect,
            follow_up = %$partial.follow_up,
            cause = %$partial.cause,
            "Primary effect committed but follow-up failed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use godwit::log_error_with_context;
/// use godwit::domain::GodwitError;
///
/// let error = GodwitError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
