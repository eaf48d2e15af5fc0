//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output at a configurable level
//! - JSON log files with rotation
//!
//! Log events carry counts, paths, field names and table fingerprints. Cell
//! values and passwords are never logged.
//!
//! # Example
//!
//! ```no_run
//! use emrdeid::logging::init_logging;
//! use emrdeid::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a run over a set of files
///
/// # Example
///
/// ```no_run
/// use emrdeid::log_run_start;
///
/// let fields = vec!["First Name".to_string(), "PHN".to_string()];
/// log_run_start!("deidentify", 2, &fields);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($operation:expr, $files:expr, $fields:expr) => {
        tracing::info!(
            operation = $operation,
            files = $files,
            fields = ?$fields,
            "Starting run"
        );
    };
}

/// Log the completion of a run
///
/// # Example
///
/// ```no_run
/// use emrdeid::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("deidentify", 1200, Duration::from_millis(85));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($operation:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            operation = $operation,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use emrdeid::log_error_with_context;
/// use emrdeid::domain::EmrError;
///
/// let error = EmrError::Configuration("Invalid config".to_string());
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

/// Log an unusable answer to an interactive prompt
///
/// # Example
///
/// ```no_run
/// use emrdeid::log_prompt_retry;
///
/// log_prompt_retry!(2, 3, "expected y or n");
/// ```
#[macro_export]
macro_rules! log_prompt_retry {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Prompt answer not understood"
        );
    };
}
