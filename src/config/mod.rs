//! Configuration management for emrdeid.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! emrdeid uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `EMRDEID_*` environment overrides
//! - Default values for optional settings
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emrdeid::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("emrdeid.toml")?;
//!
//! println!("Format: {}", config.run.emr_format);
//! println!("Fields: {}", config.run.target_fields.join(", "));
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`RunConfig`] - EMR format, identifying columns, input and output files
//! - [`TableConfig`] - Identity table save/load paths and password
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [run]
//! emr_format = "accuro"
//! target_fields = ["First Name", "Last Name", "PHN"]
//! input_paths = ["visits.csv", "labs.csv"]
//! output_paths = ["visits.deid.csv", "labs.deid.csv"]
//!
//! [table]
//! save_path = "clinic.table"
//! password = "${EMRDEID_TABLE_PASSWORD}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, EmrDeidConfig, LoggingConfig, RunConfig, TableConfig};
pub use secret::{secret_string, SecretString, SecretValue};
