//! Configuration schema types
//!
//! This module defines the configuration structure for emrdeid. Each section
//! validates itself; [`EmrDeidConfig::validate`] runs them all.

use crate::config::SecretString;
use crate::deid::ClassifierOptions;
use crate::domain::EmrFormat;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Main emrdeid configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmrDeidConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Files and fields of a deidentification or reidentification run
    pub run: RunConfig,

    /// Identity table persistence
    #[serde(default)]
    pub table: TableConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EmrDeidConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.run.validate()?;
        self.table.validate()?;
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

/// Input/output files and the identifying columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// EMR export dialect of the input files (accuro / a, pss / b)
    pub emr_format: EmrFormat,

    /// Identifying columns, in tuple order
    pub target_fields: Vec<String>,

    /// Files to rewrite
    pub input_paths: Vec<PathBuf>,

    /// Destination for each input, same length and order as `input_paths`
    pub output_paths: Vec<PathBuf>,

    /// Recognize `M/D/YYYY` dates and reduce them to the year
    #[serde(default)]
    pub recognize_dates: bool,
}

impl RunConfig {
    fn validate(&self) -> Result<(), String> {
        if self.target_fields.is_empty() {
            return Err("run.target_fields cannot be empty".to_string());
        }
        let mut seen = HashSet::new();
        for field in &self.target_fields {
            if field.trim().is_empty() {
                return Err("run.target_fields cannot contain empty names".to_string());
            }
            if !seen.insert(field) {
                return Err(format!("run.target_fields lists '{field}' more than once"));
            }
        }

        if self.input_paths.is_empty() {
            return Err("run.input_paths cannot be empty".to_string());
        }
        if self.input_paths.len() != self.output_paths.len() {
            return Err(format!(
                "run.output_paths has {} entries but run.input_paths has {}",
                self.output_paths.len(),
                self.input_paths.len()
            ));
        }

        let mut outputs = HashSet::new();
        for output in &self.output_paths {
            if self.input_paths.contains(output) {
                return Err(format!(
                    "run.output_paths entry {} would overwrite an input file",
                    output.display()
                ));
            }
            if !outputs.insert(output) {
                return Err(format!(
                    "run.output_paths lists {} more than once",
                    output.display()
                ));
            }
        }
        Ok(())
    }

    /// Classifier options implied by this run
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            recognize_dates: self.recognize_dates,
        }
    }
}

/// Identity table persistence
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TableConfig {
    /// Where to save the identity table after a deidentification run
    #[serde(default)]
    pub save_path: Option<PathBuf>,

    /// Existing table to extend (deidentify) or invert (reidentify)
    #[serde(default)]
    pub load_path: Option<PathBuf>,

    /// Table password
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Replace an existing file at `save_path` without asking
    #[serde(default)]
    pub overwrite: bool,
}

impl TableConfig {
    fn validate(&self) -> Result<(), String> {
        let needs_password = self.save_path.is_some() || self.load_path.is_some();
        let has_password = self
            .password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty());

        if needs_password && !has_password {
            return Err(
                "table.password is required when table.save_path or table.load_path is set"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
