//! Domain error types
//!
//! This module defines the error hierarchy for emrdeid. Every variant aborts the
//! current run; none of them is retried or swallowed.
//! Errors don't expose third-party types.

use thiserror::Error;

/// Main emrdeid error type
///
/// This is the primary error type used throughout the library. Messages are
/// expected to name the offending field, file or row so an operator can act on
/// them without re-running in debug mode.
#[derive(Debug, Error)]
pub enum EmrError {
    /// Target fields missing from a file, inconsistent across a run, or an
    /// otherwise unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A reidentification table refers to fields the file does not have
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Wrong password or a corrupted encrypted table
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Two identity tuples share one synthetic tuple, so the table cannot be inverted
    #[error("Ambiguous identity table: {0}")]
    AmbiguousTable(String),

    /// A row's synthetic tuple is not present in the identity table
    #[error(
        "Unknown entry in {source_name} at row {row}: synthetic values {tuple:?} for fields {fields:?} are not in the identity table"
    )]
    UnknownEntry {
        /// File (or stream) the row was read from
        source_name: String,
        /// 1-based data row number (header excluded)
        row: usize,
        /// Identity table fields, parallel to `tuple`
        fields: Vec<String>,
        /// The synthetic values that failed to resolve
        tuple: Vec<String>,
    },

    /// Referenced file path does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl EmrError {
    /// Process exit code used by the CLI for this error
    ///
    /// 2 = configuration or schema, 3 = authentication, 4 = table/data
    /// mismatch, 5 = anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            EmrError::Configuration(_) | EmrError::SchemaMismatch(_) | EmrError::NotFound(_) => 2,
            EmrError::Authentication(_) => 3,
            EmrError::AmbiguousTable(_) | EmrError::UnknownEntry { .. } => 4,
            EmrError::Csv(_) | EmrError::Serialization(_) | EmrError::Io(_) => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for EmrError {
    fn from(err: std::io::Error) -> Self {
        EmrError::Io(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for EmrError {
    fn from(err: csv::Error) -> Self {
        EmrError::Csv(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for EmrError {
    fn from(err: serde_json::Error) -> Self {
        EmrError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for EmrError {
    fn from(err: toml::de::Error) -> Self {
        EmrError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emr_error_display() {
        let err = EmrError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_unknown_entry_names_file_row_fields_and_tuple() {
        let err = EmrError::UnknownEntry {
            source_name: "labs.deid.csv".to_string(),
            row: 7,
            fields: vec!["First Name".to_string(), "PHN".to_string()],
            tuple: vec!["x9".to_string(), "y8".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("labs.deid.csv"));
        assert!(msg.contains("row 7"));
        assert!(msg.contains("\"First Name\""));
        assert!(msg.contains("\"PHN\""));
        assert!(msg.contains("\"x9\""));
        assert!(msg.contains("\"y8\""));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(EmrError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(EmrError::SchemaMismatch("x".into()).exit_code(), 2);
        assert_eq!(EmrError::Authentication("x".into()).exit_code(), 3);
        assert_eq!(EmrError::AmbiguousTable("x".into()).exit_code(), 4);
        assert_eq!(
            EmrError::UnknownEntry {
                source_name: "x.csv".into(),
                row: 1,
                fields: vec![],
                tuple: vec![]
            }
            .exit_code(),
            4
        );
        assert_eq!(EmrError::Io("x".into()).exit_code(), 5);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: EmrError = io_err.into();
        assert!(matches!(err, EmrError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: EmrError = json_err.into();
        assert!(matches!(err, EmrError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: EmrError = toml_err.into();
        assert!(matches!(err, EmrError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_emr_error_implements_std_error() {
        let err = EmrError::AmbiguousTable("dup".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
