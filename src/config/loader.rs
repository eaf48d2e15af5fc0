//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::EmrDeidConfig;
use super::secret::secret_string;
use crate::domain::{EmrError, EmrFormat, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into EmrDeidConfig
/// 4. Applies environment variable overrides (EMRDEID_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`EmrError::Configuration`] if the file is missing or cannot be
/// read, a referenced environment variable is unset, parsing fails, or the
/// result does not validate.
///
/// # Examples
///
/// ```no_run
/// use emrdeid::config::loader::load_config;
///
/// let config = load_config("emrdeid.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<EmrDeidConfig> {
    let mut config = parse_config(path)?;

    config.validate().map_err(|e| {
        EmrError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Reads, substitutes and parses a configuration file without validating it
///
/// Commands use this when CLI flags may still fill in or override values
/// before validation.
pub fn parse_config(path: impl AsRef<Path>) -> Result<EmrDeidConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EmrError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EmrError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: EmrDeidConfig = toml::from_str(&contents)
        .map_err(|e| EmrError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched so commented-out examples do not demand
/// variables that are not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EmrError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(EmrError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Splits a comma-separated override into trimmed, non-empty items
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses a boolean override, naming the variable on failure
fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(EmrError::Configuration(format!(
            "{var} must be true or false, got '{value}'"
        ))),
    }
}

/// Applies environment variable overrides using EMRDEID_* prefix
///
/// Environment variables follow the pattern: EMRDEID_<SECTION>_<KEY>
/// For example: EMRDEID_RUN_EMR_FORMAT, EMRDEID_TABLE_PASSWORD
fn apply_env_overrides(config: &mut EmrDeidConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("EMRDEID_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Run overrides
    if let Ok(val) = std::env::var("EMRDEID_RUN_EMR_FORMAT") {
        config.run.emr_format = val.parse::<EmrFormat>()?;
    }
    if let Ok(val) = std::env::var("EMRDEID_RUN_TARGET_FIELDS") {
        config.run.target_fields = split_list(&val);
    }
    if let Ok(val) = std::env::var("EMRDEID_RUN_RECOGNIZE_DATES") {
        config.run.recognize_dates = parse_bool("EMRDEID_RUN_RECOGNIZE_DATES", &val)?;
    }

    // Table overrides
    if let Ok(val) = std::env::var("EMRDEID_TABLE_SAVE_PATH") {
        config.table.save_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("EMRDEID_TABLE_LOAD_PATH") {
        config.table.load_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("EMRDEID_TABLE_PASSWORD") {
        config.table.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("EMRDEID_TABLE_OVERWRITE") {
        config.table.overwrite = parse_bool("EMRDEID_TABLE_OVERWRITE", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("EMRDEID_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("EMRDEID_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("EMRDEID_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("EMRDEID_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${EMRDEID_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("EMRDEID_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("EMRDEID_LOADER_MISSING_VAR");
        let input = "password = \"${EMRDEID_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${EMRDEID_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" First Name, PHN ,,"),
            vec!["First Name".to_string(), "PHN".to_string()]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", " YES ").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "False").unwrap());
        assert!(!parse_bool("X", "0").unwrap());

        let err = parse_bool("EMRDEID_RUN_RECOGNIZE_DATES", "sometimes").unwrap_err();
        assert!(matches!(err, EmrError::Configuration(_)));
        assert!(err.to_string().contains("EMRDEID_RUN_RECOGNIZE_DATES"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(EmrError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[run]
emr_format = "pss"
target_fields = ["First Name", "Last Name", "PHN"]
input_paths = ["visits.csv"]
output_paths = ["visits.deid.csv"]

[table]
save_path = "visits.table"
password = "not-a-real-password"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.run.emr_format, EmrFormat::Pss);
        assert_eq!(config.run.target_fields.len(), 3);
        assert_eq!(config.table.save_path, Some(PathBuf::from("visits.table")));
        assert!(!config.logging.local_enabled);
    }
}
