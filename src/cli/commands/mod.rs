//! CLI command implementations
//!
//! This module contains all CLI command implementations plus the pieces they
//! share: run overrides, error reporting and the yes/no prompt.

pub mod deidentify;
pub mod init;
pub mod reidentify;
pub mod score;
pub mod validate;

use crate::config::{parse_config, EmrDeidConfig, SecretString};
use crate::domain::{EmrError, EmrFormat};
use crate::{log_error_with_context, log_prompt_retry};
use clap::Args;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Answers accepted before a prompt gives up and assumes "no"
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Overrides for the `[run]` section shared by deidentify and reidentify
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// EMR export format of the input files (accuro / a, pss / b)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<EmrFormat>,

    /// Identifying columns, comma-separated, in tuple order
    #[arg(long, value_name = "FIELDS", value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Input file (repeatable)
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output file for the input at the same position (repeatable)
    #[arg(short, long = "output", value_name = "PATH")]
    pub outputs: Vec<PathBuf>,
}

impl RunArgs {
    /// Apply the overrides that were given on the command line
    pub fn apply(&self, config: &mut EmrDeidConfig) {
        if let Some(format) = self.format {
            tracing::info!(format = %format, "Overriding EMR format from CLI");
            config.run.emr_format = format;
        }

        if let Some(fields) = &self.fields {
            let fields: Vec<String> = fields
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            tracing::info!(fields = ?fields, "Overriding target fields from CLI");
            config.run.target_fields = fields;
        }

        if !self.inputs.is_empty() {
            tracing::info!(count = self.inputs.len(), "Overriding input paths from CLI");
            config.run.input_paths = self.inputs.clone();
        }

        if !self.outputs.is_empty() {
            tracing::info!(count = self.outputs.len(), "Overriding output paths from CLI");
            config.run.output_paths = self.outputs.clone();
        }
    }
}

/// Load the configuration file without validating it
///
/// Returns the exit code to stop with if the file is unusable.
pub(crate) fn load_unvalidated(config_path: &str) -> Result<EmrDeidConfig, i32> {
    parse_config(config_path).map_err(|e| report(&e, "Failed to load configuration"))
}

/// Print and log `error`, returning its exit code
pub(crate) fn report(error: &EmrError, context: &str) -> i32 {
    log_error_with_context!(error, context);
    eprintln!("❌ {context}");
    eprintln!("   Error: {error}");
    error.exit_code()
}

/// Table password from configuration or `EMRDEID_TABLE_PASSWORD`
pub(crate) fn table_password(config: &EmrDeidConfig) -> Result<&SecretString, EmrError> {
    config.table.password.as_ref().ok_or_else(|| {
        EmrError::Configuration(
            "table.password is not set (config file or EMRDEID_TABLE_PASSWORD)".to_string(),
        )
    })
}

/// Ask a yes/no question on `output`, reading answers from `input`
///
/// An empty or unrecognised answer is asked again, up to
/// [`MAX_PROMPT_ATTEMPTS`] times, after which the answer is "no". End of
/// input also counts as "no".
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    for attempt in 1..=MAX_PROMPT_ATTEMPTS {
        write!(output, "{question} [y/N]: ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                log_prompt_retry!(attempt, MAX_PROMPT_ATTEMPTS, "expected y or n");
                writeln!(output, "Please answer y or n.")?;
            }
        }
    }
    Ok(false)
}
