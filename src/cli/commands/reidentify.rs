//! Reidentify command implementation
//!
//! Restores original values in deidentified files using a saved identity
//! table. By default the files named in `run.output_paths` are read and each
//! is restored next to itself with a `.reid` suffix.

use super::{load_unvalidated, report, table_password};
use crate::config::EmrDeidConfig;
use crate::deid::{Reidentifier, TableStore};
use crate::domain::{EmrError, EmrFormat, Result};
use crate::{log_run_complete, log_run_start};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the reidentify command
#[derive(Args, Debug, Default)]
pub struct ReidentifyArgs {
    /// Identity table to invert (defaults to table.load_path, then table.save_path)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Deidentified file (repeatable, defaults to run.output_paths)
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Restored file for the input at the same position (repeatable)
    #[arg(short, long = "output", value_name = "PATH")]
    pub outputs: Vec<PathBuf>,

    /// Format of the deidentified files; written outputs carry no leading line
    #[arg(long, value_name = "FORMAT", default_value = "accuro")]
    pub format: EmrFormat,
}

/// A fully resolved reidentification job
#[derive(Debug, PartialEq)]
struct Plan {
    table: PathBuf,
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
}

impl ReidentifyArgs {
    /// Execute the reidentify command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting reidentify command");

        let config = match load_unvalidated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match self.plan(&config).and_then(|plan| self.run(&config, &plan)) {
            Ok(code) => Ok(code),
            Err(e) => Ok(report(&e, "Reidentification failed")),
        }
    }

    fn plan(&self, config: &EmrDeidConfig) -> Result<Plan> {
        let table = self
            .table
            .clone()
            .or_else(|| config.table.load_path.clone())
            .or_else(|| config.table.save_path.clone())
            .ok_or_else(|| {
                EmrError::Configuration(
                    "no identity table given (--table, table.load_path or table.save_path)"
                        .to_string(),
                )
            })?;

        let inputs = if self.inputs.is_empty() {
            config.run.output_paths.clone()
        } else {
            self.inputs.clone()
        };

        let outputs = if self.outputs.is_empty() {
            inputs.iter().map(|p| restored_path(p)).collect()
        } else {
            self.outputs.clone()
        };

        if let Some(clash) = outputs.iter().find(|o| inputs.contains(o)) {
            return Err(EmrError::Configuration(format!(
                "output {} would overwrite an input file",
                clash.display()
            )));
        }

        Ok(Plan {
            table,
            inputs,
            outputs,
        })
    }

    fn run(&self, config: &EmrDeidConfig, plan: &Plan) -> Result<i32> {
        let password = table_password(config)?;
        let table = TableStore::new().load(&plan.table, password)?;
        println!(
            "🔑 Loaded identity table {} ({} entries)",
            plan.table.display(),
            table.len()
        );

        log_run_start!("reidentify", plan.inputs.len(), table.fields());

        let engine = Reidentifier::new(&table)?;
        let summary = engine.reidentify_files(&plan.inputs, &plan.outputs, self.format)?;

        log_run_complete!("reidentify", summary.total_rows(), summary.duration);

        println!();
        println!("📊 Reidentification Summary:");
        for file in &summary.files {
            println!(
                "  {} -> {}: {} rows",
                file.input.display(),
                file.output.display(),
                file.rows
            );
        }
        println!("  Total Rows: {}", summary.total_rows());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        println!("✅ Reidentification completed successfully!");

        Ok(0)
    }
}

/// `visits.deid.csv` -> `visits.deid.reid.csv`
fn restored_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}.reid.{}", ext.to_string_lossy()),
        None => format!("{stem}.reid"),
    };
    input.with_file_name(name)
}
