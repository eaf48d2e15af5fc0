//! Deidentify command implementation
//!
//! Rewrites the configured input files with synthetic identifying values and
//! saves the identity table encrypted when a save path is configured.

use super::{confirm, load_unvalidated, report, table_password, RunArgs};
use crate::config::EmrDeidConfig;
use crate::deid::{Deidentifier, IdentityTable, TableStore};
use crate::domain::Result;
use crate::{log_run_complete, log_run_start};
use clap::Args;
use std::io;
use std::path::PathBuf;

/// Arguments for the deidentify command
#[derive(Args, Debug, Default)]
pub struct DeidentifyArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Save the identity table to this path (overrides table.save_path)
    #[arg(long, value_name = "PATH")]
    pub save_table: Option<PathBuf>,

    /// Extend an existing identity table (overrides table.load_path)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Recognize M/D/YYYY dates and reduce them to the year
    #[arg(long)]
    pub recognize_dates: bool,

    /// Replace an existing saved table without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl DeidentifyArgs {
    /// Execute the deidentify command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting deidentify command");

        let mut config = match load_unvalidated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        self.apply(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        // Confirm the overwrite before any output is written
        if let Some(path) = &config.table.save_path {
            if path.exists() && !config.table.overwrite && !extends_in_place(&config) {
                let question = format!("Identity table {} exists. Overwrite?", path.display());
                let stdin = io::stdin();
                if !confirm(&question, &mut stdin.lock(), &mut io::stdout())? {
                    println!("Deidentification cancelled.");
                    return Ok(0);
                }
                config.table.overwrite = true;
            }
        }

        if config.table.save_path.is_none() {
            tracing::warn!("No table.save_path configured, the identity table will be discarded");
            println!("⚠️  No table save path set: these outputs cannot be reidentified later.");
        }

        match run(&config, &TableStore::new()) {
            Ok(code) => Ok(code),
            Err(e) => Ok(report(&e, "Deidentification failed")),
        }
    }

    fn apply(&self, config: &mut EmrDeidConfig) {
        self.run.apply(config);

        if let Some(path) = &self.save_table {
            tracing::info!(path = %path.display(), "Overriding table save path from CLI");
            config.table.save_path = Some(path.clone());
        }
        if let Some(path) = &self.table {
            tracing::info!(path = %path.display(), "Overriding table load path from CLI");
            config.table.load_path = Some(path.clone());
        }
        if self.recognize_dates {
            config.run.recognize_dates = true;
        }
        if self.yes {
            config.table.overwrite = true;
        }
    }
}

/// True when the run reloads and re-saves the same table file
fn extends_in_place(config: &EmrDeidConfig) -> bool {
    match (&config.table.load_path, &config.table.save_path) {
        (Some(load), Some(save)) => load == save,
        _ => false,
    }
}

/// Deidentify with a validated configuration
///
/// Outputs are rewritten in memory, the table is saved, and only then are
/// the outputs written. A table that cannot be saved leaves no outputs.
fn run(config: &EmrDeidConfig, store: &TableStore) -> Result<i32> {
    let password = match (&config.table.load_path, &config.table.save_path) {
        (None, None) => None,
        _ => Some(table_password(config)?),
    };

    let table: Option<IdentityTable> = match (&config.table.load_path, password) {
        (Some(path), Some(password)) => {
            let table = store.load(path, password)?;
            println!(
                "🔑 Loaded identity table {} ({} entries)",
                path.display(),
                table.len()
            );
            Some(table)
        }
        _ => None,
    };

    log_run_start!(
        "deidentify",
        config.run.input_paths.len(),
        &config.run.target_fields
    );

    let mut engine = Deidentifier::new(
        config.run.target_fields.clone(),
        table,
        config.run.classifier_options(),
    )?;

    let prepared = engine.prepare_files(
        &config.run.input_paths,
        &config.run.output_paths,
        config.run.emr_format,
    )?;

    if let (Some(path), Some(password)) = (&config.table.save_path, password) {
        let overwrite = config.table.overwrite || extends_in_place(config);
        store.save(engine.table(), path, password, overwrite)?;
        println!("🔒 Saved identity table: {}", path.display());
    }

    let summary = prepared.commit()?;

    log_run_complete!("deidentify", summary.total_rows(), summary.duration);

    println!();
    println!("📊 Deidentification Summary:");
    for file in &summary.files {
        println!(
            "  {} -> {}: {} rows ({} new, {} reused)",
            file.input.display(),
            file.output.display(),
            file.rows,
            file.new_entries,
            file.reused_entries
        );
    }
    println!("  Total Rows: {}", summary.total_rows());
    println!("  Table Entries: {}", summary.table_entries);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
    println!("✅ Deidentification completed successfully!");

    Ok(0)
}
