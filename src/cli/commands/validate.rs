//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the emrdeid configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also check that every input file exists
    #[arg(long)]
    pub check_files: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(e.exit_code());
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  EMR Format: {}", config.run.emr_format);
        println!("  Target Fields: {:?}", config.run.target_fields);
        println!("  Recognize Dates: {}", config.run.recognize_dates);
        for (input, output) in config.run.input_paths.iter().zip(&config.run.output_paths) {
            println!("  File: {} -> {}", input.display(), output.display());
        }
        match &config.table.save_path {
            Some(path) => println!("  Table Save Path: {}", path.display()),
            None => println!("  Table Save Path: (none, table is discarded)"),
        }
        if let Some(path) = &config.table.load_path {
            println!("  Table Load Path: {}", path.display());
        }
        println!(
            "  Table Password: {}",
            if config.table.password.is_some() {
                "set"
            } else {
                "not set"
            }
        );
        println!();

        if self.check_files {
            let missing: Vec<_> = config
                .run
                .input_paths
                .iter()
                .filter(|p| !p.exists())
                .collect();
            if !missing.is_empty() {
                for path in &missing {
                    println!("❌ Input file not found: {}", path.display());
                }
                return Ok(2);
            }
            println!("✅ All input files exist");
        }

        Ok(0)
    }
}
