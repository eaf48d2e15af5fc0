// emrdeid - EMR export deidentification tool
// Copyright (c) 2025 emrdeid Contributors
// Licensed under the MIT License

use clap::Parser;
use emrdeid::cli::Cli;
use emrdeid::config::{parse_config, LoggingConfig};
use emrdeid::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (log_level, logging_config) = logging_settings(&cli);
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(e.exit_code());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "emrdeid - EMR export deidentification tool"
    );

    let exit_code = match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors, flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Log level and file logging from the config file when it is readable
///
/// A missing or broken config file falls back to console-only logging; the
/// command itself reports the problem.
fn logging_settings(cli: &Cli) -> (String, LoggingConfig) {
    let console_only = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };

    match parse_config(&cli.config) {
        Ok(config) => {
            let level = cli
                .log_level
                .clone()
                .unwrap_or(config.application.log_level);
            (level, config.logging)
        }
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            console_only,
        ),
    }
}
