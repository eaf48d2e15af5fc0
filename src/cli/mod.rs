//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for emrdeid using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// emrdeid - EMR export deidentification tool
#[derive(Parser, Debug)]
#[command(name = "emrdeid")]
#[command(version, about, long_about = None)]
#[command(author = "emrdeid Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "emrdeid.toml", env = "EMRDEID_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EMRDEID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace identifying columns with synthetic values
    Deidentify(commands::deidentify::DeidentifyArgs),

    /// Restore original values using a saved identity table
    Reidentify(commands::reidentify::ReidentifyArgs),

    /// Per-provider ratio between two exports
    Score(commands::score::ScoreArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Run the selected command, returning the process exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Deidentify(args) => args.execute(&self.config),
            Commands::Reidentify(args) => args.execute(&self.config),
            Commands::Score(args) => args.execute(),
            Commands::ValidateConfig(args) => args.execute(&self.config),
            Commands::Init(args) => args.execute(),
        }
    }
}
