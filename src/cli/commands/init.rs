//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "emrdeid.toml")]
    pub output: String,

    /// Include explanatory comments for every setting
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing emrdeid configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match crate::adapters::csv_io::write_bytes(&self.output, config_content.as_bytes()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your files and identifying columns", self.output);
                println!("  2. Put the table password in a .env file:");
                println!("     EMRDEID_TABLE_PASSWORD=...");
                println!("  3. Validate configuration: emrdeid validate-config");
                println!("  4. Run: emrdeid deidentify");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# emrdeid configuration

[application]
log_level = "info"

[run]
emr_format = "accuro"  # accuro | pss
target_fields = ["First Name", "Last Name", "PHN", "Birth Date"]
input_paths = ["visits.csv"]
output_paths = ["visits.deid.csv"]
recognize_dates = false

[table]
save_path = "identity.table"
password = "${EMRDEID_TABLE_PASSWORD}"
overwrite = false

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# emrdeid configuration
#
# Deidentifies identifying columns of EMR CSV exports, keeps the mapping in a
# password-encrypted identity table, and can later restore the originals.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Run Settings
# ============================================================================
[run]
# EMR export format of the input files
# - accuro (or a): the header is the first line
# - pss (or b): one leading line precedes the header and is skipped
emr_format = "accuro"

# Identifying columns. Order matters: it is the tuple order stored in the
# identity table, and a table can only be reused with the same list.
target_fields = ["First Name", "Last Name", "PHN", "Birth Date"]

# Input files and their outputs, paired by position. All files in one run
# share one identity table, so a patient gets the same synthetic values in
# every file.
input_paths = ["visits.csv", "labs.csv"]
output_paths = ["visits.deid.csv", "labs.deid.csv"]

# Reduce M/D/YYYY values in target columns to the year instead of replacing
# them with random letters. Recorded in the table; a reused table keeps its
# own setting.
recognize_dates = false

# ============================================================================
# Identity Table
# ============================================================================
[table]
# Where to save the encrypted identity table. Without it the mapping is
# discarded and the outputs cannot be reidentified.
save_path = "identity.table"

# Existing table to extend (deidentify) or invert (reidentify)
# load_path = "identity.table"

# Password for the table (use an environment variable)
password = "${EMRDEID_TABLE_PASSWORD}"

# Replace an existing table at save_path without asking
overwrite = false

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Write JSON log lines to files as well as the console
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}
