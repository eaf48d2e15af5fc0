//! Score command implementation
//!
//! Buckets two exports by a provider field and prints the per-provider ratio
//! of numerator rows to denominator rows. Does not read the config file.

use super::report;
use crate::adapters::csv_io::RowSource;
use crate::core::scoring::{calc_score, summarize, RatioLine};
use crate::domain::{EmrFormat, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the score command
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Export whose rows make up the numerator (e.g. patients meeting a measure)
    #[arg(long, value_name = "PATH")]
    pub numerator: PathBuf,

    /// Export whose rows make up the denominator (e.g. all enrolled patients)
    #[arg(long, value_name = "PATH")]
    pub denominator: PathBuf,

    /// Column to bucket by
    #[arg(long, default_value = "Enrolled Provider Last Name")]
    pub field: String,

    /// Collect this column per bucket in the numerator instead of counting rows
    #[arg(long, value_name = "COLUMN")]
    pub numerator_target: Option<String>,

    /// Collect this column per bucket in the denominator instead of counting rows
    #[arg(long, value_name = "COLUMN")]
    pub denominator_target: Option<String>,

    /// EMR export format of both files
    #[arg(long, value_name = "FORMAT", default_value = "accuro")]
    pub format: EmrFormat,

    /// Print the ratio lines as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScoreArgs {
    /// Execute the score command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(field = %self.field, "Starting score command");

        let lines = match self.lines() {
            Ok(lines) => lines,
            Err(e) => return Ok(report(&e, "Scoring failed")),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&lines)?);
        } else {
            for line in &lines {
                println!("{line}");
            }
        }

        Ok(0)
    }

    fn lines(&self) -> Result<Vec<RatioLine>> {
        let numerator = RowSource::open(&self.numerator, self.format)?;
        let denominator = RowSource::open(&self.denominator, self.format)?;

        let numerator = calc_score(&numerator, &self.field, self.numerator_target.as_deref())?;
        let denominator =
            calc_score(&denominator, &self.field, self.denominator_target.as_deref())?;

        tracing::info!(
            numerator_total = numerator.total(),
            denominator_total = denominator.total(),
            "Scores calculated"
        );

        Ok(summarize(&numerator, &denominator))
    }
}
