//! Run summaries for deidentification and reidentification
//!
//! Summaries carry counts and paths only, never cell values, so they can be
//! printed and logged freely.

use std::path::PathBuf;
use std::time::Duration;

/// Result of rewriting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Input file
    pub input: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// Data rows rewritten
    pub rows: usize,

    /// Identity tuples first seen in this file
    pub new_entries: usize,

    /// Rows whose identity tuple was already in the table
    pub reused_entries: usize,
}

/// Result of a multi-file run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-file results in processing order
    pub files: Vec<FileSummary>,

    /// Entries in the identity table at the end of the run
    pub table_entries: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            table_entries: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a finished file
    pub fn add_file(&mut self, file: FileSummary) {
        self.files.push(file);
    }

    /// Rows rewritten across all files
    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }

    /// Identity tuples added to the table during this run
    pub fn new_entries(&self) -> usize {
        self.files.iter().map(|f| f.new_entries).sum()
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
