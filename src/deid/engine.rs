//! Deidentification engine
//!
//! The [`Deidentifier`] owns the identity table for the length of a run and
//! rewrites files one at a time. Every file in a run shares the table, so an
//! identity tuple that appears in several files gets the same synthetic tuple
//! everywhere.
//!
//! # Examples
//!
//! ```no_run
//! use emrdeid::deid::{ClassifierOptions, Deidentifier};
//! use emrdeid::domain::EmrFormat;
//! use std::path::PathBuf;
//!
//! # fn example() -> emrdeid::domain::Result<()> {
//! let fields = vec!["First Name".to_string(), "PHN".to_string()];
//! let mut engine = Deidentifier::new(fields, None, ClassifierOptions::default())?;
//!
//! let inputs = vec![PathBuf::from("visits.csv"), PathBuf::from("billing.csv")];
//! let outputs = vec![PathBuf::from("visits.deid.csv"), PathBuf::from("billing.deid.csv")];
//! let summary = engine.deidentify_files(&inputs, &outputs, EmrFormat::Accuro)?;
//! println!("{} rows rewritten", summary.total_rows());
//! # Ok(())
//! # }
//! ```

use super::classifier::{classify, ClassifierOptions};
use super::generator::generate;
use super::summary::{FileSummary, RunSummary};
use super::table::IdentityTable;
use super::Rewritten;
use crate::adapters::csv_io::{write_rows, Row, RowSource};
use crate::domain::{EmrError, EmrFormat, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Rewrites the target columns of EMR exports with synthetic values
pub struct Deidentifier {
    target_fields: Vec<String>,
    table: IdentityTable,
    rng: StdRng,
}

/// Outcome of deidentifying one source in memory
#[derive(Debug, Clone)]
pub struct Deidentified {
    /// Rewritten header and rows
    pub output: Rewritten,

    /// Identity tuples first seen in this source
    pub new_entries: usize,

    /// Rows whose identity tuple was already mapped
    pub reused_entries: usize,
}

impl Deidentifier {
    /// Create an engine for `target_fields`
    ///
    /// Pass a previously saved table to keep extending it; its fields must be
    /// exactly `target_fields` and its classifier options take precedence
    /// over `options`.
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] if `target_fields` is empty,
    /// repeats a field, or differs from the given table's fields.
    pub fn new(
        target_fields: Vec<String>,
        table: Option<IdentityTable>,
        options: ClassifierOptions,
    ) -> Result<Self> {
        Self::with_rng(target_fields, table, options, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with an explicit random source
    pub fn with_rng(
        target_fields: Vec<String>,
        table: Option<IdentityTable>,
        options: ClassifierOptions,
        rng: StdRng,
    ) -> Result<Self> {
        let table = match table {
            Some(table) => {
                table.ensure_fields(&target_fields)?;
                if table.options() != options {
                    tracing::warn!(
                        table_recognize_dates = table.options().recognize_dates,
                        requested_recognize_dates = options.recognize_dates,
                        "Classifier options differ from the loaded identity table, using the table's"
                    );
                }
                table
            }
            None => IdentityTable::new(target_fields.clone(), options)?,
        };

        Ok(Self {
            target_fields,
            table,
            rng,
        })
    }

    /// The identity table built so far
    pub fn table(&self) -> &IdentityTable {
        &self.table
    }

    /// Deidentify every row of `source`
    ///
    /// Non-target columns and column order are passed through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] naming the missing columns if any
    /// target field is not in the source header.
    pub fn deidentify(&mut self, source: &RowSource) -> Result<Deidentified> {
        let indices = self.target_indices(source)?;

        let options = self.table.options();
        let mut rows = Vec::with_capacity(source.rows().len());
        let mut new_entries = 0;
        let mut reused_entries = 0;

        for row in source.rows() {
            let identity = row.project(&indices);
            let rng = &mut self.rng;
            let (synthetic, created) = self.table.get_or_insert_with(identity, |identity| {
                identity
                    .iter()
                    .map(|value| generate(value, classify(value, options), &mut *rng))
                    .collect()
            })?;

            if created {
                new_entries += 1;
            } else {
                reused_entries += 1;
            }

            let mut rewritten: Row = row.clone();
            for (&index, value) in indices.iter().zip(synthetic.iter()) {
                rewritten.set(index, value.clone());
            }
            rows.push(rewritten);
        }

        tracing::debug!(
            source = %source.name(),
            rows = rows.len(),
            new_entries,
            reused_entries,
            "Deidentified source"
        );

        Ok(Deidentified {
            output: Rewritten {
                headers: source.headers().to_vec(),
                rows,
            },
            new_entries,
            reused_entries,
        })
    }

    /// Deidentify one file and write the result
    ///
    /// Output is written atomically; on error nothing is left at `output`.
    pub fn deidentify_file(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        format: EmrFormat,
    ) -> Result<FileSummary> {
        let input = input.as_ref();
        let output = output.as_ref();

        let source = RowSource::open(input, format)?;
        self.write_deidentified(&source, input, output)
    }

    fn write_deidentified(
        &mut self,
        source: &RowSource,
        input: &Path,
        output: &Path,
    ) -> Result<FileSummary> {
        let result = self.deidentify(source)?;
        self.table.invert()?;
        write_rows(output, &result.output.headers, &result.output.rows)?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            rows = result.output.rows.len(),
            new_entries = result.new_entries,
            "Deidentified file"
        );

        Ok(FileSummary {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            rows: result.output.rows.len(),
            new_entries: result.new_entries,
            reused_entries: result.reused_entries,
        })
    }

    /// Deidentify each input into the output at the same position
    ///
    /// All files share this engine's identity table. Every input is read and
    /// rewritten in memory before the first output is written, so a missing
    /// file or column leaves no output behind.
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] if the path lists differ in length
    /// or are empty, or if any file lacks a target field, and
    /// [`EmrError::AmbiguousTable`] if the table could not be inverted.
    pub fn deidentify_files(
        &mut self,
        inputs: &[PathBuf],
        outputs: &[PathBuf],
        format: EmrFormat,
    ) -> Result<RunSummary> {
        self.prepare_files(inputs, outputs, format)?.commit()
    }

    /// Rewrite every input in memory without writing any output
    ///
    /// The identity table is extended as a side effect, so it can be saved
    /// before [`PreparedRun::commit`] writes the outputs. Fails with
    /// [`EmrError::AmbiguousTable`] when two identities ended up with the same
    /// synthetic tuple, which would make the outputs irreversible.
    pub fn prepare_files(
        &mut self,
        inputs: &[PathBuf],
        outputs: &[PathBuf],
        format: EmrFormat,
    ) -> Result<PreparedRun> {
        check_paths(inputs, outputs)?;

        let start = Instant::now();

        let mut sources = Vec::with_capacity(inputs.len());
        for input in inputs {
            let source = RowSource::open(input, format)?;
            self.target_indices(&source)?;
            sources.push(source);
        }

        let mut files = Vec::with_capacity(sources.len());
        for ((source, input), output) in sources.iter().zip(inputs).zip(outputs) {
            files.push(PreparedFile {
                input: input.clone(),
                output: output.clone(),
                result: self.deidentify(source)?,
            });
        }

        self.table.invert()?;

        Ok(PreparedRun {
            files,
            table_entries: self.table.len(),
            start,
        })
    }
}

struct PreparedFile {
    input: PathBuf,
    output: PathBuf,
    result: Deidentified,
}

/// Deidentified files held in memory until committed
pub struct PreparedRun {
    files: Vec<PreparedFile>,
    table_entries: usize,
    start: Instant,
}

impl PreparedRun {
    /// Number of files waiting to be written
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every output atomically and summarize the run
    pub fn commit(self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();

        for file in self.files {
            let output = &file.result.output;
            output.write_to(&file.output)?;

            tracing::info!(
                input = %file.input.display(),
                output = %file.output.display(),
                rows = output.rows.len(),
                new_entries = file.result.new_entries,
                "Deidentified file"
            );

            summary.add_file(FileSummary {
                rows: output.rows.len(),
                new_entries: file.result.new_entries,
                reused_entries: file.result.reused_entries,
                input: file.input,
                output: file.output,
            });
        }

        summary.table_entries = self.table_entries;
        let summary = summary.with_duration(self.start.elapsed());

        tracing::info!(
            files = summary.files.len(),
            rows = summary.total_rows(),
            new_entries = summary.new_entries(),
            table_entries = summary.table_entries,
            duration_ms = summary.duration.as_millis() as u64,
            "Deidentification run completed"
        );

        Ok(summary)
    }
}

impl Deidentifier {
    fn target_indices(&self, source: &RowSource) -> Result<Vec<usize>> {
        source.column_indices(&self.target_fields).map_err(|missing| {
            EmrError::Configuration(format!(
                "target field(s) [{}] not found in {} (columns: [{}])",
                missing.join(", "),
                source.name(),
                source.headers().join(", ")
            ))
        })
    }
}

/// Validate paired input/output path lists
pub(crate) fn check_paths(inputs: &[PathBuf], outputs: &[PathBuf]) -> Result<()> {
    if inputs.is_empty() {
        return Err(EmrError::Configuration(
            "at least one input file is required".to_string(),
        ));
    }
    if inputs.len() != outputs.len() {
        return Err(EmrError::Configuration(format!(
            "{} input file(s) but {} output file(s); every input needs one output",
            inputs.len(),
            outputs.len()
        )));
    }
    Ok(())
}
