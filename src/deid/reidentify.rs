//! Reidentification engine
//!
//! Reverses a deidentification run using the identity table it produced.
//! Matching is strict: every row must resolve, and a table that cannot be
//! inverted unambiguously is rejected before any row is touched.

use super::engine::check_paths;
use super::summary::{FileSummary, RunSummary};
use super::table::IdentityTable;
use super::Rewritten;
use crate::adapters::csv_io::{write_rows, RowSource};
use crate::domain::{EmrError, EmrFormat, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Restores original values from synthetic ones
pub struct Reidentifier<'a> {
    table: &'a IdentityTable,
    inverted: HashMap<&'a [String], &'a [String]>,
}

impl<'a> Reidentifier<'a> {
    /// Invert `table` for lookups
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::AmbiguousTable`] if two identity tuples share a
    /// synthetic tuple.
    pub fn new(table: &'a IdentityTable) -> Result<Self> {
        let inverted = table.invert()?;
        Ok(Self { table, inverted })
    }

    /// Rewrite every row of `source` back to its original values
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::SchemaMismatch`] if a table field is not a column
    /// of `source`, and [`EmrError::UnknownEntry`] for the first row whose
    /// synthetic tuple is not in the table.
    pub fn reidentify(&self, source: &RowSource) -> Result<Rewritten> {
        let fields = self.table.fields();
        let indices = source.column_indices(fields).map_err(|missing| {
            EmrError::SchemaMismatch(format!(
                "identity table field(s) [{}] not found in {} (columns: [{}])",
                missing.join(", "),
                source.name(),
                source.headers().join(", ")
            ))
        })?;

        let mut rows = Vec::with_capacity(source.rows().len());
        for (i, row) in source.rows().iter().enumerate() {
            let synthetic = row.project(&indices);
            let identity = self
                .inverted
                .get(synthetic.as_slice())
                .ok_or_else(|| EmrError::UnknownEntry {
                    source_name: source.name().to_string(),
                    row: i + 1,
                    fields: fields.to_vec(),
                    tuple: synthetic.clone(),
                })?;

            let mut restored = row.clone();
            for (&index, value) in indices.iter().zip(identity.iter()) {
                restored.set(index, value.clone());
            }
            rows.push(restored);
        }

        tracing::debug!(source = %source.name(), rows = rows.len(), "Reidentified source");

        Ok(Rewritten {
            headers: source.headers().to_vec(),
            rows,
        })
    }

    /// Reidentify one file and write the result atomically
    pub fn reidentify_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        format: EmrFormat,
    ) -> Result<FileSummary> {
        let input = input.as_ref();
        let output = output.as_ref();

        let source = RowSource::open(input, format)?;
        let restored = self.reidentify(&source)?;
        write_rows(output, &restored.headers, &restored.rows)?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            rows = restored.rows.len(),
            "Reidentified file"
        );

        Ok(FileSummary {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            rows: restored.rows.len(),
            new_entries: 0,
            reused_entries: restored.rows.len(),
        })
    }

    /// Reidentify each input into the output at the same position
    ///
    /// Every input is read and fully resolved before the first output is
    /// written, so an unknown entry in any file leaves no output behind.
    pub fn reidentify_files(
        &self,
        inputs: &[PathBuf],
        outputs: &[PathBuf],
        format: EmrFormat,
    ) -> Result<RunSummary> {
        check_paths(inputs, outputs)?;

        let start = Instant::now();
        let mut restored = Vec::with_capacity(inputs.len());
        for input in inputs {
            let source = RowSource::open(input, format)?;
            restored.push(self.reidentify(&source)?);
        }

        let mut summary = RunSummary::new();
        for ((rewritten, input), output) in restored.iter().zip(inputs).zip(outputs) {
            rewritten.write_to(output)?;
            tracing::info!(
                input = %input.display(),
                output = %output.display(),
                rows = rewritten.rows.len(),
                "Reidentified file"
            );
            summary.add_file(FileSummary {
                input: input.clone(),
                output: output.clone(),
                rows: rewritten.rows.len(),
                new_entries: 0,
                reused_entries: rewritten.rows.len(),
            });
        }

        summary.table_entries = self.table.len();
        Ok(summary.with_duration(start.elapsed()))
    }
}
