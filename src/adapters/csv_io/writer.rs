//! Atomic output writers
//!
//! Output is staged in a temporary file next to the destination and renamed
//! into place only once everything has been written and flushed. A run that
//! aborts half way leaves no file at the destination.

use super::reader::Row;
use crate::domain::{EmrError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write a header and rows to `path` as CSV with `\n` line terminators
pub fn write_rows(path: impl AsRef<Path>, headers: &[String], rows: &[Row]) -> Result<()> {
    let path = path.as_ref();
    let mut staged = stage_for(path)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut staged);

        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row.values())?;
        }
        writer.flush()?;
    }

    commit(staged, path)?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote CSV output");
    Ok(())
}

/// Write raw bytes to `path`
pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut staged = stage_for(path)?;
    staged.write_all(bytes)?;
    commit(staged, path)
}

fn stage_for(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    NamedTempFile::new_in(dir).map_err(|e| {
        EmrError::Io(format!(
            "Failed to create temporary file in {}: {}",
            dir.display(),
            e
        ))
    })
}

fn commit(mut staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|e| EmrError::Io(format!("Failed to write {}: {}", path.display(), e.error)))?;
    Ok(())
}
