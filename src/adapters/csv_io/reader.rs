//! Dialect-aware CSV row source
//!
//! Reads an EMR export fully into memory and exposes it as a header plus rows
//! of values in header order.

use crate::domain::{EmrError, EmrFormat, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One record of an export, values in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    /// Create a row from values already in header order
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Value at a column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// All values in header order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Replace the value at a column index
    pub fn set(&mut self, index: usize, value: String) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Pick the values at the given column indices, in that order
    pub fn project(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or_default())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

/// Rows of one EMR export together with its header
#[derive(Debug, Clone)]
pub struct RowSource {
    name: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl RowSource {
    /// Open and read an export file
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::NotFound`] if `path` does not exist and
    /// [`EmrError::Csv`] if a record's width differs from the header's.
    pub fn open(path: impl AsRef<Path>, format: EmrFormat) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EmrError::NotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| {
            EmrError::Io(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let source = Self::from_reader(file, format, path.display().to_string())?;

        tracing::debug!(
            path = %path.display(),
            format = %format,
            columns = source.headers.len(),
            rows = source.rows.len(),
            "Read export file"
        );

        Ok(source)
    }

    /// Read an export from any reader, `name` is used in error messages
    pub fn from_reader<R: Read>(reader: R, format: EmrFormat, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut reader = BufReader::new(reader);

        for _ in 0..format.leading_lines() {
            let mut discarded = String::new();
            reader.read_line(&mut discarded)?;
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| EmrError::Csv(format!("{name}: failed to read header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record =
                record.map_err(|e| EmrError::Csv(format!("{name}: row {}: {e}", i + 1)))?;
            rows.push(Row::new(record.iter().map(str::to_string).collect()));
        }

        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    /// Name of the source (the file path for opened files)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Position of a column in the header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve column names to indices, collecting the names that are missing
    pub fn column_indices(&self, names: &[String]) -> std::result::Result<Vec<usize>, Vec<String>> {
        let mut indices = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(i) => indices.push(i),
                None => missing.push(name.clone()),
            }
        }
        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_accuro_header_is_first_line() {
        let data = "name,phn\nAda,123\nBob,456\n";
        let source = RowSource::from_reader(data.as_bytes(), EmrFormat::Accuro, "mem").unwrap();
        assert_eq!(source.headers(), &["name".to_string(), "phn".to_string()]);
        assert_eq!(source.rows().len(), 2);
        assert_eq!(source.rows()[1].get(1), Some("456"));
    }

    #[test]
    fn test_pss_skips_leading_line() {
        let data = "\nname,phn\nAda,123\n";
        let source = RowSource::from_reader(data.as_bytes(), EmrFormat::Pss, "mem").unwrap();
        assert_eq!(source.headers(), &["name".to_string(), "phn".to_string()]);
        assert_eq!(source.rows().len(), 1);
    }

    #[test]
    fn test_pss_skips_non_blank_leading_line() {
        let data = "Report generated 2016-12-20\nname,phn\nAda,123\n";
        let source = RowSource::from_reader(data.as_bytes(), EmrFormat::Pss, "mem").unwrap();
        assert_eq!(source.headers()[0], "name");
    }

    #[test]
    fn test_quoted_fields() {
        let data = "name,address\n\"Doe, Jane\",\"1 Main St\"\n";
        let source = RowSource::from_reader(data.as_bytes(), EmrFormat::Accuro, "mem").unwrap();
        assert_eq!(source.rows()[0].get(0), Some("Doe, Jane"));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let data = "name,phn\nAda\n";
        let err = RowSource::from_reader(data.as_bytes(), EmrFormat::Accuro, "mem").unwrap_err();
        assert!(matches!(err, EmrError::Csv(_)));
    }

    #[test]
    fn test_column_indices_reports_missing() {
        let data = "name,dob\nAda,1/2/1950\n";
        let source = RowSource::from_reader(data.as_bytes(), EmrFormat::Accuro, "mem").unwrap();
        let missing = source
            .column_indices(&["phn".to_string(), "name".to_string()])
            .unwrap_err();
        assert_eq!(missing, vec!["phn".to_string()]);
        assert_eq!(
            source
                .column_indices(&["dob".to_string(), "name".to_string()])
                .unwrap(),
            vec![1, 0]
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = RowSource::open("/nonexistent/export.csv", EmrFormat::Accuro).unwrap_err();
        assert!(matches!(err, EmrError::NotFound(_)));
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"name,phn\nAda,123\n").unwrap();
        file.flush().unwrap();

        let source = RowSource::open(file.path(), EmrFormat::Accuro).unwrap();
        assert_eq!(source.rows().len(), 1);
        assert!(source.name().ends_with(&*file.path().file_name().unwrap().to_string_lossy()));
    }

    #[test]
    fn test_row_project_and_set() {
        let mut row = Row::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(row.project(&[2, 0]), vec!["c".to_string(), "a".to_string()]);
        row.set(1, "z".to_string());
        assert_eq!(row.get(1), Some("z"));
        assert_eq!(row.len(), 3);
    }
}
