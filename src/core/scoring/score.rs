//! Row counting and grouping by field value

use crate::adapters::csv_io::RowSource;
use crate::domain::{EmrError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rows of an export bucketed by the lower-cased value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "groups", rename_all = "snake_case")]
pub enum Score {
    /// Number of rows per key
    Count(BTreeMap<String, usize>),
    /// Values of the target field per key, in row order
    Grouped(BTreeMap<String, Vec<String>>),
}

impl Score {
    /// Size of the bucket for `key`; zero when the key is absent
    pub fn size(&self, key: &str) -> usize {
        match self {
            Score::Count(counts) => counts.get(key).copied().unwrap_or(0),
            Score::Grouped(groups) => groups.get(key).map_or(0, Vec::len),
        }
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Score::Count(counts) => counts.keys().map(String::as_str).collect(),
            Score::Grouped(groups) => groups.keys().map(String::as_str).collect(),
        }
    }

    /// Number of rows covered by the score
    pub fn total(&self) -> usize {
        match self {
            Score::Count(counts) => counts.values().sum(),
            Score::Grouped(groups) => groups.values().map(Vec::len).sum(),
        }
    }
}

/// Bucket the rows of `source` by the lower-cased value of `field`
///
/// Without `target_field` each bucket holds a row count. With it, each bucket
/// collects that field's values, e.g. the health numbers enrolled with each
/// provider.
///
/// # Errors
///
/// Returns [`EmrError::Configuration`] if `field` or `target_field` is not a
/// column of `source`.
pub fn calc_score(source: &RowSource, field: &str, target_field: Option<&str>) -> Result<Score> {
    let key_index = column(source, field)?;

    let score = match target_field {
        None => {
            let mut counts = BTreeMap::new();
            for row in source.rows() {
                let key = row.get(key_index).unwrap_or_default().to_lowercase();
                *counts.entry(key).or_insert(0) += 1;
            }
            Score::Count(counts)
        }
        Some(target_field) => {
            let value_index = column(source, target_field)?;
            let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for row in source.rows() {
                let key = row.get(key_index).unwrap_or_default().to_lowercase();
                let value = row.get(value_index).unwrap_or_default().to_string();
                groups.entry(key).or_default().push(value);
            }
            Score::Grouped(groups)
        }
    };

    tracing::debug!(
        source = %source.name(),
        field,
        target_field = target_field.unwrap_or(""),
        keys = score.keys().len(),
        rows = score.total(),
        "Scored source"
    );

    Ok(score)
}

fn column(source: &RowSource, name: &str) -> Result<usize> {
    source.column_index(name).ok_or_else(|| {
        EmrError::Configuration(format!(
            "field '{}' not found in {} (columns: [{}])",
            name,
            source.name(),
            source.headers().join(", ")
        ))
    })
}
