//! EMR export dialects
//!
//! Two EMR systems produce the CSV exports this tool reads. They share the
//! CSV grammar but PSS writes one line ahead of the header row.

use super::errors::EmrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EMR export dialect of an input file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmrFormat {
    /// Accuro exports ("format A"): the header is the first line
    #[default]
    #[serde(alias = "a", alias = "A")]
    Accuro,
    /// PSS exports ("format B"): one leading line precedes the header
    #[serde(alias = "b", alias = "B")]
    Pss,
}

impl EmrFormat {
    /// Number of lines to discard before the header row
    pub fn leading_lines(&self) -> usize {
        match self {
            EmrFormat::Accuro => 0,
            EmrFormat::Pss => 1,
        }
    }

    /// Lowercase name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            EmrFormat::Accuro => "accuro",
            EmrFormat::Pss => "pss",
        }
    }
}

impl fmt::Display for EmrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmrFormat {
    type Err = EmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accuro" | "a" => Ok(EmrFormat::Accuro),
            "pss" | "b" => Ok(EmrFormat::Pss),
            other => Err(EmrError::Configuration(format!(
                "Invalid emr_format '{other}'. Must be one of: accuro (a), pss (b)"
            ))),
        }
    }
}
