//! Deidentification and reidentification of EMR exports
//!
//! Identifying columns are replaced with random values of the same length and
//! character class. The replacement for each distinct combination of
//! identifying values (the identity tuple) is recorded in an
//! [`IdentityTable`], which keeps substitutions consistent across files and
//! can be saved under a password to reverse the process later.
//!
//! # Architecture
//!
//! - **Classifier**: decides numeric / alpha / alnum / date per value
//! - **Generator**: draws a replacement from the class alphabet
//! - **Table**: identity tuple to synthetic tuple, insert-only
//! - **Engine**: [`Deidentifier`] rewrites files through the table
//! - **Store**: [`TableStore`] seals tables with Argon2id + ChaCha20-Poly1305
//! - **Reidentify**: [`Reidentifier`] inverts a table and restores files
//!
//! # Usage
//!
//! ```rust,no_run
//! use emrdeid::config::secret_string;
//! use emrdeid::deid::{ClassifierOptions, Deidentifier, Reidentifier, TableStore};
//! use emrdeid::domain::EmrFormat;
//!
//! # fn example() -> emrdeid::domain::Result<()> {
//! let mut engine = Deidentifier::new(
//!     vec!["Last Name".to_string(), "PHN".to_string()],
//!     None,
//!     ClassifierOptions::default(),
//! )?;
//! engine.deidentify_file("patients.csv", "patients.deid.csv", EmrFormat::Pss)?;
//!
//! let password = secret_string("a long passphrase".to_string());
//! let store = TableStore::new();
//! store.save(engine.table(), "patients.table", &password, false)?;
//!
//! let table = store.load("patients.table", &password)?;
//! Reidentifier::new(&table)?.reidentify_file(
//!     "patients.deid.csv",
//!     "patients.restored.csv",
//!     EmrFormat::Accuro,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod engine;
pub mod generator;
pub mod reidentify;
pub mod store;
pub mod summary;
pub mod table;

use crate::adapters::csv_io::{write_rows, Row};
use crate::domain::Result;
use std::path::Path;

pub use classifier::{classify, ClassifierOptions, ValueClass};
pub use engine::{Deidentified, Deidentifier, PreparedRun};
pub use generator::generate;
pub use reidentify::Reidentifier;
pub use store::{KdfParams, TableStore};
pub use summary::{FileSummary, RunSummary};
pub use table::{IdentityTable, IdentityTuple, SyntheticTuple};

/// Header and rows produced by rewriting a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Column names, identical to the source header
    pub headers: Vec<String>,

    /// Rewritten rows in source order
    pub rows: Vec<Row>,
}

impl Rewritten {
    /// Write as CSV to `path`, atomically
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_rows(path, &self.headers, &self.rows)
    }
}
