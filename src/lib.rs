// emrdeid - EMR export deidentification tool
// Copyright (c) 2025 emrdeid Contributors
// Licensed under the MIT License

//! # emrdeid - EMR export deidentification
//!
//! emrdeid rewrites the identifying columns of clinical-practice CSV exports
//! (Accuro and PSS) with synthetic values, keeps the mapping in a
//! password-encrypted identity table, and restores the original values from
//! that table on request. It also computes per-provider ratios between two
//! exports.
//!
//! ## Architecture
//!
//! emrdeid follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`deid`] - Classification, synthesis, identity table, encryption,
//!   deidentification and reidentification
//! - [`core`] - Provider scoring
//! - [`adapters`] - CSV reading and atomic writing
//! - [`domain`] - Error type and EMR formats
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emrdeid::config::secret_string;
//! use emrdeid::deid::{ClassifierOptions, Deidentifier, Reidentifier, TableStore};
//! use emrdeid::domain::EmrFormat;
//!
//! # fn example() -> emrdeid::domain::Result<()> {
//! let fields = vec!["First Name".to_string(), "PHN".to_string()];
//! let mut engine = Deidentifier::new(fields, None, ClassifierOptions::default())?;
//! engine.deidentify_file("visits.csv", "visits.deid.csv", EmrFormat::Pss)?;
//!
//! let password = secret_string("correct horse battery staple".to_string());
//! let store = TableStore::new();
//! store.save(engine.table(), "visits.table", &password, false)?;
//!
//! // Later: restore the originals
//! let table = store.load("visits.table", &password)?;
//! Reidentifier::new(&table)?.reidentify_file(
//!     "visits.deid.csv",
//!     "visits.restored.csv",
//!     EmrFormat::Accuro,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error is
//! [`domain::EmrError`]. Every error aborts the current run; the CLI maps
//! them to exit codes with [`domain::EmrError::exit_code`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod deid;
pub mod domain;
pub mod logging;
