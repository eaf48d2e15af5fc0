//! Core business logic for emrdeid besides deidentification.
//!
//! # Modules
//!
//! - [`scoring`] - Per-provider counts, groupings and ratio summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use emrdeid::adapters::csv_io::RowSource;
//! use emrdeid::core::scoring::{calc_score, summarize};
//! use emrdeid::domain::EmrFormat;
//!
//! # fn example() -> emrdeid::domain::Result<()> {
//! let enrolled = RowSource::open("enrolled.csv", EmrFormat::Accuro)?;
//! let screened = RowSource::open("screened.csv", EmrFormat::Accuro)?;
//!
//! let field = "Enrolled Provider Last Name";
//! let denominator = calc_score(&enrolled, field, None)?;
//! let numerator = calc_score(&screened, field, Some("PHN"))?;
//!
//! for line in summarize(&numerator, &denominator) {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod scoring;
