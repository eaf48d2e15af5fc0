//! Domain types shared by every layer of emrdeid.
//!
//! - **Error types** ([`EmrError`])
//! - **Result type alias** ([`Result`])
//! - **EMR export dialects** ([`EmrFormat`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, EmrError>`]:
//!
//! ```rust
//! use emrdeid::domain::{EmrError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = emrdeid::config::load_config("emrdeid.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod format;
pub mod result;

pub use errors::EmrError;
pub use format::EmrFormat;
pub use result::Result;
