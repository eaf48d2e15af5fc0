//! CSV input and output for EMR exports.

pub mod reader;
pub mod writer;

pub use reader::{Row, RowSource};
pub use writer::{write_bytes, write_rows};
