//! External integrations for emrdeid.
//!
//! - [`csv_io`] - Reading EMR CSV exports and writing CSV output atomically
//!
//! Adapters isolate file formats from the engines in [`crate::deid`] and
//! [`crate::core`], which only see [`csv_io::RowSource`] and [`csv_io::Row`].

pub mod csv_io;
