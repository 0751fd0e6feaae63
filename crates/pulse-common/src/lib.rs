//! Shared utilities for the pulse crates.
//!
//! Survey tables arrive with loosely typed columns (integer codes read as
//! floats, identifiers read as integers). These helpers pull typed vectors out
//! of Polars columns so stage code can work on plain Rust values.

pub mod polars;

pub use polars::{
    any_to_f64, any_to_i64, any_to_string, column_f64, column_i64, column_strings,
    format_numeric, has_column, parse_f64, parse_i64,
};
