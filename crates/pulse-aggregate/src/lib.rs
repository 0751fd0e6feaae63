//! Weighted aggregation of long-format survey responses.
//!
//! For each weight type the long table is joined to the respondent weights,
//! summed per (dimension value, question, response) cell, and turned into
//! estimates with jackknife standard errors, confidence bounds and shares.
//! Person and household estimates are then merged into one row per cell.

pub mod aggregate;
pub mod error;
pub mod finalize;
pub mod replicate;
pub mod weights;

pub use aggregate::{aggregate_wave, aggregate_weight, merge_weight_types};
pub use error::{AggregateError, Result};
pub use finalize::{attach_geography, finalize_columns, output_order};
pub use replicate::{confidence_bounds, jackknife_standard_error, share};
pub use weights::weight_table;
