//! Wave-level table transformations.
//!
//! Each stage takes the wave table by value and hands back the transformed
//! table, so the caller decides what is kept between stages:
//!
//! - **coalesce**: canonical renames, the `TOPLINE` dimension, race folding
//! - **classify**: question classification and the schema drift report
//! - **bucketize**: derived ages and numeric binning
//! - **reshape**: wide to long melt
//! - **filter**: removal of skipped and non-response rows
//! - **recode**: canonical response and dimension codes

pub mod bucketize;
pub mod classify;
pub mod coalesce;
pub mod error;
pub mod filter;
pub mod recode;
pub mod reshape;

pub use bucketize::{bucketize_numeric, compute_ages};
pub use classify::{WaveSchema, classify_questions, is_weight_column};
pub use coalesce::{add_topline, coalesce_races, coalesce_variables};
pub use error::{Result, TransformError};
pub use filter::drop_missing_responses;
pub use recode::recode_values;
pub use reshape::reshape_long;
