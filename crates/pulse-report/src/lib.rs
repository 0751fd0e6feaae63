//! Front-end cache artifacts.
//!
//! One JSON artifact is produced per (question group, crosstab) pair and per
//! table flavour:
//!
//! - **`{group}-{xtab}.json`**: shares from the aggregated cells
//! - **`{group}-{xtab}-SMOOTHED.json`**: shares from the smoothed table
//!
//! Each artifact carries the response labels of the group, the crosstab
//! labels, and one entry per calendar week for every crosstab value, with
//! explicit nulls for weeks that have no observation.

mod cache;
mod error;
mod labels;
mod writer;

pub use cache::{
    CacheArtifact, CrosstabResponse, QueryCache, ShareRows, WeekValues, build_query_cache,
    cache_key, run_query,
};
pub use error::{ReportError, Result};
pub use labels::{CrosstabLabel, crosstab_labels, response_labels};
pub use writer::write_cache;
