//! Temporal smoothing of published shares.
//!
//! The multi-week cell table is split into one owned series per cell key,
//! each share column is smoothed with LOWESS against the wave end dates on a
//! pool of worker threads, and the smoothed shares are rescaled so that they
//! sum to one within every (week, dimension value, question) group.

pub mod error;
pub mod lowess;
pub mod pool;
pub mod series;
pub mod smooth;

pub use error::{Result, SmoothError};
pub use lowess::Lowess;
pub use pool::WorkerPool;
pub use series::{CellSeries, partition_cells};
pub use smooth::{renormalize, smooth_cells};
