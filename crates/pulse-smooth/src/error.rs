//! Error types for smoothing.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmoothError {
    #[error("week {0} is not in the collection calendar")]
    UnknownWeek(u32),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid smoothing parameters: {0}")]
    InvalidParameters(String),

    #[error("LOWESS fit failed: {0}")]
    Fit(String),

    #[error("null cell key in column {0}")]
    NullKey(String),

    #[error("a smoothing worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, SmoothError>;
