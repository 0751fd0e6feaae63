//! Error types for aggregation.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{weight} has {found} replicate weight columns, expected {expected}")]
    ReplicateWeights {
        weight: String,
        found: usize,
        expected: usize,
    },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("no crosstab dimensions to aggregate over")]
    NoDimensions,

    /// Person and household passes produced different cell sets.
    #[error("person and household cells do not align: {person} vs {household} rows, {matched} matched")]
    KeyMisalignment {
        person: usize,
        household: usize,
        matched: usize,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, AggregateError>;
