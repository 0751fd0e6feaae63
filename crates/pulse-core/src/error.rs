//! Error types for wave processing.

use polars::prelude::PolarsError;
use pulse_aggregate::AggregateError;
use pulse_smooth::SmoothError;
use pulse_transform::TransformError;
use thiserror::Error;

/// Error type used by source and store implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can fail a single wave (or the smoothing run).
#[derive(Debug, Error)]
pub enum WaveError {
    #[error("failed to load wave: {0}")]
    Source(#[source] BoxError),

    #[error("failed to store results: {0}")]
    Store(#[source] BoxError),

    #[error("week {0} is not in the collection calendar")]
    UnknownWeek(u32),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Smooth(#[from] SmoothError),

    /// A step ran before the step that produces its input.
    #[error("step {step} needs output of an earlier stage: {missing}")]
    MissingStage {
        step: &'static str,
        missing: &'static str,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, WaveError>;
