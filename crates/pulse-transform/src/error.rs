//! Error types for wave transformations.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Non-sentinel values that fall outside every declared bin.
    #[error("unmapped values binning {variable}: {}", values.join(", "))]
    Binning { variable: String, values: Vec<String> },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// The wave shares no question column with the metadata.
    #[error("no classifiable question columns in wave")]
    NoQuestions,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
