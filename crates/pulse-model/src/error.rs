use thiserror::Error;

/// Errors raised while building or validating model values.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),

    #[error("invalid numeric bin for {variable}: [{lower}, {upper})")]
    InvalidBin {
        variable: String,
        lower: f64,
        upper: f64,
    },

    #[error("overlapping numeric bins for {variable} at {value}")]
    OverlappingBins { variable: String, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
