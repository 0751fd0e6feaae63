//! Data model for the Household Pulse aggregation pipeline.
//!
//! Everything here is plain data: survey metadata tables, the wave calendar,
//! weight-type naming, the per-run configuration and the typed reports that
//! pipeline stages hand back to their callers. Table transformations live in
//! the downstream crates.

pub mod cell;
pub mod config;
pub mod constants;
pub mod error;
pub mod geography;
pub mod metadata;
pub mod numeric;
pub mod question;
pub mod recode;
pub mod schema;
pub mod wave;
pub mod weight;

pub use cell::{CellKey, SHARE_COLUMNS, smoothed_column};
pub use config::{AgeOptions, PipelineConfig, RaceOptions, SmoothingOptions};
pub use constants::{is_sentinel, SENTINEL_CODES};
pub use error::{ModelError, Result};
pub use geography::GeographyCrosswalk;
pub use metadata::SurveyMetadata;
pub use numeric::{NumericBin, NumericBins};
pub use question::{QuestionType, QuestionVariable};
pub use recode::{RecodeTable, ResponseRecoding};
pub use schema::{QuestionClassification, SchemaReport};
pub use wave::{Wave, WaveCalendar};
pub use weight::WeightType;
