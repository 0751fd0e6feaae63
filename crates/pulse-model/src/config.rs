//! Per-run pipeline configuration.
//!
//! A `PipelineConfig` is built once (from defaults or a TOML file) and shared
//! read-only by every stage of every wave in a run.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CRITICAL_VALUE, RESPONDENT_ID, TOPLINE, WEEK_COLUMN};
use crate::error::{ModelError, Result};

/// Age derivation from birth year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeOptions {
    /// Birth-year column, replaced in place by the derived age.
    pub column: String,
    /// Ages below this are clamped up to it.
    pub floor: i64,
}

impl Default for AgeOptions {
    fn default() -> Self {
        Self {
            column: "TBIRTH_YEAR".to_string(),
            floor: 18,
        }
    }
}

/// Folding of the hispanic-origin flag into the race dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceOptions {
    pub enabled: bool,
    pub race_column: String,
    pub hispanic_column: String,
    /// `hispanic_column` value meaning "not hispanic".
    pub not_hispanic_code: i64,
    /// Race code assigned to hispanic respondents.
    pub hispanic_race_code: i64,
}

impl Default for RaceOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            race_column: "RRACE".to_string(),
            hispanic_column: "RHISPANIC".to_string(),
            not_hispanic_code: 1,
            hispanic_race_code: 5,
        }
    }
}

/// LOWESS and worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingOptions {
    /// Fraction of points used for each local fit.
    pub frac: f64,
    /// Robustifying iterations after the initial fit.
    pub iterations: usize,
    /// Worker threads; `None` means one less than the available cores.
    pub workers: Option<usize>,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            frac: 0.2,
            iterations: 3,
            workers: None,
        }
    }
}

impl SmoothingOptions {
    /// Resolved worker count, never below one.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
        })
        .max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Crosstab dimensions, each crossed independently with every question.
    pub dimensions: Vec<String>,
    /// Dimensions whose sentinel values drop the whole row.
    pub required_dimensions: Vec<String>,
    /// Respondent identifier columns kept through reshaping.
    pub id_columns: Vec<String>,
    /// Critical value for confidence bounds.
    pub critical_value: f64,
    /// Dimension whose values are metro-area codes.
    pub geography_dimension: String,
    pub age: AgeOptions,
    pub race: RaceOptions,
    pub smoothing: SmoothingOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dimensions: [
                TOPLINE,
                "RRACE",
                "EEDUC",
                "EST_MSA",
                "INCOME",
                "EGENDER_EGENID_BIRTH",
                "TBIRTH_YEAR",
            ]
            .map(String::from)
            .to_vec(),
            required_dimensions: vec!["INCOME".to_string()],
            id_columns: vec![RESPONDENT_ID.to_string(), WEEK_COLUMN.to_string()],
            critical_value: DEFAULT_CRITICAL_VALUE,
            geography_dimension: "EST_MSA".to_string(),
            age: AgeOptions::default(),
            race: RaceOptions::default(),
            smoothing: SmoothingOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML document; omitted keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(ModelError::InvalidConfig(
                "at least one crosstab dimension is required".to_string(),
            ));
        }
        if !self.id_columns.iter().any(|c| c == RESPONDENT_ID) {
            return Err(ModelError::InvalidConfig(format!(
                "id_columns must contain {RESPONDENT_ID}"
            )));
        }
        if !(self.critical_value.is_finite() && self.critical_value > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "critical_value must be positive, got {}",
                self.critical_value
            )));
        }
        if !(self.smoothing.frac > 0.0 && self.smoothing.frac <= 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "smoothing.frac must be in (0, 1], got {}",
                self.smoothing.frac
            )));
        }
        Ok(())
    }

    pub fn is_dimension(&self, column: &str) -> bool {
        self.dimensions.iter().any(|d| d == column)
    }

    pub fn is_id_column(&self, column: &str) -> bool {
        self.id_columns.iter().any(|c| c == column)
    }
}
