//! Per-wave read-only context and mutable state.

use polars::prelude::DataFrame;
use pulse_model::{PipelineConfig, SurveyMetadata, Wave};
use pulse_transform::WaveSchema;

/// Read-only inputs shared by every step of a wave run.
#[derive(Debug, Clone, Copy)]
pub struct WaveContext<'a> {
    pub wave: &'a Wave,
    pub metadata: &'a SurveyMetadata,
    pub config: &'a PipelineConfig,
}

impl<'a> WaveContext<'a> {
    pub fn new(wave: &'a Wave, metadata: &'a SurveyMetadata, config: &'a PipelineConfig) -> Self {
        Self {
            wave,
            metadata,
            config,
        }
    }
}

/// Tables produced so far in a wave run.
///
/// Each stage's output is `None` until the stage has run.
#[derive(Debug, Default)]
pub struct WaveState {
    /// Respondent-level table, reshaped in place by the wide stages.
    pub wide: DataFrame,
    pub schema: Option<WaveSchema>,
    pub long: Option<DataFrame>,
    pub cells: Option<DataFrame>,
    pub executed_steps: Vec<String>,
}

impl WaveState {
    pub fn new(wide: DataFrame) -> Self {
        Self {
            wide,
            ..Self::default()
        }
    }

    /// Takes the wide table out, leaving an empty frame behind.
    pub fn take_wide(&mut self) -> DataFrame {
        std::mem::take(&mut self.wide)
    }
}
