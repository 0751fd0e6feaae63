//! Wave processing pipeline with ordered step execution.
//!
//! # Standard Pipeline Order
//!
//! 1. **coalesce** - canonical renames and the `TOPLINE` dimension
//! 2. **classify** - question classification and schema drift report
//! 3. **ages** - birth year to age at the end of the collection window
//! 4. **bucketize** - numeric columns to bin codes
//! 5. **races** - hispanic origin folded into the race dimension
//! 6. **reshape** - wide to long
//! 7. **filter** - skipped and non-response rows removed
//! 8. **recode** - canonical response and dimension codes
//! 9. **aggregate** - weighted estimates for both weight types
//! 10. **geography** - metro area titles
//! 11. **finalize** - week stamp, column order, sort

use polars::prelude::DataFrame;
use pulse_model::SchemaReport;
use tracing::{debug, info, info_span};

use crate::context::{WaveContext, WaveState};
use crate::error::{Result, WaveError};

/// A single step of the wave pipeline.
pub trait WaveStep: Send + Sync {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()>;

    /// Name used in logs and in `WaveState::executed_steps`.
    fn step_name(&self) -> &'static str;

    /// Whether this step should be skipped under the current configuration.
    fn should_skip(&self, _ctx: &WaveContext<'_>) -> bool {
        false
    }
}

/// Result of a full wave run.
#[derive(Debug, Clone)]
pub struct WaveOutput {
    pub cells: DataFrame,
    pub report: SchemaReport,
    pub executed_steps: Vec<String>,
}

/// An ordered pipeline of wave steps.
pub struct WavePipeline {
    steps: Vec<Box<dyn WaveStep>>,
}

impl Default for WavePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl WavePipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: Box<dyn WaveStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|s| s.step_name() != step_name);
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }

    /// Runs every step over `state`.
    pub fn execute_with_state(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        for step in &self.steps {
            if step.should_skip(ctx) {
                debug!(step = step.step_name(), "step skipped");
                continue;
            }
            step.execute(ctx, state)?;
            state.executed_steps.push(step.step_name().to_string());
        }
        Ok(())
    }

    /// Runs the pipeline over one raw wave and returns its cell table.
    pub fn execute(&self, wide: DataFrame, ctx: &WaveContext<'_>) -> Result<WaveOutput> {
        let span = info_span!("wave", week = ctx.wave.week);
        let _guard = span.enter();
        info!(rows = wide.height(), columns = wide.width(), "processing wave");

        let mut state = WaveState::new(wide);
        self.execute_with_state(ctx, &mut state)?;
        let cells = state.cells.take().ok_or(WaveError::MissingStage {
            step: "output",
            missing: "cells",
        })?;
        let report = state.schema.take().map(|s| s.report).unwrap_or_default();
        info!(cells = cells.height(), "wave processed");
        Ok(WaveOutput {
            cells,
            report,
            executed_steps: state.executed_steps,
        })
    }
}

// ============================================================================
// Standard Wave Steps
// ============================================================================

pub struct CoalesceStep;

impl WaveStep for CoalesceStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let (wide, skipped) = pulse_transform::coalesce_variables(state.take_wide(), ctx.metadata)?;
        state.wide = pulse_transform::add_topline(wide)?;
        state.schema = Some(pulse_transform::WaveSchema {
            report: pulse_model::SchemaReport {
                skipped_renames: skipped,
                ..Default::default()
            },
            ..Default::default()
        });
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "coalesce"
    }
}

pub struct ClassifyStep;

impl WaveStep for ClassifyStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let skipped = state
            .schema
            .take()
            .map(|s| s.report.skipped_renames)
            .unwrap_or_default();
        let schema =
            pulse_transform::classify_questions(&state.wide, ctx.metadata, ctx.config, skipped)?;
        state.schema = Some(schema);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "classify"
    }
}

pub struct AgeStep;

impl WaveStep for AgeStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        state.wide = pulse_transform::compute_ages(state.take_wide(), ctx.wave, &ctx.config.age)?;
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "ages"
    }
}

pub struct BucketizeStep;

impl WaveStep for BucketizeStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        state.wide = pulse_transform::bucketize_numeric(state.take_wide(), &ctx.metadata.bins)?;
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "bucketize"
    }

    fn should_skip(&self, ctx: &WaveContext<'_>) -> bool {
        ctx.metadata.bins.is_empty()
    }
}

pub struct RaceStep;

impl WaveStep for RaceStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        state.wide = pulse_transform::coalesce_races(state.take_wide(), &ctx.config.race)?;
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "races"
    }

    fn should_skip(&self, ctx: &WaveContext<'_>) -> bool {
        !ctx.config.race.enabled
    }
}

pub struct ReshapeStep;

impl WaveStep for ReshapeStep {
    fn execute(&self, _ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let schema = state.schema.as_ref().ok_or(WaveError::MissingStage {
            step: "reshape",
            missing: "schema",
        })?;
        let long =
            pulse_transform::reshape_long(&state.wide, &schema.classification, &schema.dimensions)?;
        state.long = Some(long);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "reshape"
    }
}

pub struct FilterStep;

impl WaveStep for FilterStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let (schema, long) = match (state.schema.as_ref(), state.long.take()) {
            (Some(schema), Some(long)) => (schema, long),
            _ => {
                return Err(WaveError::MissingStage {
                    step: "filter",
                    missing: "long table",
                });
            }
        };
        let filtered = pulse_transform::drop_missing_responses(
            long,
            &schema.classification,
            &ctx.config.required_dimensions,
        )?;
        state.long = Some(filtered);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "filter"
    }
}

pub struct RecodeStep;

impl WaveStep for RecodeStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let (schema, long) = match (state.schema.as_ref(), state.long.take()) {
            (Some(schema), Some(long)) => (schema, long),
            _ => {
                return Err(WaveError::MissingStage {
                    step: "recode",
                    missing: "long table",
                });
            }
        };
        let recoded =
            pulse_transform::recode_values(long, &ctx.metadata.responses, &schema.dimensions)?;
        state.long = Some(recoded);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "recode"
    }
}

pub struct AggregateStep;

impl WaveStep for AggregateStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let (schema, long) = match (state.schema.as_ref(), state.long.as_ref()) {
            (Some(schema), Some(long)) => (schema, long),
            _ => {
                return Err(WaveError::MissingStage {
                    step: "aggregate",
                    missing: "long table",
                });
            }
        };
        let cells = pulse_aggregate::aggregate_wave(
            &state.wide,
            long,
            &schema.dimensions,
            ctx.config.critical_value,
        )?;
        state.cells = Some(cells);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "aggregate"
    }
}

pub struct GeographyStep;

impl WaveStep for GeographyStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let cells = state.cells.take().ok_or(WaveError::MissingStage {
            step: "geography",
            missing: "cells",
        })?;
        state.cells = Some(pulse_aggregate::attach_geography(
            cells,
            &ctx.config.geography_dimension,
            &ctx.metadata.geography,
        )?);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "geography"
    }
}

pub struct FinalizeStep;

impl WaveStep for FinalizeStep {
    fn execute(&self, ctx: &WaveContext<'_>, state: &mut WaveState) -> Result<()> {
        let cells = state.cells.take().ok_or(WaveError::MissingStage {
            step: "finalize",
            missing: "cells",
        })?;
        state.cells = Some(pulse_aggregate::finalize_columns(cells, ctx.wave.week)?);
        Ok(())
    }

    fn step_name(&self) -> &'static str {
        "finalize"
    }
}

/// The standard pipeline in publication order.
pub fn build_default_pipeline() -> WavePipeline {
    WavePipeline::new()
        .add_step(Box::new(CoalesceStep))
        .add_step(Box::new(ClassifyStep))
        .add_step(Box::new(AgeStep))
        .add_step(Box::new(BucketizeStep))
        .add_step(Box::new(RaceStep))
        .add_step(Box::new(ReshapeStep))
        .add_step(Box::new(FilterStep))
        .add_step(Box::new(RecodeStep))
        .add_step(Box::new(AggregateStep))
        .add_step(Box::new(GeographyStep))
        .add_step(Box::new(FinalizeStep))
}
