//! Multi-wave batch runs and store-wide smoothing.

use polars::prelude::DataFrame;
use pulse_model::{PipelineConfig, SchemaReport, SurveyMetadata, WaveCalendar};
use tracing::{error, info, info_span, warn};

use crate::context::WaveContext;
use crate::error::{Result, WaveError};
use crate::pipeline::WavePipeline;
use crate::store::{AggregateStore, WaveSource};

/// How one wave of a batch ended.
#[derive(Debug)]
pub enum WaveOutcome {
    Succeeded {
        week: u32,
        cells: usize,
        report: SchemaReport,
    },
    Failed {
        week: u32,
        error: WaveError,
    },
}

impl WaveOutcome {
    pub fn week(&self) -> u32 {
        match self {
            Self::Succeeded { week, .. } | Self::Failed { week, .. } => *week,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Outcomes of a batch, in run order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<WaveOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (u32, &WaveError)> {
        self.outcomes.iter().filter_map(|o| match o {
            WaveOutcome::Failed { week, error } => Some((*week, error)),
            WaveOutcome::Succeeded { .. } => None,
        })
    }
}

/// Runs the wave pipeline over many weeks.
///
/// Each wave is its own failure boundary: an error is recorded in the
/// report, nothing is written for that week, and the batch moves on.
pub struct BatchRunner<'a> {
    pipeline: &'a WavePipeline,
    metadata: &'a SurveyMetadata,
    calendar: &'a WaveCalendar,
    config: &'a PipelineConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        pipeline: &'a WavePipeline,
        metadata: &'a SurveyMetadata,
        calendar: &'a WaveCalendar,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            pipeline,
            metadata,
            calendar,
            config,
        }
    }

    /// Loads, processes and stores a single wave.
    pub fn run_wave<S, T>(&self, week: u32, source: &S, store: &T) -> Result<WaveOutcome>
    where
        S: WaveSource + ?Sized,
        T: AggregateStore + ?Sized,
    {
        let wave = self.calendar.get(week).ok_or(WaveError::UnknownWeek(week))?;
        let wide = source.load_wave(week).map_err(WaveError::Source)?;
        let ctx = WaveContext::new(wave, self.metadata, self.config);
        let output = self.pipeline.execute(wide, &ctx)?;
        store
            .replace_wave(week, &output.cells)
            .map_err(WaveError::Store)?;
        Ok(WaveOutcome::Succeeded {
            week,
            cells: output.cells.height(),
            report: output.report,
        })
    }

    /// Runs every week in `weeks`, calling `on_wave` after each one.
    pub fn run<S, T, F>(&self, weeks: &[u32], source: &S, store: &T, mut on_wave: F) -> BatchReport
    where
        S: WaveSource + ?Sized,
        T: AggregateStore + ?Sized,
        F: FnMut(&WaveOutcome),
    {
        let mut report = BatchReport::default();
        for &week in weeks {
            let span = info_span!("batch", week);
            let _guard = span.enter();
            let outcome = self
                .run_wave(week, source, store)
                .unwrap_or_else(|error| {
                    error!(week, %error, "wave failed");
                    WaveOutcome::Failed { week, error }
                });
            on_wave(&outcome);
            report.outcomes.push(outcome);
        }
        if report.failed() > 0 {
            warn!(
                failed = report.failed(),
                succeeded = report.succeeded(),
                "batch finished with failures"
            );
        } else {
            info!(succeeded = report.succeeded(), "batch finished");
        }
        report
    }
}

/// Smooths every wave the store holds and stores the smoothed table.
pub fn smooth_store<T, P>(
    store: &T,
    calendar: &WaveCalendar,
    config: &PipelineConfig,
    progress: P,
) -> Result<DataFrame>
where
    T: AggregateStore + ?Sized,
    P: FnMut(usize, usize),
{
    let cells = store.load_cells().map_err(WaveError::Store)?;
    info!(rows = cells.height(), "loaded stored cells for smoothing");
    let smoothed = pulse_smooth::smooth_cells(&cells, calendar, &config.smoothing, progress)?;
    store
        .replace_smoothed(&smoothed)
        .map_err(WaveError::Store)?;
    Ok(smoothed)
}
