use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use pulse_core::{
    AggregateStore, BatchRunner, WaveOutcome, WaveSource, build_default_pipeline, smooth_store,
};
use pulse_ingest::{CALENDAR_FILE, DirectorySource, DirectoryStore, load_calendar, load_metadata};
use pulse_model::{PipelineConfig, WaveCalendar};
use pulse_report::{build_query_cache, write_cache};
use tracing::{info, info_span};

use crate::types::{AggregateResult, CacheResult, RunPaths, SmoothResult};

/// Loads the pipeline configuration, falling back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    PipelineConfig::from_toml_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn load_wave_calendar(paths: &RunPaths) -> Result<WaveCalendar> {
    let path = paths.metadata_dir.join(CALENDAR_FILE);
    load_calendar(&path).context("load collection dates")
}

fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!("{{msg}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}})");
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Processes the requested weeks (all available when empty) into the store.
pub fn run_aggregate(paths: &RunPaths, weeks: &[u32]) -> Result<AggregateResult> {
    let span = info_span!("aggregate", data_dir = %paths.data_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = load_config(paths.config.as_deref())?;
    let metadata = load_metadata(&paths.metadata_dir).context("load survey metadata")?;
    let calendar = load_wave_calendar(paths)?;
    let source = DirectorySource::new(&paths.data_dir);
    let store = DirectoryStore::new(&paths.output_dir).context("open output store")?;

    let weeks = if weeks.is_empty() {
        source
            .available_weeks()
            .map_err(|e| anyhow!(e).context("list wave files"))?
    } else {
        weeks.to_vec()
    };

    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);
    let pb = progress_bar(weeks.len(), "waves");
    pb.set_message("Aggregating");
    let report = runner.run(&weeks, &source, &store, |outcome: &WaveOutcome| {
        pb.set_message(format!("Week {}", outcome.week()));
        pb.inc(1);
    });
    pb.finish_and_clear();

    info!(
        waves = weeks.len(),
        failed = report.failed(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "aggregation finished"
    );
    Ok(AggregateResult {
        output_dir: paths.output_dir.clone(),
        report,
    })
}

/// Smooths every stored wave and writes the smoothed table.
pub fn run_smooth(paths: &RunPaths, workers: Option<usize>) -> Result<SmoothResult> {
    let span = info_span!("smooth", output_dir = %paths.output_dir.display());
    let _guard = span.enter();

    let mut config = load_config(paths.config.as_deref())?;
    if workers.is_some() {
        config.smoothing.workers = workers;
    }
    let calendar = load_wave_calendar(paths)?;
    let store = DirectoryStore::new(&paths.output_dir).context("open output store")?;

    let pb = progress_bar(0, "cells");
    pb.set_message("Smoothing");
    let smoothed = smooth_store(&store, &calendar, &config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .context("smooth stored waves")?;
    pb.finish_and_clear();

    Ok(SmoothResult {
        output_dir: paths.output_dir.clone(),
        rows: smoothed.height(),
        workers: config.smoothing.worker_count(),
    })
}

/// Builds the front-end cache from the stored and smoothed tables.
pub fn run_cache(paths: &RunPaths) -> Result<CacheResult> {
    let span = info_span!("cache", cache_dir = %paths.cache_dir.display());
    let _guard = span.enter();

    let config = load_config(paths.config.as_deref())?;
    let metadata = load_metadata(&paths.metadata_dir).context("load survey metadata")?;
    let calendar = load_wave_calendar(paths)?;
    let store = DirectoryStore::new(&paths.output_dir).context("open output store")?;

    let cells = store
        .load_cells()
        .map_err(|e| anyhow!(e).context("load stored waves"))?;
    let smoothed = store
        .load_smoothed()
        .map_err(|e| anyhow!(e).context("load smoothed table"))?;
    if smoothed.is_none() {
        tracing::warn!("no smoothed table stored, writing unsmoothed artifacts only");
    }

    let cache = build_query_cache(&cells, smoothed.as_ref(), &metadata, &config, &calendar)
        .context("build query cache")?;
    let files = write_cache(&paths.cache_dir, &cache).context("write query cache")?;

    Ok(CacheResult {
        cache_dir: paths.cache_dir.clone(),
        files,
        smoothed: smoothed.is_some(),
    })
}
