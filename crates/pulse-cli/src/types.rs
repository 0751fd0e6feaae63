use std::path::PathBuf;

use pulse_core::BatchReport;

/// Directories a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Raw `pulse-WW.csv` wave files.
    pub data_dir: PathBuf,
    /// Metadata tables and the collection calendar.
    pub metadata_dir: PathBuf,
    /// Processed waves and the smoothed table.
    pub output_dir: PathBuf,
    /// Front-end cache artifacts.
    pub cache_dir: PathBuf,
    /// Optional TOML pipeline configuration.
    pub config: Option<PathBuf>,
}

#[derive(Debug)]
pub struct AggregateResult {
    pub output_dir: PathBuf,
    pub report: BatchReport,
}

#[derive(Debug)]
pub struct SmoothResult {
    pub output_dir: PathBuf,
    pub rows: usize,
    pub workers: usize,
}

#[derive(Debug)]
pub struct CacheResult {
    pub cache_dir: PathBuf,
    pub files: usize,
    pub smoothed: bool,
}
