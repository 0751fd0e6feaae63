//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pulse_cli::types::RunPaths;

#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "Household Pulse aggregation pipeline",
    long_about = "Aggregate Household Pulse survey waves into weighted response shares.\n\n\
                  Produces per-wave cell tables with jackknife confidence bounds,\n\
                  LOWESS-smoothed shares and the JSON cache served to the front end."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machines).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Aggregate raw waves into per-wave cell tables.
    Aggregate(AggregateArgs),

    /// Smooth every stored wave and write the smoothed table.
    Smooth(SmoothArgs),

    /// Build the front-end JSON cache from stored tables.
    Cache(CacheArgs),
}

#[derive(Args)]
pub struct PathArgs {
    /// Directory holding raw `pulse-WW.csv` wave files.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data/raw")]
    pub data_dir: PathBuf,

    /// Directory holding the metadata tables and collection dates.
    #[arg(long = "metadata-dir", value_name = "DIR", default_value = "data/metadata")]
    pub metadata_dir: PathBuf,

    /// Directory for processed waves and the smoothed table.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "data/processed")]
    pub output_dir: PathBuf,

    /// Directory for front-end cache artifacts.
    #[arg(long = "cache-dir", value_name = "DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// TOML pipeline configuration (defaults are used when omitted).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl PathArgs {
    pub fn to_run_paths(&self) -> RunPaths {
        RunPaths {
            data_dir: self.data_dir.clone(),
            metadata_dir: self.metadata_dir.clone(),
            output_dir: self.output_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Week to process; repeat for several. All available weeks when omitted.
    #[arg(long = "week", value_name = "WEEK")]
    pub weeks: Vec<u32>,
}

#[derive(Args)]
pub struct SmoothArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Worker threads (default: one less than the available cores).
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(flatten)]
    pub paths: PathArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
