//! Household Pulse pipeline CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use pulse_cli::commands::{run_aggregate, run_cache, run_smooth};
use pulse_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_batch_summary, print_cache_summary, print_smooth_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Aggregate(args) => {
            match run_aggregate(&args.paths.to_run_paths(), &args.weeks) {
                Ok(result) => {
                    print_batch_summary(&result);
                    if result.report.failed() > 0 { 1 } else { 0 }
                }
                Err(error) => report_error(&error),
            }
        }
        Command::Smooth(args) => match run_smooth(&args.paths.to_run_paths(), args.workers) {
            Ok(result) => {
                print_smooth_summary(&result);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Cache(args) => match run_cache(&args.paths.to_run_paths()) {
            Ok(result) => {
                print_cache_summary(&result);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
