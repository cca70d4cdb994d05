//! `reqnorm` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use reqnorm_cli::config::{CliOverrides, Settings};
use reqnorm_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    RunStatus, run_batch, run_clear_cache, run_fields, run_process, run_template,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let overrides = CliOverrides {
        cache_path: cli.cache.clone(),
        catalog_path: cli.catalog.clone(),
        output_dir: match &cli.command {
            Command::Batch(args) => args.output_dir.clone(),
            _ => None,
        },
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides);

    let result = match &cli.command {
        Command::Process(args) => run_process(&settings, args),
        Command::Batch(args) => run_batch(&settings, args),
        Command::ClearCache => run_clear_cache(&settings),
        Command::Template(args) => run_template(&settings, args),
        Command::Fields => run_fields(&settings),
    };
    let exit_code = match result {
        Ok(status) => status.exit_code(),
        Err(error) => {
            eprintln!("error: {error:#}");
            RunStatus::Failed.exit_code()
        }
    };
    std::process::exit(exit_code);
}

/// Logging configuration from CLI flags. `--log-level` beats `-v`/`-q`,
/// which beat `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        ..LogConfig::default()
    };
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
