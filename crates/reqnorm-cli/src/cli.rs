//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use reqnorm_ingest::DocumentFilter;

#[derive(Parser)]
#[command(
    name = "reqnorm",
    version,
    about = "Normalize requirement documents into one canonical schema",
    long_about = "Map heterogeneous requirement exports (CSV, delimited text, \
                  PDF-extracted structured text) onto 16 canonical columns.\n\n\
                  Column decisions are asked once per document version and \
                  remembered in a local cache."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Mapping cache file (default: .cache/file_processing_cache.json).
    #[arg(long, value_name = "PATH", global = true)]
    pub cache: Option<PathBuf>,

    /// TOML file with extra column synonyms.
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Config file (default: ./reqnorm.toml, then the user config directory).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize one document.
    Process(ProcessArgs),

    /// Normalize every matching document in a directory.
    Batch(BatchArgs),

    /// Forget every remembered column decision.
    ClearCache,

    /// Write an empty template with one sample row.
    Template(TemplateArgs),

    /// List the canonical fields and their synonyms.
    Fields,
}

#[derive(Parser)]
pub struct ProcessArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output file (default: <output_dir>/<stem>_normalized.<ext>).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Never prompt: first sheet, unresolved columns skipped.
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Parser)]
pub struct BatchArgs {
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Which documents to pick up.
    #[arg(long = "type", value_name = "TYPE", default_value = "all")]
    pub filter: DocumentFilter,

    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write every record of the batch into this one file.
    #[arg(long, value_name = "PATH")]
    pub combined: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Threads used to read documents ahead of resolution.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub read_threads: usize,

    /// Never prompt: first sheet, unresolved columns skipped.
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Parser)]
pub struct TemplateArgs {
    #[arg(value_name = "OUT")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: FormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
