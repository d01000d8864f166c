//! CLI argument definitions for the usage pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "usage-pipeline",
    version,
    about = "Normalize screen-time exports into daily long-format tables",
    long_about = "Normalize wide-format usage-tracking exports (per-app and \n\
                  per-site screen time, device unlocks) into long-format,\n\
                  date-indexed tables: reshape, filter low-signal columns,\n\
                  merge export batches, and repair daily gaps."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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
    /// Run the full pipeline over an export directory.
    Run(RunArgs),

    /// Split combined export sheets into App and Web sheets.
    SplitExport(SplitExportArgs),

    /// Bulk-load a processed directory into a SQLite database.
    LoadDb(LoadDbArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory of export batches (one subdirectory per export, or a flat
    /// directory of sheet files for a single batch).
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for processed tables (default: <INPUT_DIR>/processed).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Pipeline configuration file (JSON). Defaults are used when omitted.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured activity threshold for column filtering.
    #[arg(long = "threshold", value_name = "N")]
    pub threshold: Option<i64>,

    /// Override the configured gap-fill policy.
    #[arg(long = "fill-policy", value_enum)]
    pub fill_policy: Option<FillPolicyArg>,
}

#[derive(Parser)]
pub struct SplitExportArgs {
    /// Directory containing combined export sheet files.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for the split sheets (default: <INPUT_DIR>/split).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Device label identifying app rows in combined sheets.
    #[arg(long = "device", default_value = "motorola moto g(6) plus")]
    pub device: String,
}

#[derive(Parser)]
pub struct LoadDbArgs {
    /// Directory of processed tables to load.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// SQLite database file (default: <DATA_DIR>/usage.db).
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,
}

/// CLI gap-fill policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum FillPolicyArg {
    Mean,
    ForwardFill,
    None,
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
