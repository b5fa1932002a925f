//! CLI argument definitions for the project tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bis",
    version,
    about = "BioImage Studio project tool - create, inspect, and migrate project files",
    long_about = "Create, inspect, and migrate BioImage Studio project files.\n\n\
                  Projects are .bis containers holding the user's dataset\n\
                  selections and any image data embedded in the project."
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
    /// Create a new empty project file.
    New(NewArgs),

    /// Show the datasets selected in a project file.
    Inspect(InspectArgs),

    /// Migrate a legacy (v0.5) project to the current format.
    Convert(ConvertArgs),
}

#[derive(Parser)]
pub struct NewArgs {
    /// Path of the project file to create.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Overwrite an existing file.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Path of the project file to inspect.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Path of the legacy project file to read.
    #[arg(value_name = "OLD_PROJECT")]
    pub input: PathBuf,

    /// Path of the migrated project file to write.
    #[arg(value_name = "NEW_PROJECT")]
    pub output: PathBuf,
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
