//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::detection::scanner::ScanLevel;

/// svgguard - Detect and remove active content from SVG files
#[derive(Parser, Debug)]
#[command(name = "svgguard")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "svgguard - Scan, sanitize and report on scripts and external references in SVG files"
)]
pub struct Cli {
    /// Logging verbosity level
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LogLevel,

    /// Logging output format
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: crate::logging::LogFormat,

    /// Control color output (auto, always, never). Respects NO_COLOR env var.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Configuration file [default: <config_dir>/svgguard/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an SVG file or directory for threats
    Scan {
        /// File or directory to scan
        path: PathBuf,

        /// Scan level [default: from config, else strict]
        #[arg(short, long)]
        level: Option<ScanLevel>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Output format: text, json
        #[arg(short = 'F', long, default_value = "text")]
        format: OutputFormat,

        /// Suppress all stdout output, only set exit code
        #[arg(short, long)]
        quiet: bool,
    },

    /// Remove threats from an SVG file
    Sanitize {
        /// Input SVG file
        input: PathBuf,

        /// Where to write the sanitized SVG
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        removal: RemovalFlags,
    },

    /// Generate a JSON Go/No-Go report
    Report {
        /// File or directory to scan
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Scan level [default: from config, else strict]
        #[arg(short, long)]
        level: Option<ScanLevel>,

        /// Project name in the report
        #[arg(long)]
        project: Option<String>,

        /// Version string in the report
        #[arg(long = "version")]
        report_version: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect the built-in threat patterns
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Categories to remove. With no flag set, everything is removed.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct RemovalFlags {
    /// Remove script elements and script URIs
    #[arg(long)]
    pub scripts: bool,

    /// Remove on* event handler attributes
    #[arg(long)]
    pub event_handlers: bool,

    /// Neutralize external references and remove foreignObject
    #[arg(long)]
    pub external_refs: bool,

    /// Remove every sanitizable category
    #[arg(long)]
    pub all: bool,
}

impl RemovalFlags {
    /// True when no flag was given on the command line.
    pub fn is_empty(&self) -> bool {
        !(self.scripts || self.event_handlers || self.external_refs || self.all)
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a config file holding the built-in defaults
    Init {
        /// Path to create config file
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the threat pattern catalog
    List,
}

/// Logging verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Exit codes with distinct semantics.
/// 0 = clean, 1 = threat detected, 2 = error.
pub const EXIT_CLEAN: u8 = 0;
pub const EXIT_THREAT: u8 = 1;
pub const EXIT_ERROR: u8 = 2;
