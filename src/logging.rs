//! Diagnostic logging for the svgguard binary.
//!
//! Findings, reports and sanitize summaries are printed on stdout. Everything
//! tracing emits goes to stderr, so `scan --format json` and `report` output
//! can be piped without filtering. The [`audit`] submodule keeps the
//! persistent JSON-lines record of scan, sanitize and report runs.

pub mod audit;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable colored output
    Pretty,
    /// One line per event, no target
    Compact,
    /// Structured JSON lines
    Json,
}

/// Errors from logging initialization.
#[derive(Error, Debug)]
pub enum LogInitError {
    #[error("Failed to parse log filter: {0}")]
    FilterError(String),

    #[error("Failed to set global subscriber: {0}")]
    SetGlobalError(String),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber writing to stderr.
///
/// `level` applies to svgguard's own targets; dependencies stay at `warn`.
/// A set `RUST_LOG` replaces the whole directive.
pub fn init(level: Level, format: LogFormat) -> Result<(), LogInitError> {
    let filter = build_env_filter(level)?;

    tracing_subscriber::registry()
        .with(stderr_layer(format))
        .with(filter)
        .try_init()
        .map_err(|e| LogInitError::SetGlobalError(e.to_string()))
}

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    }
}

/// Filter directive used when `RUST_LOG` is unset.
fn default_directive(level: Level) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_lowercase())
}

fn build_env_filter(level: Level) -> Result<EnvFilter, LogInitError> {
    let directive = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default_directive(level),
    };
    EnvFilter::try_new(&directive).map_err(|e| LogInitError::FilterError(e.to_string()))
}
