//! Sanitize command: remove threats from one SVG file and rescan the output.

use anyhow::Context;
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, info_span, warn};

use crate::cli::args::{RemovalFlags, EXIT_CLEAN, EXIT_THREAT};
use crate::config::settings::Config;
use crate::detection::pipeline::{PipelineConfig, SecurityPipeline};
use crate::detection::sanitizer::SanitizeOptions;
use crate::logging::audit::AuditLog;

/// Resolve removal options: explicit flags win, then config, then everything.
pub fn resolve_options(flags: RemovalFlags, config: &Config) -> SanitizeOptions {
    if !flags.is_empty() {
        return SanitizeOptions {
            remove_scripts: flags.scripts,
            remove_event_handlers: flags.event_handlers,
            remove_external_refs: flags.external_refs,
            remove_all: flags.all,
        };
    }
    if config.sanitize.is_empty() {
        SanitizeOptions::remove_all()
    } else {
        config.sanitize
    }
}

pub fn cmd_sanitize(
    config: &Config,
    input: &Path,
    output: &Path,
    flags: RemovalFlags,
) -> anyhow::Result<ExitCode> {
    let _span = info_span!("sanitize", input = %input.display(), output = %output.display()).entered();

    let options = resolve_options(flags, config);
    let pipeline = SecurityPipeline::new(PipelineConfig {
        level: config.scan.level,
        sanitize: options,
    });

    let result = pipeline
        .sanitizer()
        .sanitize_file(input, output)
        .with_context(|| format!("Failed to sanitize '{}'", input.display()))?;

    for threat in result.threats_removed() {
        println!(
            "  {} [{}] {}: {}",
            "-".red(),
            threat.severity(),
            threat.category(),
            threat.matched()
        );
    }
    println!(
        "{} {} threat(s) removed, written to {}",
        "✓".green(),
        result.threats_removed().len(),
        result.output_path().display()
    );

    // Rescan what was written
    let rescan = pipeline
        .analyze_file(output)
        .with_context(|| format!("Failed to rescan '{}'", output.display()))?;

    let (residual, untouched): (Vec<_>, Vec<_>) = rescan
        .scan()
        .threats()
        .iter()
        .partition(|t| options.selects(t.category()));

    for threat in &untouched {
        println!(
            "  {} {} not removed: {}",
            "!".yellow(),
            threat.category(),
            threat.matched()
        );
    }

    if let Some(audit) = AuditLog::from_settings(&config.audit) {
        audit.record_or_warn(
            "sanitize",
            &format!(
                "{} -> {}: {} threat(s) removed, {} remaining",
                input.display(),
                output.display(),
                result.threats_removed().len(),
                rescan.threat_count()
            ),
        );
    }

    info!(
        removed = result.threats_removed().len(),
        residual = residual.len(),
        untouched = untouched.len(),
        content_hash = %rescan.content_hash(),
        "Sanitize complete"
    );

    if residual.is_empty() {
        Ok(ExitCode::from(EXIT_CLEAN))
    } else {
        warn!(count = residual.len(), "Threats remain after sanitizing");
        for threat in &residual {
            println!("  {} {}", "✗".red().bold(), threat);
        }
        Ok(ExitCode::from(EXIT_THREAT))
    }
}
