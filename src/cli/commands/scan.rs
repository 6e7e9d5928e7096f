use anyhow::Context;
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, info_span};

use crate::cli::args::{OutputFormat, EXIT_CLEAN, EXIT_THREAT};
use crate::config::settings::Config;
use crate::detection::pipeline::{PipelineConfig, SecurityPipeline};
use crate::detection::scanner::{ScanLevel, ScanResult};
use crate::detection::threat::Severity;
use crate::logging::audit::AuditLog;

/// Options for one `scan` invocation after merging CLI flags and config.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub level: ScanLevel,
    pub recursive: bool,
    pub format: OutputFormat,
    pub quiet: bool,
}

pub fn cmd_scan(config: &Config, path: &Path, options: ScanOptions) -> anyhow::Result<ExitCode> {
    let _span = info_span!("scan", path = %path.display(), level = ?options.level).entered();

    let pipeline = SecurityPipeline::new(PipelineConfig {
        level: options.level,
        sanitize: config.sanitize,
    });

    let start = Instant::now();
    let (results, content_hash) = if path.is_dir() {
        let results = pipeline
            .scanner()
            .scan_directory(path, options.recursive)
            .with_context(|| format!("Failed to scan directory '{}'", path.display()))?;
        (results, None)
    } else {
        let detection = pipeline
            .analyze_file(path)
            .with_context(|| format!("Failed to scan '{}'", path.display()))?;
        let hash = detection.content_hash().to_string();
        (vec![detection.scan().clone()], Some(hash))
    };

    let total_threats: usize = results.iter().map(|r| r.threats().len()).sum();
    let failed = results.iter().filter(|r| !r.is_successful()).count();
    info!(
        file_count = results.len(),
        threat_count = total_threats,
        duration_ms = start.elapsed().as_millis() as u64,
        "Scan complete"
    );

    if let Some(audit) = AuditLog::from_settings(&config.audit) {
        audit.record_or_warn(
            "scan",
            &format!(
                "{}: {} file(s), {} threat(s), level {:?}",
                path.display(),
                results.len(),
                total_threats,
                options.level
            ),
        );
    }

    if !options.quiet {
        match options.format {
            OutputFormat::Text => print_text(&results, total_threats, failed),
            OutputFormat::Json => print_json(&results, content_hash.as_deref())?,
        }
    }

    Ok(if failed == 0 {
        ExitCode::from(EXIT_CLEAN)
    } else {
        ExitCode::from(EXIT_THREAT)
    })
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("[{}]", severity);
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.green(),
    }
}

fn print_text(results: &[ScanResult], total_threats: usize, failed: usize) {
    for result in results {
        if result.is_successful() {
            println!("{} {}", "✓".green(), result.display_path());
            continue;
        }
        println!("{} {}", "✗".red().bold(), result.display_path());
        for threat in result.threats() {
            println!(
                "    {} {}: {} - {}",
                severity_label(threat.severity()),
                threat.category(),
                threat.description(),
                threat.matched()
            );
        }
        for error in result.errors() {
            println!("    {} {}", "error:".red(), error);
        }
    }

    println!();
    println!(
        "{} file(s) scanned, {} with threats, {} threat(s) found",
        results.len(),
        failed,
        total_threats
    );
}

fn print_json(results: &[ScanResult], content_hash: Option<&str>) -> anyhow::Result<()> {
    let files: Vec<_> = results
        .iter()
        .map(|r| {
            let threats: Vec<_> = r
                .threats()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "category": t.category(),
                        "severity": t.severity(),
                        "description": t.description(),
                        "matched": t.matched(),
                    })
                })
                .collect();
            serde_json::json!({
                "file": r.display_path(),
                "secure": r.is_secure(),
                "threat_count": r.threats().len(),
                "threats": threats,
                "errors": r.errors(),
            })
        })
        .collect();

    let mut json = serde_json::json!({
        "files_scanned": results.len(),
        "secure_files": results.iter().filter(|r| r.is_successful()).count(),
        "results": files,
    });
    if let Some(hash) = content_hash {
        json["content_hash"] = serde_json::Value::from(hash);
    }
    debug!("Emitting JSON scan output");
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
