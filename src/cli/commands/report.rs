use anyhow::Context;
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, info_span};

use crate::cli::args::{EXIT_CLEAN, EXIT_THREAT};
use crate::config::settings::Config;
use crate::detection::scanner::{ScanLevel, SvgScanner};
use crate::detection::threat::Status;
use crate::logging::audit::AuditLog;
use crate::report::Report;

/// Options for one `report` invocation; `None` falls back to config.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub recursive: bool,
    pub level: Option<ScanLevel>,
    pub project: Option<String>,
    pub version: Option<String>,
}

pub fn cmd_report(
    config: &Config,
    path: &Path,
    options: ReportOptions,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let _span = info_span!("report", path = %path.display()).entered();

    let scanner = SvgScanner::new(options.level.unwrap_or(config.scan.level));
    let results = if path.is_dir() {
        scanner
            .scan_directory(path, options.recursive || config.scan.recursive)
            .with_context(|| format!("Failed to scan directory '{}'", path.display()))?
    } else {
        vec![scanner
            .scan_file(path)
            .with_context(|| format!("Failed to scan '{}'", path.display()))?]
    };

    let project = options.project.as_deref().unwrap_or(&config.report.project);
    let version = options.version.as_deref().unwrap_or(&config.report.version);
    let report = Report::generate(&results, project, version)
        .with_generated_by(&config.report.generated_by);

    info!(
        status = %report.status,
        files = report.summary.total_files,
        threats = report.summary.total_threats(),
        "Report generated"
    );

    if let Some(audit) = AuditLog::from_settings(&config.audit) {
        audit.record_or_warn(
            "report",
            &format!(
                "{}: status {}, {} file(s), {} threat(s)",
                path.display(),
                report.status,
                report.summary.total_files,
                report.summary.total_threats()
            ),
        );
    }

    match output {
        Some(out) => {
            report
                .write_to(out)
                .with_context(|| format!("Failed to write report to '{}'", out.display()))?;
            let status = match report.status {
                Status::Go => report.status.to_string().green().bold(),
                Status::Warn => report.status.to_string().yellow().bold(),
                _ => report.status.to_string().red().bold(),
            };
            println!("Report written to {} ({})", out.display(), status);
        }
        None => println!("{}", report.to_json()?),
    }

    Ok(if report.status == Status::Go {
        ExitCode::from(EXIT_CLEAN)
    } else {
        ExitCode::from(EXIT_THREAT)
    })
}
