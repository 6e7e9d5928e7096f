//! Severity-weighted Go/No-Go report over a batch of scan results.
//!
//! The JSON layout follows the multi-agent team-report schema: a summary
//! block of counters, one "team" section per threat category, and a footer
//! of action items when the batch is not clean.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detection::scanner::ScanResult;
use crate::detection::threat::{Severity, Status, ThreatCategory};

pub const REPORT_SCHEMA: &str = "https://raw.githubusercontent.com/agentplexus/multi-agent-spec/main/schema/report/team-report.schema.json";
pub const REPORT_TITLE: &str = "SVG SECURITY SCAN REPORT";
pub const REPORT_PHASE: &str = "SECURITY VALIDATION";
pub const DEFAULT_GENERATED_BY: &str = "svgguard security-scan";

/// Findings listed per section before the list is cut off.
pub const MAX_FINDINGS_PER_SECTION: usize = 10;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregate counters, not serialized directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_files: usize,
    pub secure_files: usize,
    pub threat_counts: BTreeMap<ThreatCategory, usize>,
}

impl Summary {
    pub fn total_threats(&self) -> usize {
        self.threat_counts.values().sum()
    }

    pub fn count(&self, category: ThreatCategory) -> usize {
        self.threat_counts.get(&category).copied().unwrap_or(0)
    }
}

/// The full security scan report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub title: String,
    pub project: String,
    pub version: String,
    pub phase: String,
    pub status: Status,
    pub generated_at: String,
    pub generated_by: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summary_blocks: Vec<ContentBlock>,
    pub teams: Vec<TeamSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footer_blocks: Vec<ContentBlock>,
    #[serde(skip)]
    pub summary: Summary,
}

/// One report section per threat category.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSection {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub tasks: Vec<TaskResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content_blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub id: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<KvPair>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn section_meta(category: ThreatCategory) -> (&'static str, &'static str) {
    match category {
        ThreatCategory::Script => ("script-detection", "Script Detection"),
        ThreatCategory::EventHandler => ("event-handler-detection", "Event Handler Detection"),
        ThreatCategory::ExternalRef => ("external-ref-detection", "External Reference Detection"),
        ThreatCategory::XmlEntity => ("xml-entity-detection", "XML Entity Detection"),
        ThreatCategory::Animation => ("animation-detection", "Animation Detection"),
        ThreatCategory::StyleBlock => ("style-block-detection", "Style Block Detection"),
        ThreatCategory::Link => ("link-detection", "Link Detection"),
    }
}

/// Overall verdict for a set of per-category counts.
pub fn overall_status(summary: &Summary) -> Status {
    if summary.total_threats() == 0 {
        return Status::Go;
    }
    let blocking = summary
        .threat_counts
        .iter()
        .any(|(category, count)| *count > 0 && category.severity() >= Severity::High);
    if blocking {
        Status::NoGo
    } else {
        Status::Warn
    }
}

fn summarize(results: &[ScanResult]) -> Summary {
    let mut summary = Summary {
        total_files: results.len(),
        ..Summary::default()
    };
    for result in results {
        if result.is_successful() {
            summary.secure_files += 1;
        }
        for threat in result.threats() {
            *summary.threat_counts.entry(threat.category()).or_insert(0) += 1;
        }
    }
    summary
}

fn kv(key: &str, value: impl ToString, icon: Option<&str>) -> KvPair {
    KvPair {
        key: key.to_string(),
        value: value.to_string(),
        icon: icon.map(str::to_string),
    }
}

fn build_section(category: ThreatCategory, count: usize, results: &[ScanResult]) -> TeamSection {
    let (id, name) = section_meta(category);
    let severity = category.severity();

    if count == 0 {
        return TeamSection {
            id: id.to_string(),
            name: name.to_string(),
            status: Status::Go,
            tasks: vec![TaskResult {
                id: "scan".to_string(),
                status: Status::Go,
                severity: None,
                detail: "No threats detected".to_string(),
            }],
            content_blocks: Vec::new(),
        };
    }

    let status = severity.default_status();
    let findings = results.iter().flat_map(|r| {
        r.threats()
            .iter()
            .filter(|t| t.category() == category)
            .map(move |t| format!("{}: {}", r.display_path(), t.description()))
    });

    let mut items: Vec<ListItem> = findings
        .take(MAX_FINDINGS_PER_SECTION + 1)
        .map(|text| ListItem {
            text,
            icon: Some(severity.icon().to_string()),
        })
        .collect();
    if items.len() > MAX_FINDINGS_PER_SECTION {
        items.truncate(MAX_FINDINGS_PER_SECTION);
        items.push(ListItem {
            text: "and more...".to_string(),
            icon: Some("...".to_string()),
        });
    }

    TeamSection {
        id: id.to_string(),
        name: name.to_string(),
        status,
        tasks: vec![TaskResult {
            id: "scan".to_string(),
            status,
            severity: Some(severity),
            detail: format!("{} threat(s) detected", count),
        }],
        content_blocks: vec![ContentBlock {
            block_type: "list".to_string(),
            title: Some("Findings".to_string()),
            pairs: Vec::new(),
            items,
        }],
    }
}

/// Remediation lines in fixed severity order.
fn action_items(summary: &Summary) -> Vec<KvPair> {
    use ThreatCategory::*;

    let has = |categories: &[ThreatCategory]| categories.iter().any(|c| summary.count(*c) > 0);
    let candidates: [(bool, Severity, &str); 6] = [
        (
            has(&[Script, EventHandler]),
            Severity::Critical,
            "Remove all script elements and event handlers (CRITICAL)",
        ),
        (
            has(&[ExternalRef]),
            Severity::High,
            "Remove external references and foreignObject elements (HIGH)",
        ),
        (
            has(&[XmlEntity]),
            Severity::High,
            "Remove DOCTYPE and ENTITY declarations (HIGH)",
        ),
        (
            has(&[Animation]),
            Severity::Medium,
            "Remove animation elements for static images (MEDIUM)",
        ),
        (
            has(&[StyleBlock]),
            Severity::Low,
            "Consider inlining styles and removing style blocks (LOW)",
        ),
        (
            has(&[Link]),
            Severity::Medium,
            "Remove anchor elements for static images (MEDIUM)",
        ),
    ];

    candidates
        .into_iter()
        .filter(|(present, _, _)| *present)
        .enumerate()
        .map(|(i, (_, severity, text))| kv(&(i + 1).to_string(), text, Some(severity.icon())))
        .collect()
}

impl Report {
    /// Aggregate scan results into a report.
    ///
    /// An empty result list has no threats and is GO.
    pub fn generate(results: &[ScanResult], project: &str, version: &str) -> Self {
        let summary = summarize(results);
        let status = overall_status(&summary);

        let summary_blocks = vec![ContentBlock {
            block_type: "kv_pairs".to_string(),
            title: None,
            pairs: vec![
                kv("Files Scanned", summary.total_files, None),
                kv("Secure Files", summary.secure_files, None),
                kv(
                    "Files with Threats",
                    summary.total_files - summary.secure_files,
                    None,
                ),
                kv("Total Threats", summary.total_threats(), None),
            ],
            items: Vec::new(),
        }];

        let teams = ThreatCategory::ALL
            .into_iter()
            .map(|category| build_section(category, summary.count(category), results))
            .collect();

        let footer_blocks = if status == Status::Go || summary.total_threats() == 0 {
            Vec::new()
        } else {
            vec![ContentBlock {
                block_type: "kv_pairs".to_string(),
                title: Some("ACTION ITEMS".to_string()),
                pairs: action_items(&summary),
                items: Vec::new(),
            }]
        };

        Self {
            schema: REPORT_SCHEMA.to_string(),
            title: REPORT_TITLE.to_string(),
            project: project.to_string(),
            version: version.to_string(),
            phase: REPORT_PHASE.to_string(),
            status,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            generated_by: DEFAULT_GENERATED_BY.to_string(),
            summary_blocks,
            teams,
            footer_blocks,
            summary,
        }
    }

    /// Override the `generated_by` field.
    pub fn with_generated_by(mut self, generated_by: &str) -> Self {
        self.generated_by = generated_by.to_string();
        self
    }

    /// Section for a category.
    pub fn section(&self, category: ThreatCategory) -> Option<&TeamSection> {
        let (id, _) = section_meta(category);
        self.teams.iter().find(|t| t.id == id)
    }

    /// Action item texts, in order.
    pub fn action_items(&self) -> Vec<&str> {
        self.footer_blocks
            .iter()
            .flat_map(|b| b.pairs.iter().map(|p| p.value.as_str()))
            .collect()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Aggregate scan results into a report.
pub fn generate_report(results: &[ScanResult], project: &str, version: &str) -> Report {
    Report::generate(results, project, version)
}
