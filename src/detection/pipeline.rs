//! Detection pipeline orchestration: scan, sanitize, rescan.

use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

use crate::detection::sanitizer::{SanitizeOptions, SvgSanitizer};
use crate::detection::scanner::{ScanError, ScanLevel, ScanResult, SvgScanner};
use crate::detection::threat::{Severity, Status, Threat};

/// Pipeline configuration options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    /// Level used for both the initial scan and the rescan
    pub level: ScanLevel,
    /// Categories removed by [`SecurityPipeline::clean`]
    pub sanitize: SanitizeOptions,
}

/// Scans content and optionally feeds the findings through the sanitizer.
#[derive(Debug, Clone)]
pub struct SecurityPipeline {
    scanner: SvgScanner,
    sanitizer: SvgSanitizer,
}

impl Default for SecurityPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl SecurityPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            scanner: SvgScanner::new(config.level),
            sanitizer: SvgSanitizer::new(config.sanitize),
        }
    }

    pub fn scanner(&self) -> &SvgScanner {
        &self.scanner
    }

    pub fn sanitizer(&self) -> &SvgSanitizer {
        &self.sanitizer
    }

    /// Analyze content for threats.
    pub fn analyze(&self, content: &str) -> DetectionResult {
        DetectionResult {
            scan: self.scanner.scan(content),
            content_hash: compute_sha256(content),
        }
    }

    /// Analyze a file for threats.
    pub fn analyze_file(&self, path: &Path) -> Result<DetectionResult, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DetectionResult {
            scan: self.scanner.scan_named(path, &content),
            content_hash: compute_sha256(&content),
        })
    }

    /// Sanitize content, then rescan the output.
    pub fn clean(&self, content: &str) -> CleanOutcome {
        let (sanitized, removed) = self.sanitizer.sanitize_content(content);
        let residual = self.scanner.scan(&sanitized);
        debug!(
            removed = removed.len(),
            residual = residual.threats().len(),
            "Remove-then-rescan complete"
        );
        CleanOutcome {
            input_hash: compute_sha256(content),
            output_hash: compute_sha256(&sanitized),
            sanitized,
            removed,
            residual,
        }
    }
}

/// Result from [`SecurityPipeline::analyze`].
#[derive(Debug, Clone)]
pub struct DetectionResult {
    scan: ScanResult,
    content_hash: String,
}

impl DetectionResult {
    /// Check if any threats were detected.
    pub fn is_threat(&self) -> bool {
        !self.scan.threats().is_empty()
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    /// Get the highest severity found.
    pub fn severity(&self) -> Option<Severity> {
        self.scan.highest_severity()
    }

    /// Get the verdict a report would give this content alone.
    pub fn status(&self) -> Status {
        self.severity().map_or(Status::Go, |s| s.default_status())
    }

    /// Get the number of threats found.
    pub fn threat_count(&self) -> usize {
        self.scan.threats().len()
    }

    /// Get the content hash (SHA-256).
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Generate a human-readable report.
    pub fn report(&self) -> String {
        if !self.is_threat() {
            return "No threats detected.".to_string();
        }

        let mut report = format!("Threats: {}\n\n", self.threat_count());
        for threat in self.scan.threats() {
            report.push_str(&format!("- {}\n", threat));
        }
        report
    }
}

/// Result from [`SecurityPipeline::clean`].
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    sanitized: String,
    removed: Vec<Threat>,
    residual: ScanResult,
    input_hash: String,
    output_hash: String,
}

impl CleanOutcome {
    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    pub fn removed(&self) -> &[Threat] {
        &self.removed
    }

    /// Scan of the sanitized output.
    pub fn residual(&self) -> &ScanResult {
        &self.residual
    }

    /// True when the rescan found nothing.
    pub fn is_clean(&self) -> bool {
        self.residual.is_secure()
    }

    pub fn input_hash(&self) -> &str {
        &self.input_hash
    }

    pub fn output_hash(&self) -> &str {
        &self.output_hash
    }

    /// True when sanitizing changed the content.
    pub fn changed(&self) -> bool {
        self.input_hash != self.output_hash
    }
}

pub fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
