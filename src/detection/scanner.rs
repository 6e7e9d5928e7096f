//! Pattern-based SVG threat scanner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::detection::catalog;
use crate::detection::threat::{truncate_for_display, Severity, Threat, ThreatCategory};

/// Errors that can occur while scanning files.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{}': {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Scan strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanLevel {
    /// Evaluate every category.
    #[default]
    Strict,
    /// Evaluate only critical and high severity categories.
    Standard,
}

impl ScanLevel {
    /// Whether a category is evaluated at this level.
    pub fn includes(&self, category: ThreatCategory) -> bool {
        match self {
            ScanLevel::Strict => true,
            ScanLevel::Standard => category.severity() >= Severity::High,
        }
    }

    /// Categories evaluated at this level, in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = ThreatCategory> {
        let level = *self;
        ThreatCategory::ALL
            .into_iter()
            .filter(move |c| level.includes(*c))
    }
}

/// Result of scanning one SVG document.
#[derive(Debug, Clone)]
pub struct ScanResult {
    file_path: Option<PathBuf>,
    secure: bool,
    threats: Vec<Threat>,
    errors: Vec<String>,
}

impl ScanResult {
    /// An empty (secure) result, optionally tied to a file.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            secure: true,
            threats: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A result for a file that could not be scanned.
    pub fn failed(file_path: PathBuf, error: impl ToString) -> Self {
        Self {
            file_path: Some(file_path),
            secure: false,
            threats: Vec::new(),
            errors: vec![error.to_string()],
        }
    }

    pub(crate) fn record(&mut self, threat: Threat) {
        self.secure = false;
        self.threats.push(threat);
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Display name for the scanned source.
    pub fn display_path(&self) -> String {
        self.file_path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    /// False once any threat was recorded or the file could not be scanned.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// True when the result is secure and carries no errors.
    pub fn is_successful(&self) -> bool {
        self.secure && self.errors.is_empty()
    }

    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Number of threats of one category.
    pub fn count(&self, category: ThreatCategory) -> usize {
        self.threats
            .iter()
            .filter(|t| t.category() == category)
            .count()
    }

    /// Per-category counts, derived from the threat list.
    pub fn threat_counts(&self) -> BTreeMap<ThreatCategory, usize> {
        let mut counts = BTreeMap::new();
        for threat in &self.threats {
            *counts.entry(threat.category()).or_insert(0) += 1;
        }
        counts
    }

    /// Highest severity among the threats found.
    pub fn highest_severity(&self) -> Option<Severity> {
        Threat::max_severity(&self.threats)
    }
}

/// Scanner applying the pattern catalog at a given level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgScanner {
    level: ScanLevel,
}

impl SvgScanner {
    pub fn new(level: ScanLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> ScanLevel {
        self.level
    }

    /// Scan in-memory content. Never touches the filesystem.
    pub fn scan(&self, content: &str) -> ScanResult {
        self.scan_into(content, ScanResult::new(None))
    }

    /// Scan content that was read from `path`.
    pub fn scan_named(&self, path: &Path, content: &str) -> ScanResult {
        self.scan_into(content, ScanResult::new(Some(path.to_path_buf())))
    }

    fn scan_into(&self, content: &str, mut result: ScanResult) -> ScanResult {
        for category in self.level.categories() {
            for rule in catalog::detection_rules(category) {
                for matched in rule.find_all(content) {
                    let display = truncate_for_display(matched.trim(), rule.display_len());
                    result.record(Threat::new(category, rule.description(), &display));
                }
            }
        }
        result
    }

    /// Read and scan one file.
    pub fn scan_file(&self, path: &Path) -> Result<ScanResult, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let result = self.scan_named(path, &content);
        debug!(
            path = %path.display(),
            threat_count = result.threats().len(),
            "File scanned"
        );
        Ok(result)
    }

    /// Scan every `.svg` file in a directory, optionally descending into subdirectories.
    ///
    /// A file that cannot be read yields a failed result for that file only.
    /// Results are ordered by path.
    pub fn scan_directory(&self, dir: &Path, recursive: bool) -> Result<Vec<ScanResult>, ScanError> {
        let files = list_svg_files(dir, recursive)?;
        debug!(dir = %dir.display(), recursive, file_count = files.len(), "SVG files listed");

        let results = files
            .into_iter()
            .map(|path| match self.scan_file(&path) {
                Ok(result) => result,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                    ScanResult::failed(path, e)
                }
            })
            .collect();
        Ok(results)
    }
}

/// True if the path has a `.svg` extension, ignoring case.
pub fn is_svg_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// List `.svg` files under `dir`, sorted by path.
pub fn list_svg_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && is_svg_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    } else {
        let read_dir = std::fs::read_dir(dir).map_err(|source| ScanError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in read_dir {
            let entry = entry.map_err(|source| ScanError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && is_svg_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
