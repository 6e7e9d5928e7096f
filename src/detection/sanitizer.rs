//! Threat removal and neutralization for SVG content.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::detection::catalog::{self, PatternEntry};
use crate::detection::threat::{truncate_for_display, Threat, ThreatCategory};

/// Display width for removed-threat matches.
pub const REMOVED_DISPLAY_LEN: usize = 80;

/// Upper bound on full passes over the rule list.
///
/// Each pass is linear in the input, so sanitizing stays linear even when
/// every removal splices a new threat. Whatever survives the last pass is
/// left in place for the rescan to report.
pub const MAX_SANITIZE_PASSES: usize = 8;

/// Errors from file sanitization. Pattern application itself cannot fail.
#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("Failed to read input file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which threat categories to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Remove script elements and script URIs
    pub remove_scripts: bool,
    /// Remove `on*` event handler attributes
    pub remove_event_handlers: bool,
    /// Neutralize external URLs, remove foreignObject
    pub remove_external_refs: bool,
    /// All of the above plus DOCTYPE/ENTITY declarations
    pub remove_all: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self::remove_all()
    }
}

impl SanitizeOptions {
    /// Options that remove every sanitizable category.
    pub fn remove_all() -> Self {
        Self {
            remove_scripts: false,
            remove_event_handlers: false,
            remove_external_refs: false,
            remove_all: true,
        }
    }

    /// Options with nothing selected.
    pub fn none() -> Self {
        Self {
            remove_scripts: false,
            remove_event_handlers: false,
            remove_external_refs: false,
            remove_all: false,
        }
    }

    /// True when no category is selected.
    pub fn is_empty(&self) -> bool {
        self.categories().next().is_none()
    }

    /// Whether a category's removal rules are selected.
    pub fn selects(&self, category: ThreatCategory) -> bool {
        match category {
            ThreatCategory::Script => self.remove_all || self.remove_scripts,
            ThreatCategory::EventHandler => self.remove_all || self.remove_event_handlers,
            ThreatCategory::ExternalRef => self.remove_all || self.remove_external_refs,
            ThreatCategory::XmlEntity => self.remove_all,
            ThreatCategory::Animation | ThreatCategory::StyleBlock | ThreatCategory::Link => false,
        }
    }

    /// Selected categories in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = ThreatCategory> {
        let options = *self;
        ThreatCategory::ALL
            .into_iter()
            .filter(move |c| options.selects(*c))
    }
}

/// Result of sanitizing one file.
#[derive(Debug, Clone)]
pub struct SanitizeResult {
    input_path: PathBuf,
    output_path: PathBuf,
    threats_removed: Vec<Threat>,
}

impl SanitizeResult {
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn threats_removed(&self) -> &[Threat] {
        &self.threats_removed
    }

    /// True iff at least one threat was removed.
    pub fn sanitized(&self) -> bool {
        !self.threats_removed.is_empty()
    }
}

/// Sanitizer applying the selected removal rules in catalog order.
#[derive(Debug, Clone)]
pub struct SvgSanitizer {
    options: SanitizeOptions,
    rules: Vec<&'static PatternEntry>,
}

impl Default for SvgSanitizer {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}

impl SvgSanitizer {
    pub fn new(options: SanitizeOptions) -> Self {
        let rules = options
            .categories()
            .flat_map(catalog::removal_rules)
            .collect();
        Self { options, rules }
    }

    pub fn options(&self) -> SanitizeOptions {
        self.options
    }

    /// Remove or neutralize threats in memory.
    ///
    /// Each rule runs on the output of the previous one. The whole sequence is
    /// repeated until a pass finds nothing, so a removal that splices two
    /// fragments into a new threat is caught by the next pass. At most
    /// [`MAX_SANITIZE_PASSES`] passes run.
    pub fn sanitize_content(&self, content: &str) -> (String, Vec<Threat>) {
        let mut removed = Vec::new();
        let mut text = content.to_string();
        let mut passes = 0usize;

        loop {
            passes += 1;
            let before = removed.len();
            text = self
                .rules
                .iter()
                .fold(text, |current, rule| apply_rule(rule, current, &mut removed));
            if removed.len() == before {
                break;
            }
            if passes == MAX_SANITIZE_PASSES {
                warn!(passes, "Sanitize pass limit reached, leftovers remain for the rescan");
                break;
            }
        }

        debug!(
            passes,
            removed = removed.len(),
            bytes_in = content.len(),
            bytes_out = text.len(),
            "Content sanitized"
        );
        (text, removed)
    }

    /// Read `input`, sanitize it and write the result to `output`.
    ///
    /// Nothing is written when the input cannot be read.
    pub fn sanitize_file(&self, input: &Path, output: &Path) -> Result<SanitizeResult, SanitizeError> {
        let content = std::fs::read_to_string(input).map_err(|source| SanitizeError::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let (sanitized, threats_removed) = self.sanitize_content(&content);

        write_restricted(output, sanitized.as_bytes()).map_err(|source| SanitizeError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        info!(
            input = %input.display(),
            output = %output.display(),
            threats_removed = threats_removed.len(),
            "File sanitized"
        );

        Ok(SanitizeResult {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            threats_removed,
        })
    }
}

fn apply_rule(rule: &PatternEntry, text: String, removed: &mut Vec<Threat>) -> String {
    let before = removed.len();
    removed.extend(rule.find_all(&text).map(|matched| {
        Threat::new(
            rule.category(),
            rule.description(),
            &truncate_for_display(matched.trim(), REMOVED_DISPLAY_LEN),
        )
    }));
    if removed.len() == before {
        return text;
    }
    rule.apply(&text).into_owned()
}

/// Write a file readable and writable by the owner only.
fn write_restricted(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.flush()
}

/// Sanitize content with the given options.
pub fn sanitize_content(content: &str, options: SanitizeOptions) -> (String, Vec<Threat>) {
    SvgSanitizer::new(options).sanitize_content(content)
}

/// Sanitize a file with the given options.
pub fn sanitize_file(
    input: &Path,
    output: &Path,
    options: SanitizeOptions,
) -> Result<SanitizeResult, SanitizeError> {
    SvgSanitizer::new(options).sanitize_file(input, output)
}
