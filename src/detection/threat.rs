//! Threat categories, severity classification and report status mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a threat category.
///
/// Ordered from least to most severe so that `max()` yields the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or policy concern (style blocks)
    Low,
    /// Unnecessary for a static icon (animations, anchors)
    Medium,
    /// Loads or resolves content outside the file
    High,
    /// Executes code in the viewer
    Critical,
}

impl Severity {
    /// Lowercase name used in reports and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Get the report status a category of this severity receives when it has findings.
    pub fn default_status(&self) -> Status {
        match self {
            Severity::Critical | Severity::High => Status::NoGo,
            Severity::Medium | Severity::Low => Status::Warn,
        }
    }

    /// Icon used for findings and action items of this severity.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Critical | Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🟢",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Go/No-Go verdict for a report or a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "NO-GO")]
    NoGo,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "SKIP")]
    Skip,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Go => "GO",
            Status::NoGo => "NO-GO",
            Status::Warn => "WARN",
            Status::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of SVG threat categories.
///
/// Declaration order is the catalog order: critical first, then high,
/// then the categories only evaluated by a strict scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// `<script>` elements and script-capable URI schemes
    Script,
    /// `on*` event handler attributes
    EventHandler,
    /// External URLs, `<foreignObject>`, external `<use>` targets
    ExternalRef,
    /// DOCTYPE and ENTITY declarations (XXE)
    XmlEntity,
    /// `<animate*>` and `<set>` elements
    Animation,
    /// `<style>` elements
    StyleBlock,
    /// `<a href>` elements
    Link,
}

impl ThreatCategory {
    /// All categories in catalog order.
    pub const ALL: [ThreatCategory; 7] = [
        ThreatCategory::Script,
        ThreatCategory::EventHandler,
        ThreatCategory::ExternalRef,
        ThreatCategory::XmlEntity,
        ThreatCategory::Animation,
        ThreatCategory::StyleBlock,
        ThreatCategory::Link,
    ];

    /// Fixed severity of the category.
    pub fn severity(&self) -> Severity {
        match self {
            ThreatCategory::Script | ThreatCategory::EventHandler => Severity::Critical,
            ThreatCategory::ExternalRef | ThreatCategory::XmlEntity => Severity::High,
            ThreatCategory::Animation | ThreatCategory::Link => Severity::Medium,
            ThreatCategory::StyleBlock => Severity::Low,
        }
    }

    /// Stable machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Script => "script",
            ThreatCategory::EventHandler => "event_handler",
            ThreatCategory::ExternalRef => "external_ref",
            ThreatCategory::XmlEntity => "xml_entity",
            ThreatCategory::Animation => "animation",
            ThreatCategory::StyleBlock => "style_block",
            ThreatCategory::Link => "link",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected occurrence of potentially malicious SVG content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Threat {
    category: ThreatCategory,
    description: String,
    matched: String,
}

impl Threat {
    /// Create a threat. `matched` is stored as given; truncate it first with
    /// [`truncate_for_display`] if it came straight from a pattern match.
    pub fn new(category: ThreatCategory, description: &str, matched: &str) -> Self {
        Self {
            category,
            description: description.to_string(),
            matched: matched.to_string(),
        }
    }

    pub fn category(&self) -> ThreatCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.category.severity()
    }

    /// Get the human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the display-safe (possibly truncated) matched text.
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// Get the highest severity among a list of threats.
    pub fn max_severity(threats: &[Threat]) -> Option<Severity> {
        threats.iter().map(Threat::severity).max()
    }
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity(),
            self.category,
            self.description,
            self.matched
        )
    }
}

/// Marker appended to truncated matches.
pub const ELLIPSIS: &str = "...";

/// Cap `text` at `max_chars` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
