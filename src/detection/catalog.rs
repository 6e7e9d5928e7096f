//! Declarative threat pattern catalog.
//!
//! One table drives both the scanner and the sanitizer. Each entry names its
//! category, a description, the display length used for scan findings, and
//! whether it is used for detection, removal, or both. Removal entries carry
//! a [`Replacement`] describing how a match is rewritten.
//!
//! Every removal replacement is strictly shorter than the text it replaces,
//! and every detection pattern of a removable category is covered by some
//! removal pattern. The sanitizer relies on both properties.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::detection::threat::ThreatCategory;

/// Placeholder written into neutralized attribute values.
pub const SAFE_HREF: &str = "#";

/// Placeholder written into neutralized `url(...)` arguments.
pub const SAFE_URL: &str = "none";

/// How a removal match is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Delete the whole match.
    Delete,
    /// Keep the attribute name (group `attr`) and its quote style, replace the value with `#`.
    NeutralizeValue,
    /// Keep the `url(` prefix (group `attr`), replace the URL with `none`.
    NeutralizeUrl,
}

/// Whether an entry participates in scanning, sanitizing, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Detect,
    Remove(Replacement),
    DetectAndRemove(Replacement),
}

/// One row of the catalog.
#[derive(Debug)]
pub struct PatternEntry {
    category: ThreatCategory,
    description: &'static str,
    display_len: usize,
    role: Role,
    pattern: Regex,
}

impl PatternEntry {
    pub fn category(&self) -> ThreatCategory {
        self.category
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Maximum characters of a match shown in scan findings.
    pub fn display_len(&self) -> usize {
        self.display_len
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn detects(&self) -> bool {
        matches!(self.role, Role::Detect | Role::DetectAndRemove(_))
    }

    /// Replacement used by the sanitizer, `None` for detect-only entries.
    pub fn replacement(&self) -> Option<Replacement> {
        match self.role {
            Role::Detect => None,
            Role::Remove(r) | Role::DetectAndRemove(r) => Some(r),
        }
    }

    /// Iterate over the matched text of every non-overlapping match.
    pub fn find_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }

    /// Rewrite every match according to the entry's replacement.
    ///
    /// Detect-only entries leave the text untouched.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.replacement() {
            None => Cow::Borrowed(text),
            Some(Replacement::Delete) => self.pattern.replace_all(text, ""),
            Some(Replacement::NeutralizeValue) => {
                self.pattern.replace_all(text, |caps: &Captures| neutralize_value(caps))
            }
            Some(Replacement::NeutralizeUrl) => {
                self.pattern.replace_all(text, |caps: &Captures| neutralize_url(caps))
            }
        }
    }
}

fn attr_prefix<'c>(caps: &'c Captures) -> (&'c str, &'c str) {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    let prefix_len = caps.name("attr").map_or(0, |m| m.as_str().len());
    whole.split_at(prefix_len)
}

fn neutralize_value(caps: &Captures) -> String {
    let (attr, value) = attr_prefix(caps);
    match value.chars().next() {
        Some(quote @ ('"' | '\'')) => format!("{attr}{quote}{SAFE_HREF}{quote}"),
        _ => format!("{attr}{SAFE_HREF}"),
    }
}

fn neutralize_url(caps: &Captures) -> String {
    let (prefix, _) = attr_prefix(caps);
    format!("{prefix}{SAFE_URL}")
}

/// Pattern for an attribute whose value starts with `scheme`, in double-,
/// single- or unquoted form. The attribute name and `=` are captured as `attr`.
fn attribute_value(attr: &str, scheme: &str) -> String {
    format!(
        r#"(?i)(?P<attr>{attr}\s*=\s*)(?:"\s*{scheme}[^"]*"|'\s*{scheme}[^']*'|{scheme}[^\s"'>]*)"#
    )
}

fn compile(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid catalog pattern `{source}`: {e}"))
}

fn entry(
    category: ThreatCategory,
    description: &'static str,
    display_len: usize,
    role: Role,
    source: &str,
) -> PatternEntry {
    PatternEntry {
        category,
        description,
        display_len,
        role,
        pattern: compile(source),
    }
}

const SCRIPT_ATTRS: &str = r"\b(?:xlink:)?(?:href|src)";
const JAVASCRIPT: &str = r"javascript\s*:";
const VBSCRIPT: &str = r"vbscript\s*:";
const DATA_HTML: &str = r"data\s*:\s*text/html";
const EXTERNAL: &str = r"https?://";

static CATALOG: LazyLock<Vec<PatternEntry>> = LazyLock::new(build_catalog);

#[rustfmt::skip]
fn build_catalog() -> Vec<PatternEntry> {
    use Replacement::*;
    use Role::*;
    use ThreatCategory::*;

    vec![
        // Script
        entry(Script, "script element", 100, DetectAndRemove(Delete),
            r"(?is)<script\b(?:[^>]*[^>/])?>.*?</script\s*>"),
        entry(Script, "self-closing script element", 50, DetectAndRemove(Delete),
            r"(?i)<script\b[^>]*/>"),
        entry(Script, "unterminated script element", 50, Remove(Delete),
            r"(?i)<script\b[^>]*>?"),
        entry(Script, "javascript: URI", 30, DetectAndRemove(NeutralizeValue),
            &attribute_value(SCRIPT_ATTRS, JAVASCRIPT)),
        entry(Script, "vbscript: URI", 30, DetectAndRemove(NeutralizeValue),
            &attribute_value(SCRIPT_ATTRS, VBSCRIPT)),
        entry(Script, "data:text/html URI", 50, DetectAndRemove(NeutralizeValue),
            &attribute_value(SCRIPT_ATTRS, DATA_HTML)),
        // EventHandler
        entry(EventHandler, "event handler attribute", 80, DetectAndRemove(Delete),
            r#"(?i)\s+on[a-z]+\s*=\s*"[^"]*""#),
        entry(EventHandler, "event handler attribute", 80, DetectAndRemove(Delete),
            r"(?i)\s+on[a-z]+\s*=\s*'[^']*'"),
        entry(EventHandler, "unquoted event handler attribute", 60, DetectAndRemove(Delete),
            r#"(?i)\s+on[a-z]+\s*=\s*[^\s>"']+"#),
        // ExternalRef
        entry(ExternalRef, "external href", 100, DetectAndRemove(NeutralizeValue),
            &attribute_value(r"\shref", EXTERNAL)),
        entry(ExternalRef, "external xlink:href", 100, DetectAndRemove(NeutralizeValue),
            &attribute_value(r"\bxlink:href", EXTERNAL)),
        entry(ExternalRef, "foreignObject element", 50, Detect,
            r"(?i)<foreignObject\b"),
        entry(ExternalRef, "foreignObject element", 50, Remove(Delete),
            r"(?is)<foreignObject\b(?:[^>]*[^>/])?>.*?</foreignObject\s*>"),
        entry(ExternalRef, "self-closing foreignObject", 50, Remove(Delete),
            r"(?i)<foreignObject\b[^>]*/>"),
        entry(ExternalRef, "unterminated foreignObject element", 50, Remove(Delete),
            r"(?i)<foreignObject\b[^>]*>?"),
        entry(ExternalRef, "orphaned foreignObject closing tag", 50, Remove(Delete),
            r"(?i)</foreignObject\s*>"),
        entry(ExternalRef, "external URL in style", 100, DetectAndRemove(NeutralizeUrl),
            r#"(?i)(?P<attr>url\s*\(\s*["']?)\s*https?://[^)"']*"#),
        entry(ExternalRef, "external use reference", 100, Detect,
            r#"(?i)<use\b[^>]*\s(?:xlink:)?href\s*=\s*(?:"\s*https?://[^"]*"|'\s*https?://[^']*'|https?://)"#),
        // XmlEntity
        entry(XmlEntity, "DOCTYPE declaration", 50, Detect,
            r"(?i)<!DOCTYPE\b"),
        entry(XmlEntity, "ENTITY declaration", 50, Detect,
            r"(?i)<!ENTITY\b"),
        entry(XmlEntity, "DOCTYPE declaration with internal subset", 50, Remove(Delete),
            r"(?is)<!DOCTYPE\b[^\[>]*\[.*?\]\s*>"),
        entry(XmlEntity, "DOCTYPE declaration", 50, Remove(Delete),
            r#"(?i)<!DOCTYPE\b(?:[^>"'\[]|"[^"]*"|'[^']*')*>"#),
        entry(XmlEntity, "ENTITY declaration", 50, Remove(Delete),
            r#"(?i)<!ENTITY\b(?:[^>"']|"[^"]*"|'[^']*')*>"#),
        entry(XmlEntity, "unterminated DOCTYPE declaration", 50, Remove(Delete),
            r"(?i)<!DOCTYPE\b[^>]*>?"),
        entry(XmlEntity, "unterminated ENTITY declaration", 50, Remove(Delete),
            r"(?i)<!ENTITY\b[^>]*>?"),
        // Animation
        entry(Animation, "animate element", 50, Detect, r"(?i)<animate\b"),
        entry(Animation, "animateTransform element", 50, Detect, r"(?i)<animateTransform\b"),
        entry(Animation, "animateMotion element", 50, Detect, r"(?i)<animateMotion\b"),
        entry(Animation, "animateColor element", 50, Detect, r"(?i)<animateColor\b"),
        entry(Animation, "set element", 50, Detect,
            r"(?i)<set\b[^>]*\b(?:attributeName|to)\s*="),
        // StyleBlock
        entry(StyleBlock, "style element", 50, Detect, r"(?i)<style\b"),
        // Link
        entry(Link, "anchor element with href", 80, Detect, r"(?i)<a\b[^>]*\bhref\s*="),
    ]
}

/// The full catalog in declaration order.
pub fn catalog() -> &'static [PatternEntry] {
    &CATALOG
}

/// Entries used for detection of `category`, in declaration order.
pub fn detection_rules(category: ThreatCategory) -> impl Iterator<Item = &'static PatternEntry> {
    catalog()
        .iter()
        .filter(move |e| e.category == category && e.detects())
}

/// Entries used for removal of `category`, in declaration order.
pub fn removal_rules(category: ThreatCategory) -> impl Iterator<Item = &'static PatternEntry> {
    catalog()
        .iter()
        .filter(move |e| e.category == category && e.replacement().is_some())
}
