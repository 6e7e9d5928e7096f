pub mod catalog;
pub mod pipeline;
pub mod sanitizer;
pub mod scanner;
pub mod threat;

// Re-export common types for convenience
pub use sanitizer::{SanitizeOptions, SanitizeResult, SvgSanitizer};
pub use scanner::{ScanLevel, ScanResult, SvgScanner};
pub use threat::{Severity, Status, Threat, ThreatCategory};
