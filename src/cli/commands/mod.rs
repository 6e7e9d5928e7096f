//! CLI command implementations.
//!
//! Each submodule implements one top-level CLI command (scan, sanitize,
//! report, rules, config).

pub mod config;
pub mod report;
pub mod rules;
pub mod sanitize;
pub mod scan;

pub use config::cmd_config;
pub use report::{cmd_report, ReportOptions};
pub use rules::cmd_rules;
pub use sanitize::cmd_sanitize;
pub use scan::{cmd_scan, ScanOptions};
