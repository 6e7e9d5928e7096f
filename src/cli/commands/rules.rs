//! Rules command: list the built-in threat pattern catalog.

use colored::*;
use std::process::ExitCode;
use tracing::info;

use crate::cli::args::RulesAction;
use crate::detection::catalog::{self, Role};
use crate::detection::threat::{Severity, ThreatCategory};

/// Execute the `rules` subcommand.
pub fn cmd_rules(action: RulesAction) -> anyhow::Result<ExitCode> {
    match action {
        RulesAction::List => {
            for category in ThreatCategory::ALL {
                let severity = category.severity();
                let label = match severity {
                    Severity::Critical | Severity::High => severity.to_string().red(),
                    Severity::Medium => severity.to_string().yellow(),
                    Severity::Low => severity.to_string().green(),
                };
                println!("{} (severity: {})", category.to_string().cyan().bold(), label);

                for entry in catalog::catalog().iter().filter(|e| e.category() == category) {
                    let role = match entry.role() {
                        Role::Detect => "detect",
                        Role::Remove(_) => "remove",
                        Role::DetectAndRemove(_) => "detect+remove",
                    };
                    println!("  {:<14} {}", role, entry.description());
                }
            }

            let count = catalog::catalog().len();
            info!(count, "Rules listed");
            println!();
            println!("{} pattern(s) in {} categories", count, ThreatCategory::ALL.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}
