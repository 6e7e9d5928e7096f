//! Append-only audit log with size limits and rotation.
//!
//! Records security-relevant events (scans, sanitizations, reports) as JSON
//! lines. Files are capped in size and rotated so the log cannot grow without
//! bound.

use chrono::{SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::config::settings::AuditSettings;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to open audit log: {0}")]
    OpenError(#[from] std::io::Error),

    #[error("Failed to serialize audit entry: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Size limits for the audit log.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Size of the live file in bytes that triggers rotation.
    pub max_file_bytes: u64,
    /// Rotated files kept (audit.log.1 .. audit.log.N).
    pub max_rotated_files: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_rotated_files: 5,
        }
    }
}

/// Append-only audit log with automatic rotation.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    config: AuditConfig,
}

impl AuditLog {
    /// Open (or create) an audit log at the given path.
    pub fn open(path: &Path, config: AuditConfig) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// Open the log described by the `[audit]` settings, if enabled.
    ///
    /// Failure to open is logged and treated as disabled.
    pub fn from_settings(settings: &AuditSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }
        match Self::open(&settings.path, AuditConfig::default()) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!(path = %settings.path.display(), error = %e, "Audit log unavailable");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a security event.
    pub fn record(&self, event: &str, message: &str) -> Result<(), AuditError> {
        self.rotate_if_needed()?;

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "event": event,
            "message": message,
        });

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    /// Record an event, logging instead of failing.
    pub fn record_or_warn(&self, event: &str, message: &str) {
        if let Err(e) = self.record(event, message) {
            warn!(event, error = %e, "Failed to write audit entry");
        }
    }

    fn rotate_if_needed(&self) -> Result<(), AuditError> {
        let size = match fs::metadata(&self.path) {
            Ok(m) => m.len(),
            Err(_) => return Ok(()),
        };

        if size < self.config.max_file_bytes {
            return Ok(());
        }

        // .N is dropped, .N-1 -> .N, ... , .1 -> .2
        for i in (1..=self.config.max_rotated_files).rev() {
            let src = self.rotated_path(i);
            if !src.exists() {
                continue;
            }
            if i == self.config.max_rotated_files {
                let _ = fs::remove_file(&src);
            } else {
                let _ = fs::rename(&src, self.rotated_path(i + 1));
            }
        }

        if self.config.max_rotated_files == 0 {
            let _ = fs::remove_file(&self.path);
        } else {
            let _ = fs::rename(&self.path, self.rotated_path(1));
        }

        File::create(&self.path)?;

        Ok(())
    }

    fn rotated_path(&self, n: u32) -> PathBuf {
        let name = self.path.file_name().unwrap_or_default().to_string_lossy();
        self.path.with_file_name(format!("{}.{}", name, n))
    }
}
