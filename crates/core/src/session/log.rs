//! Session log sinks.
//!
//! The session log is the operator-facing record of a run: it is appended to
//! a dated file in the archive root and its text becomes the body of the
//! end-of-run notification. Every line is mirrored to `tracing`.

use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Severity of a session log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Append-only log injected into every pipeline stage.
pub trait SessionLog: Send + Sync {
    fn info(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    /// Everything logged through this sink during the current run.
    fn contents(&self) -> String;
}

/// Session log backed by a file, with an in-memory copy of this run's lines.
pub struct FileSessionLog {
    name: String,
    file: Mutex<Option<File>>,
    lines: Mutex<String>,
}

impl FileSessionLog {
    /// Opens (or creates) `path` in append mode.
    pub fn create(path: &Path, name: impl Into<String>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            name: name.into(),
            file: Mutex::new(Some(file)),
            lines: Mutex::new(String::new()),
        })
    }

    /// A log that only keeps lines in memory.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: Mutex::new(None),
            lines: Mutex::new(String::new()),
        }
    }

    fn write(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }

        let line = format!(
            "{} - {} - {}: {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            self.name,
            level.as_str(),
            message
        );

        if let Ok(mut lines) = self.lines.lock() {
            lines.push_str(&line);
        }

        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                if let Err(e) = file.write_all(line.as_bytes()) {
                    tracing::warn!("Failed to append to session log: {}", e);
                }
            }
        }
    }
}

impl SessionLog for FileSessionLog {
    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.write(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }

    fn contents(&self) -> String {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionLog;

impl SessionLog for NoopSessionLog {
    fn info(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}

    fn error(&self, _message: &str) {}

    fn contents(&self) -> String {
        String::new()
    }
}
