//! Types for the status ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::session::ObservingDate;

/// Value written to a column when its stage failed.
pub const SENTINEL_ERROR: &str = "ERROR";

/// Ledger columns written by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerColumn {
    /// Session registered for the date.
    Utdate,
    /// Retired all-sky camera; always `n/a`.
    Allsky,
    /// Instrument telemetry copied.
    Nightly(u8),
    /// Telemetry retrieved and report pages rendered.
    Graphs,
    Skyprobe,
    Massdimm,
    /// Number of files in the manifest.
    Files,
    /// Archive size in megabytes.
    Size,
    DataSent,
    Complete,
}

impl LedgerColumn {
    /// Column name on the remote side.
    pub fn name(&self) -> String {
        match self {
            Self::Utdate => "utdate".to_string(),
            Self::Allsky => "allsky".to_string(),
            Self::Nightly(instrument) => format!("nightly{}", instrument),
            Self::Graphs => "graphs".to_string(),
            Self::Skyprobe => "skyprobe".to_string(),
            Self::Massdimm => "massdimm".to_string(),
            Self::Files => "files".to_string(),
            Self::Size => "size".to_string(),
            Self::DataSent => "data_sent".to_string(),
            Self::Complete => "wx_complete".to_string(),
        }
    }
}

impl fmt::Display for LedgerColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ledger timestamp format, UTC.
pub fn ledger_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d %H:%M:%S").to_string()
}

/// A single `(date, column, value)` write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerUpdate {
    pub date: ObservingDate,
    pub column: LedgerColumn,
    pub value: String,
}

impl LedgerUpdate {
    pub fn new(date: ObservingDate, column: LedgerColumn, value: impl Into<String>) -> Self {
        Self {
            date,
            column,
            value: value.into(),
        }
    }

    /// Completion timestamp for `column`, taken now.
    pub fn completed(date: ObservingDate, column: LedgerColumn) -> Self {
        Self::new(date, column, ledger_timestamp(Utc::now()))
    }

    /// Failure sentinel for `column`.
    pub fn failed(date: ObservingDate, column: LedgerColumn) -> Self {
        Self::new(date, column, SENTINEL_ERROR)
    }
}

/// What happened to a ledger write. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The endpoint answered with a success status.
    Recorded { status: u16, body: String },
    /// The write did not land; already logged.
    Failed { reason: String },
}

impl LedgerOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}
