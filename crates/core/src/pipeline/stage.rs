//! Stage results shared by every pipeline stage.

use serde::Serialize;
use std::path::PathBuf;

use crate::ledger::LedgerColumn;

use super::types::PipelineError;

/// Where a staged artifact ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Fetched,
    /// Upstream reported no data; a placeholder was written.
    Missing,
    /// Retrieval failed; a placeholder was written.
    Error,
}

/// One fetched or copied item.
#[derive(Debug, Clone, Serialize)]
pub struct SourceArtifact {
    pub source_id: String,
    pub local_path: PathBuf,
    pub status: ArtifactStatus,
}

impl SourceArtifact {
    pub fn new(source_id: impl Into<String>, local_path: PathBuf, status: ArtifactStatus) -> Self {
        Self {
            source_id: source_id.into(),
            local_path,
            status,
        }
    }
}

/// A recoverable failure inside a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Column that receives the failure sentinel, if any.
    pub column: Option<LedgerColumn>,
    pub message: String,
}

impl StageFailure {
    pub fn new(column: Option<LedgerColumn>, message: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
        }
    }

    pub fn for_column(column: LedgerColumn, message: impl Into<String>) -> Self {
        Self::new(Some(column), message)
    }
}

/// What a stage accomplished.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Columns that receive a completion timestamp.
    pub completed: Vec<LedgerColumn>,
    pub failures: Vec<StageFailure>,
    pub artifacts: Vec<SourceArtifact>,
}

impl StageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&mut self, column: LedgerColumn) {
        if !self.completed.contains(&column) {
            self.completed.push(column);
        }
    }

    pub fn fail(&mut self, failure: StageFailure) {
        self.failures.push(failure);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of running one stage; the orchestrator matches on this.
#[derive(Debug)]
pub enum StageOutcome {
    Success(StageReport),
    /// Some work failed; log, count, mark sentinels and move on.
    Recoverable(StageReport),
    /// Abort the session.
    Fatal(PipelineError),
}

impl From<StageReport> for StageOutcome {
    fn from(report: StageReport) -> Self {
        if report.has_failures() {
            Self::Recoverable(report)
        } else {
            Self::Success(report)
        }
    }
}
