//! Types for the archive pipeline.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::manifest::ManifestSummary;
use crate::session::{DateError, LockError, ObservingDate};

use super::stage::SourceArtifact;

/// Errors that abort a session.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid observing date")]
    InvalidDate(#[from] DateError),

    #[error("could not create {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open session log {path}")]
    LogCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Locked(#[from] LockError),

    #[error("failed to initialize {component}: {reason}")]
    Init {
        component: &'static str,
        reason: String,
    },
}

impl PipelineError {
    pub fn directory_creation(path: PathBuf, source: std::io::Error) -> Self {
        Self::DirectoryCreation { path, source }
    }

    pub fn init(component: &'static str, reason: impl fmt::Display) -> Self {
        Self::Init {
            component,
            reason: reason.to_string(),
        }
    }
}

/// Pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    ValidateDate,
    PrepareDirectories,
    CollectTelemetry,
    FetchExternalSources,
    RenderReports,
    BuildManifest,
    UpdateLedger,
    Transfer,
    Notify,
    Done,
    Abort,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ValidateDate => "validate_date",
            Self::PrepareDirectories => "prepare_directories",
            Self::CollectTelemetry => "collect_telemetry",
            Self::FetchExternalSources => "fetch_external_sources",
            Self::RenderReports => "render_reports",
            Self::BuildManifest => "build_manifest",
            Self::UpdateLedger => "update_ledger",
            Self::Transfer => "transfer",
            Self::Notify => "notify",
            Self::Done => "done",
            Self::Abort => "abort",
        };
        f.write_str(name)
    }
}

/// Input for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub archive_root: PathBuf,
    /// `YYYY-MM-DD` or `YYYY/MM/DD`; today's UTC date when absent.
    pub date: Option<String>,
    pub ledger_enabled: bool,
}

impl RunRequest {
    pub fn new(archive_root: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            date: None,
            ledger_enabled: true,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn without_ledger(mut self) -> Self {
        self.ledger_enabled = false;
        self
    }
}

/// What a completed session did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub date: ObservingDate,
    pub session_dir: PathBuf,
    pub log_file: PathBuf,
    pub error_count: u32,
    pub states: Vec<PipelineState>,
    pub artifacts: Vec<SourceArtifact>,
    pub manifest: Option<ManifestSummary>,
    pub transferred: bool,
}
