//! Types for the fetcher module.

use serde::Serialize;
use std::path::PathBuf;

use crate::ledger::LedgerColumn;

/// Written in place of any dataset that could not be retrieved.
pub const PLACEHOLDER_CONTENT: &str = "No Data\n";

/// Datasets sharing a ledger column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetGroup {
    /// Archiver telemetry for the index page graphs.
    Telemetry,
    /// MASS/DIMM data files and seeing plots.
    Seeing,
    Skyprobe,
}

impl DatasetGroup {
    pub fn column(&self) -> LedgerColumn {
        match self {
            Self::Telemetry => LedgerColumn::Graphs,
            Self::Seeing => LedgerColumn::Massdimm,
            Self::Skyprobe => LedgerColumn::Skyprobe,
        }
    }
}

/// How a dataset is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// A single GET whose body is stored as is.
    File { url: String },
    /// One archiver query per channel, merged into a JSON document.
    Archiver { url: String, channels: Vec<String> },
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    pub id: String,
    pub group: DatasetGroup,
    pub source: DatasetSource,
    /// Path relative to the session directory.
    pub destination: PathBuf,
}
