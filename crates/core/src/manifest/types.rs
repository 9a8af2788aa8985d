//! Types for the manifest module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Digest algorithm used for manifest lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumType {
    /// MD5, the format downstream consumers verify with `md5sum -c`.
    #[default]
    Md5,
    Sha256,
}

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Lowercase hex digest.
    pub digest: String,
    /// Path relative to the session directory, always starting with `./`.
    pub relative_path: String,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.digest, self.relative_path)
    }
}

/// A file or directory left out of the manifest because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub relative_path: String,
    pub reason: String,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.relative_path, self.reason)
    }
}

/// Result of a manifest build.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    /// Where the manifest was written.
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
    pub total_bytes: u64,
    pub skipped: Vec<SkippedEntry>,
}

impl ManifestSummary {
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Total size in megabytes (10^6 bytes), three decimals.
    pub fn size_megabytes(&self) -> String {
        format!("{:.3}", self.total_bytes as f64 / 1_000_000.0)
    }
}
