//! Types for the transfer module.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::TransferConfig;

/// A single mirror request; no retry, no resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferJob {
    pub source_dir: PathBuf,
    pub account: String,
    pub host: String,
    pub remote_path: String,
}

impl TransferJob {
    pub fn new(source_dir: PathBuf, config: &TransferConfig) -> Self {
        Self {
            source_dir,
            account: config.account.clone(),
            host: config.host.clone(),
            remote_path: config.remote_path.clone(),
        }
    }

    /// `account@host:path`
    pub fn destination(&self) -> String {
        format!("{}@{}:{}", self.account, self.host, self.remote_path)
    }
}

/// Result of a completed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub destination: String,
    pub duration_ms: u64,
}
