//! Error types for the transfer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mirroring a session.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The directory to send does not exist.
    #[error("Transfer source does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// Transfer binary not found.
    #[error("Transfer tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The tool exited unsuccessfully.
    #[error("Transfer failed with exit code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Transfer timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
