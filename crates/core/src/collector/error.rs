//! Error types for the collector module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting telemetry.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Neither the primary nor the fallback tree exists.
    #[error("nightly{instrument} source not found (tried {primary} and {fallback})")]
    SourceNotFound {
        instrument: u8,
        primary: PathBuf,
        fallback: PathBuf,
    },

    /// The tree exists but holds no regular files.
    #[error("nightly{instrument} source {path} contains no files")]
    EmptySource { instrument: u8, path: PathBuf },

    /// Failed to create a destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a file or list a directory.
    #[error("Failed to copy {from} to {to}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Decompression tool binary not found.
    #[error("Decompression tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Decompression tool exited unsuccessfully.
    #[error("Failed to decompress {path}: {reason}")]
    DecompressionFailed { path: PathBuf, reason: String },

    /// Decompression timed out.
    #[error("Decompressing {path} timed out after {timeout_secs} seconds")]
    Timeout { path: PathBuf, timeout_secs: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectorError {
    pub fn copy_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed { from, to, error }
    }

    pub fn decompression_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::DecompressionFailed {
            path,
            reason: reason.into(),
        }
    }
}
