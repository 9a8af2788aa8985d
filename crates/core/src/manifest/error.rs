//! Error types for the manifest module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The directory to walk does not exist.
    #[error("Session directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to list a directory.
    #[error("Failed to read directory: {path}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to calculate checksum.
    #[error("Failed to calculate checksum for {path}")]
    ChecksumCalculationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the manifest file.
    #[error("Failed to write manifest: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
