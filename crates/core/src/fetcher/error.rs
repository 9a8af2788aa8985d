//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while retrieving a dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out after {timeout_secs} seconds")]
    Timeout { url: String, timeout_secs: u32 },

    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The payload could not be interpreted.
    #[error("Failed to parse response from {url}: {reason}")]
    ParseError { url: String, reason: String },

    /// Failed to write the payload or placeholder.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Upstream has no data for the date.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    pub(crate) fn from_reqwest(url: &str, timeout_secs: u32, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_secs,
            }
        } else if e.is_connect() {
            Self::ConnectionFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            Self::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_404_is_missing() {
        let missing = FetchError::Status {
            url: "http://x/mcal_20240315.png".to_string(),
            status: 404,
        };
        let server = FetchError::Status {
            url: "http://x/mcal_20240315.png".to_string(),
            status: 500,
        };
        assert!(missing.is_missing());
        assert!(!server.is_missing());
        assert!(!FetchError::Timeout {
            url: "http://x".to_string(),
            timeout_secs: 30
        }
        .is_missing());
    }
}
