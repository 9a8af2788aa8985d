//! In-place decompression through external tools.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::CollectorConfig;

use super::error::CollectorError;

/// Compressed formats found in instrument telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// `.gz`
    Gzip,
    /// `.Z`
    Compress,
}

impl CompressionFormat {
    /// Detects the format from the file name; suffixes are case-sensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".gz") {
            Some(Self::Gzip)
        } else if name.ends_with(".Z") {
            Some(Self::Compress)
        } else {
            None
        }
    }
}

/// Runs `gunzip -f` / `uncompress -f` on single files.
///
/// The tools replace `<name>.gz` with `<name>` themselves.
#[derive(Debug, Clone)]
pub struct Decompressor {
    gunzip_path: PathBuf,
    uncompress_path: PathBuf,
    timeout_secs: u64,
}

impl Decompressor {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            gunzip_path: config.gunzip_path.clone(),
            uncompress_path: config.uncompress_path.clone(),
            timeout_secs: config.decompress_timeout_secs,
        }
    }

    fn tool(&self, format: CompressionFormat) -> &Path {
        match format {
            CompressionFormat::Gzip => &self.gunzip_path,
            CompressionFormat::Compress => &self.uncompress_path,
        }
    }

    /// Decompresses `path` in place. Returns `Ok(false)` for files that are
    /// not compressed.
    pub async fn decompress(&self, path: &Path) -> Result<bool, CollectorError> {
        let Some(format) = CompressionFormat::from_path(path) else {
            return Ok(false);
        };
        let tool = self.tool(format);

        let child = Command::new(tool)
            .arg("-f")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.timeout_secs), child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CollectorError::ToolNotFound {
                    path: tool.to_path_buf(),
                });
            }
            Ok(Err(e)) => return Err(CollectorError::Io(e)),
            Err(_) => {
                return Err(CollectorError::Timeout {
                    path: path.to_path_buf(),
                    timeout_secs: self.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CollectorError::decompression_failed(
                path.to_path_buf(),
                format!(
                    "{} exited with code {:?}: {}",
                    tool.display(),
                    output.status.code(),
                    stderr.trim()
                ),
            ));
        }

        Ok(true)
    }
}
