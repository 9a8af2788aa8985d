//! rsync-based transfer.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::TransferConfig;
use crate::session::SessionLog;

use super::error::TransferError;
use super::traits::Transfer;
use super::types::{TransferJob, TransferResult};

/// Runs `rsync -avz <source> <account>@<host>:<path>`.
pub struct RsyncTransfer {
    rsync_path: PathBuf,
    timeout_secs: u64,
}

impl RsyncTransfer {
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            rsync_path: config.rsync_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn args(job: &TransferJob) -> Vec<String> {
        vec![
            "-avz".to_string(),
            job.source_dir.to_string_lossy().into_owned(),
            job.destination(),
        ]
    }
}

#[async_trait]
impl Transfer for RsyncTransfer {
    fn name(&self) -> &str {
        "rsync"
    }

    async fn transfer(
        &self,
        job: &TransferJob,
        log: &dyn SessionLog,
    ) -> Result<TransferResult, TransferError> {
        if !job.source_dir.is_dir() {
            return Err(TransferError::SourceMissing {
                path: job.source_dir.clone(),
            });
        }

        let args = Self::args(job);
        log.info(&format!("{} {}", self.rsync_path.display(), args.join(" ")));
        let start = Instant::now();

        let child = Command::new(&self.rsync_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.timeout_secs), child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransferError::ToolNotFound {
                    path: self.rsync_path.clone(),
                });
            }
            Ok(Err(e)) => return Err(TransferError::Io(e)),
            Err(_) => {
                return Err(TransferError::Timeout {
                    timeout_secs: self.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransferError::Failed {
                code: output.status.code(),
                stderr: stderr.trim().chars().take(500).collect(),
            });
        }

        tracing::debug!(
            stdout = %String::from_utf8_lossy(&output.stdout),
            "rsync finished"
        );

        Ok(TransferResult {
            destination: job.destination(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
