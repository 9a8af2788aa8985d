//! Delivery through a local sendmail-compatible binary.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::NotifyConfig;

use super::{EmailMessage, NotifyError, Notifier};

const SEND_TIMEOUT_SECS: u64 = 60;

/// Pipes the message into `sendmail -t -i`; recipients come from the headers.
pub struct SendmailNotifier {
    sendmail_path: PathBuf,
}

impl SendmailNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            sendmail_path: config.sendmail_path.clone(),
        }
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let mut child = Command::new(&self.sendmail_path)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    NotifyError::ToolNotFound {
                        path: self.sendmail_path.clone(),
                    }
                } else {
                    NotifyError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.to_rfc822().as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(NotifyError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SendmailNotifier {
    fn name(&self) -> &str {
        "sendmail"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::debug!(to = %message.to, subject = %message.subject, "Sending notification");
        timeout(Duration::from_secs(SEND_TIMEOUT_SECS), self.deliver(message))
            .await
            .map_err(|_| NotifyError::Timeout {
                timeout_secs: SEND_TIMEOUT_SECS,
            })?
    }
}
