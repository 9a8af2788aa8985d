//! Operator notifications.

mod messages;
mod sendmail;

pub use messages::{summary_message, transfer_failure_message, transfer_success_message};
pub use sendmail::SendmailNotifier;

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    #[error("Mail tool exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Mail tool timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Headers and body as handed to a local MTA.
    pub fn to_rfc822(&self) -> String {
        let mut message = format!(
            "From: {}\nTo: {}\nSubject: {}\nContent-Type: text/plain; charset=utf-8\n\n",
            header_value(&self.from),
            header_value(&self.to),
            header_value(&self.subject)
        );
        message.push_str(&self.body);
        if !self.body.ends_with('\n') {
            message.push('\n');
        }
        message
    }
}

// Header values are single-line
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Delivers operator emails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the name of this notifier implementation.
    fn name(&self) -> &str;

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}
