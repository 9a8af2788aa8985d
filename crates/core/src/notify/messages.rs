//! Notification builders.

use std::path::Path;

use crate::config::NotifyConfig;
use crate::session::ObservingDate;

use super::EmailMessage;

/// End-of-run summary: error count then the full session log. Goes to the
/// success list for a clean run, to the error alias otherwise.
pub fn summary_message(
    config: &NotifyConfig,
    date: &ObservingDate,
    error_count: u32,
    log_contents: &str,
) -> EmailMessage {
    let to = if error_count == 0 {
        &config.success_email
    } else {
        &config.error_email
    };
    EmailMessage {
        from: config.from.clone(),
        to: to.clone(),
        subject: format!("WEATHER {}", date),
        body: format!("{} errors\n\n{}", error_count, log_contents),
    }
}

pub fn transfer_success_message(
    config: &NotifyConfig,
    date: &ObservingDate,
    destination: &str,
) -> EmailMessage {
    EmailMessage {
        from: config.from.clone(),
        to: config.success_email.clone(),
        subject: format!("weather {}", date.compact()),
        body: format!("weather data successfully transferred to {}\n", destination),
    }
}

pub fn transfer_failure_message(
    config: &NotifyConfig,
    session_dir: &Path,
    reason: &str,
) -> EmailMessage {
    EmailMessage {
        from: config.from.clone(),
        to: config.error_email.clone(),
        subject: "Weather transfer error".to_string(),
        body: format!(
            "Error transferring directory\n\n{}\n\n{}\n",
            session_dir.display(),
            reason
        ),
    }
}
