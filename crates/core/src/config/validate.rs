use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Every endpoint is an http(s) URL
/// - Notification addresses and transfer target are not blank
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let urls = [
        ("ledger.url", &config.ledger.url),
        ("feeds.seeing_url", &config.feeds.seeing_url),
        ("feeds.seeing_plots_url", &config.feeds.seeing_plots_url),
        ("feeds.skyprobe_url", &config.feeds.skyprobe_url),
        ("feeds.k1_archiver_url", &config.feeds.k1_archiver_url),
        ("feeds.k2_archiver_url", &config.feeds.k2_archiver_url),
    ];
    for (name, url) in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an http(s) URL, got '{}'",
                name, url
            )));
        }
    }

    let required = [
        ("notify.from", &config.notify.from),
        ("notify.success_email", &config.notify.success_email),
        ("notify.error_email", &config.notify.error_email),
        ("transfer.account", &config.transfer.account),
        ("transfer.host", &config.transfer.host),
        ("transfer.remote_path", &config.transfer.remote_path),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if config.ledger.timeout_secs == 0 || config.feeds.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "request timeouts cannot be 0".to_string(),
        ));
    }
    if config.transfer.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "transfer.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
