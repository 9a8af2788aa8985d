use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::manifest::ChecksumType;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub notify: NotifyConfig,
    pub transfer: TransferConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Remote status ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Ledger endpoint (e.g., "https://example.org/db_api/koa.php")
    pub url: String,
    /// Shared credential; only its digest is ever sent
    pub credential: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Operator notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Sender address for every notification
    pub from: String,
    /// Distribution list for clean runs and completed transfers
    pub success_email: String,
    /// Alias for runs with errors and failed transfers
    pub error_email: String,
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: PathBuf,
}

fn default_sendmail_path() -> PathBuf {
    PathBuf::from("/usr/sbin/sendmail")
}

/// Remote mirror configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferConfig {
    pub account: String,
    pub host: String,
    pub remote_path: String,
    #[serde(default = "default_rsync_path")]
    pub rsync_path: PathBuf,
    /// Whole-transfer timeout in seconds (default: 3600)
    #[serde(default = "default_transfer_timeout")]
    pub timeout_secs: u64,
}

fn default_rsync_path() -> PathBuf {
    PathBuf::from("/usr/bin/rsync")
}

fn default_transfer_timeout() -> u64 {
    3600
}

/// Instrument telemetry source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    #[serde(default = "default_primary_root")]
    pub primary_root: PathBuf,
    #[serde(default = "default_fallback_root")]
    pub fallback_root: PathBuf,
    #[serde(default = "default_gunzip_path")]
    pub gunzip_path: PathBuf,
    #[serde(default = "default_uncompress_path")]
    pub uncompress_path: PathBuf,
    /// Per-file decompression timeout in seconds (default: 300)
    #[serde(default = "default_decompress_timeout")]
    pub decompress_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            primary_root: default_primary_root(),
            fallback_root: default_fallback_root(),
            gunzip_path: default_gunzip_path(),
            uncompress_path: default_uncompress_path(),
            decompress_timeout_secs: default_decompress_timeout(),
        }
    }
}

fn default_primary_root() -> PathBuf {
    PathBuf::from("/h")
}

fn default_fallback_root() -> PathBuf {
    PathBuf::from("/s")
}

fn default_gunzip_path() -> PathBuf {
    PathBuf::from("gunzip")
}

fn default_uncompress_path() -> PathBuf {
    PathBuf::from("uncompress")
}

fn default_decompress_timeout() -> u64 {
    300
}

/// External data feed endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedsConfig {
    /// Seeing flat files (e.g., "http://mkwc.ifa.hawaii.edu/current/seeing")
    pub seeing_url: String,
    /// Seeing plot images (e.g., "http://hokukea.soest.hawaii.edu/current/seeing")
    pub seeing_plots_url: String,
    /// Sky attenuation image archive (e.g., "http://nenue.cfht.hawaii.edu/Instruments/Elixir/skyprobe/archive")
    pub skyprobe_url: String,
    /// Telemetry archiver for instrument 1
    pub k1_archiver_url: String,
    /// Telemetry archiver for instrument 2
    pub k2_archiver_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl FeedsConfig {
    /// Archiver endpoint for the given instrument, if it has one.
    pub fn archiver_url(&self, instrument: u8) -> Option<&str> {
        match instrument {
            1 => Some(&self.k1_archiver_url),
            2 => Some(&self.k2_archiver_url),
            _ => None,
        }
    }
}

fn default_timeout() -> u32 {
    30
}

/// Manifest configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ManifestConfig {
    #[serde(default)]
    pub algorithm: ChecksumType,
}

/// Report page configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Index page template; a built-in page is used when unset
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

/// Sanitized config for log output (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub ledger: SanitizedLedgerConfig,
    pub notify: NotifyConfig,
    pub transfer: TransferConfig,
    pub collector: CollectorConfig,
    pub feeds: FeedsConfig,
    pub manifest: ManifestConfig,
    pub report: ReportConfig,
}

/// Sanitized ledger config (credential hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLedgerConfig {
    pub url: String,
    pub credential_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            ledger: SanitizedLedgerConfig {
                url: config.ledger.url.clone(),
                credential_configured: !config.ledger.credential.is_empty(),
                timeout_secs: config.ledger.timeout_secs,
            },
            notify: config.notify.clone(),
            transfer: config.transfer.clone(),
            collector: config.collector.clone(),
            feeds: config.feeds.clone(),
            manifest: config.manifest.clone(),
            report: config.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[ledger]
url = "https://ledger.example.org/db_api/koa.php"
credential = "secret"

[notify]
from = "archive@example.org"
success_email = "weather@example.org"
error_email = "weather-errors@example.org"

[transfer]
account = "koa"
host = "mirror.example.org"
remote_path = "/data/weather"

[feeds]
seeing_url = "http://seeing.example.org/current/seeing"
seeing_plots_url = "http://plots.example.org/current/seeing"
skyprobe_url = "http://skyprobe.example.org/archive"
k1_archiver_url = "http://k1.example.org/retrieval/data/getData.json"
k2_archiver_url = "http://k2.example.org/retrieval/data/getData.json"
"#;

    #[test]
    fn test_deserialize_minimal_config_applies_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.ledger.timeout_secs, 30);
        assert_eq!(config.feeds.timeout_secs, 30);
        assert_eq!(config.transfer.timeout_secs, 3600);
        assert_eq!(config.transfer.rsync_path, PathBuf::from("/usr/bin/rsync"));
        assert_eq!(config.collector.primary_root, PathBuf::from("/h"));
        assert_eq!(config.collector.fallback_root, PathBuf::from("/s"));
        assert_eq!(config.manifest.algorithm, ChecksumType::Md5);
        assert!(config.report.template_path.is_none());
    }

    #[test]
    fn test_deserialize_missing_transfer_fails() {
        let toml = MINIMAL.replace("[transfer]", "[unused]");
        let result: Result<Config, _> = toml::from_str(&toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_collector_and_manifest_overrides() {
        let toml = format!(
            "{}\n[collector]\nprimary_root = \"/data/h\"\nfallback_root = \"/data/s\"\n\n[manifest]\nalgorithm = \"sha256\"\n",
            MINIMAL
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.collector.primary_root, PathBuf::from("/data/h"));
        assert_eq!(config.collector.gunzip_path, PathBuf::from("gunzip"));
        assert_eq!(config.manifest.algorithm, ChecksumType::Sha256);
    }

    #[test]
    fn test_archiver_url_by_instrument() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert!(config.feeds.archiver_url(1).unwrap().starts_with("http://k1."));
        assert!(config.feeds.archiver_url(2).unwrap().starts_with("http://k2."));
        assert!(config.feeds.archiver_url(3).is_none());
    }

    #[test]
    fn test_sanitized_config_hides_credential() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.ledger.credential_configured);
        assert!(!format!("{:?}", sanitized).contains("secret"));
    }
}
