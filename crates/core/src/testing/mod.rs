//! Testing utilities and mock implementations.
//!
//! Mocks of the pipeline's outward-facing collaborators, so a whole
//! session can run against a temporary directory without a ledger
//! endpoint, a remote mirror or a mail server.
//!
//! # Example
//!
//! ```rust,ignore
//! use wxarchive_core::testing::{fixtures, MockLedger, MockNotifier, MockRenderer, MockTransfer};
//!
//! let ledger = Arc::new(MockLedger::new());
//! let pipeline = ArchivePipeline::new(
//!     Arc::new(fixtures::offline_config()),
//!     ledger.clone(),
//!     Arc::new(MockRenderer::new()),
//!     Arc::new(MockTransfer::new()),
//!     Arc::new(MockNotifier::new()),
//! )?;
//! ```

mod mock_ledger;
mod mock_notifier;
mod mock_renderer;
mod mock_transfer;

pub use mock_ledger::MockLedger;
pub use mock_notifier::MockNotifier;
pub use mock_renderer::MockRenderer;
pub use mock_transfer::MockTransfer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::config::{
        CollectorConfig, Config, FeedsConfig, LedgerConfig, ManifestConfig, NotifyConfig,
        ReportConfig, TransferConfig,
    };

    /// Nothing listens on port 1, so every request fails fast.
    pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

    /// A valid configuration whose endpoints and tools all fail.
    pub fn offline_config() -> Config {
        Config {
            ledger: LedgerConfig {
                url: format!("{}/db_api/koa.php", UNREACHABLE_URL),
                credential: "koaadmin".to_string(),
                timeout_secs: 2,
            },
            notify: NotifyConfig {
                from: "archive@example.org".to_string(),
                success_email: "weather@example.org".to_string(),
                error_email: "weather-errors@example.org".to_string(),
                sendmail_path: PathBuf::from("/nonexistent/sendmail"),
            },
            transfer: TransferConfig {
                account: "koaxfr".to_string(),
                host: "mirror.example.org".to_string(),
                remote_path: "/data/weather".to_string(),
                rsync_path: PathBuf::from("/nonexistent/rsync"),
                timeout_secs: 10,
            },
            collector: CollectorConfig {
                primary_root: PathBuf::from("/nonexistent/h"),
                fallback_root: PathBuf::from("/nonexistent/s"),
                ..CollectorConfig::default()
            },
            feeds: feeds_at(UNREACHABLE_URL),
            manifest: ManifestConfig::default(),
            report: ReportConfig::default(),
        }
    }

    /// Every feed served from under `base`.
    pub fn feeds_at(base: &str) -> FeedsConfig {
        FeedsConfig {
            seeing_url: format!("{}/seeing", base),
            seeing_plots_url: format!("{}/plots", base),
            skyprobe_url: format!("{}/skyprobe", base),
            k1_archiver_url: format!("{}/k1/getData.json", base),
            k2_archiver_url: format!("{}/k2/getData.json", base),
            timeout_secs: 2,
        }
    }
}
