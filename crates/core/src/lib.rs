pub mod collector;
pub mod config;
pub mod fetcher;
pub mod ledger;
pub mod manifest;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod testing;
pub mod transfer;

pub use collector::{CollectorError, NightlyCollector};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use fetcher::{FetchError, HttpFetcher};
pub use ledger::{HttpLedger, LedgerColumn, LedgerOutcome, LedgerUpdate, StatusLedger};
pub use manifest::{ChecksumType, ManifestBuilder, ManifestError, ManifestSummary};
pub use notify::{EmailMessage, Notifier, NotifyError, SendmailNotifier};
pub use pipeline::{
    ArchivePipeline, PipelineError, PipelineState, RunRequest, RunSummary, StageOutcome,
    StageReport,
};
pub use report::{RenderError, ReportRenderer, TemplateRenderer};
pub use session::{ArchiveSession, DateError, FileSessionLog, ObservingDate, SessionLog};
pub use transfer::{RsyncTransfer, Transfer, TransferError, TransferJob};
