//! Archive pipeline runner.
//!
//! Drives one session through its stages in a fixed order:
//! - Collection and fetching: per-source isolation, failures recorded
//! - Manifest: always built, after the in-progress marker is removed
//! - Transfer and notification: always attempted

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::collector::NightlyCollector;
use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::ledger::{HttpLedger, LedgerColumn, LedgerUpdate, StatusLedger};
use crate::manifest::{ManifestBuilder, ManifestSummary};
use crate::notify::{
    summary_message, transfer_failure_message, transfer_success_message, EmailMessage, Notifier,
    SendmailNotifier,
};
use crate::report::{ReportRenderer, TemplateRenderer};
use crate::session::{
    layout, ArchiveSession, FileSessionLog, ObservingDate, SessionLock, SessionLog, LOG_NAME,
    MARKER_FILE,
};
use crate::transfer::{RsyncTransfer, Transfer, TransferJob};

use super::stage::{StageFailure, StageOutcome, StageReport};
use super::types::{PipelineError, PipelineState, RunRequest, RunSummary};

/// The nightly archive pipeline.
pub struct ArchivePipeline {
    config: Arc<Config>,
    collector: NightlyCollector,
    fetcher: HttpFetcher,
    manifest: ManifestBuilder,
    ledger: Arc<dyn StatusLedger>,
    renderer: Arc<dyn ReportRenderer>,
    transfer: Arc<dyn Transfer>,
    notifier: Arc<dyn Notifier>,
}

impl ArchivePipeline {
    /// Create a pipeline with explicit collaborators.
    pub fn new(
        config: Arc<Config>,
        ledger: Arc<dyn StatusLedger>,
        renderer: Arc<dyn ReportRenderer>,
        transfer: Arc<dyn Transfer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, PipelineError> {
        let fetcher =
            HttpFetcher::new(config.feeds.clone()).map_err(|e| PipelineError::init("fetcher", e))?;

        Ok(Self {
            collector: NightlyCollector::new(config.collector.clone()),
            fetcher,
            manifest: ManifestBuilder::new(config.manifest.algorithm),
            config,
            ledger,
            renderer,
            transfer,
            notifier,
        })
    }

    /// Create a pipeline with the production collaborators.
    pub fn from_config(config: Arc<Config>) -> Result<Self, PipelineError> {
        let ledger =
            HttpLedger::new(config.ledger.clone()).map_err(|e| PipelineError::init("ledger", e))?;
        let renderer = TemplateRenderer::new(&config.report);
        let transfer = RsyncTransfer::new(&config.transfer);
        let notifier = SendmailNotifier::new(&config.notify);

        Self::new(
            config,
            Arc::new(ledger),
            Arc::new(renderer),
            Arc::new(transfer),
            Arc::new(notifier),
        )
    }

    /// Run one session to completion.
    ///
    /// Returns `Err` only for a malformed date, a directory that cannot be
    /// created, or a date already being archived by another process. The
    /// lock is taken before the session log is opened, so a rejected run
    /// never writes into the running session's log.
    pub async fn run(&self, request: RunRequest) -> Result<RunSummary, PipelineError> {
        let mut states = vec![PipelineState::Init];

        states.push(PipelineState::ValidateDate);
        let date = match &request.date {
            Some(input) => ObservingDate::parse(input).map_err(|e| abort(e.into()))?,
            None => ObservingDate::today_utc(),
        };

        states.push(PipelineState::PrepareDirectories);
        let root = request.archive_root.clone();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| abort(PipelineError::directory_creation(root.clone(), e)))?;

        let lock = SessionLock::acquire(&layout::lock_file(&root, &date))
            .map_err(|e| abort(e.into()))?;

        let log_file = layout::log_file(&root, &date);
        let log: Arc<dyn SessionLog> = Arc::new(
            FileSessionLog::create(&log_file, LOG_NAME).map_err(|e| {
                abort(PipelineError::LogCreation {
                    path: log_file.clone(),
                    source: e,
                })
            })?,
        );
        log.info(&format!("started for {}", date));
        log.info(&format!("holding session lock {}", lock.path().display()));

        let mut session = ArchiveSession::new(date, &root, request.ledger_enabled, log);
        if !session.ledger_enabled() {
            session.log().info("ledger updates disabled for this run");
        }

        self.write_ledger(&session, LedgerUpdate::new(date, LedgerColumn::Utdate, date.canonical()))
            .await;
        self.write_ledger(&session, LedgerUpdate::new(date, LedgerColumn::Allsky, "n/a"))
            .await;

        let outcome = self.prepare_session_dir(&session, &log_file).await;
        self.apply(&mut session, outcome).await?;

        states.push(PipelineState::CollectTelemetry);
        let report = self.collector.collect(&session.context()).await;
        let mut artifacts = self.apply(&mut session, report.into()).await?.artifacts;

        states.push(PipelineState::FetchExternalSources);
        let report = self.fetcher.fetch_all(&session.context()).await;
        artifacts.extend(self.apply(&mut session, report.into()).await?.artifacts);

        states.push(PipelineState::RenderReports);
        let report = self.render_reports(&session).await;
        self.apply(&mut session, report.into()).await?;

        let marker = session.session_dir().join(MARKER_FILE);
        session.log().info(&format!("removing {}", MARKER_FILE));
        if let Err(e) = tokio::fs::remove_file(&marker).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                session.record_error(&format!("could not remove {}: {}", marker.display(), e));
            }
        }

        states.push(PipelineState::BuildManifest);
        let manifest = self.build_manifest(&mut session).await;

        states.push(PipelineState::UpdateLedger);
        if let Some(summary) = &manifest {
            self.write_ledger(
                &session,
                LedgerUpdate::new(date, LedgerColumn::Files, summary.file_count().to_string()),
            )
            .await;
            self.write_ledger(
                &session,
                LedgerUpdate::new(date, LedgerColumn::Size, summary.size_megabytes()),
            )
            .await;
        }

        states.push(PipelineState::Transfer);
        let transferred = self.run_transfer(&mut session).await;

        states.push(PipelineState::Notify);
        session.log().info(&format!("complete for {}", date));
        let summary = summary_message(
            &self.config.notify,
            &date,
            session.error_count(),
            &session.log().contents(),
        );
        self.notify(&session, &summary).await;

        states.push(PipelineState::Done);
        info!(
            date = %date,
            errors = session.error_count(),
            "Archive session finished"
        );

        Ok(RunSummary {
            date,
            session_dir: session.session_dir().to_path_buf(),
            log_file,
            error_count: session.error_count(),
            states,
            artifacts,
            manifest,
            transferred,
        })
    }

    /// Creates the session directory, `README` and the in-progress marker.
    /// Any failure here is fatal.
    async fn prepare_session_dir(
        &self,
        session: &ArchiveSession,
        log_file: &Path,
    ) -> StageOutcome {
        let dir = session.session_dir().to_path_buf();
        let readme = dir.join(layout::README_FILE);
        let marker = dir.join(MARKER_FILE);

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            return StageOutcome::Fatal(PipelineError::directory_creation(dir, e));
        }
        session.log().info(&format!("using directory {}", dir.display()));

        if let Err(e) = tokio::fs::write(&readme, format!("{}\n", dir.display())).await {
            return StageOutcome::Fatal(PipelineError::directory_creation(readme, e));
        }

        session.log().info(&format!("creating {}", MARKER_FILE));
        if let Err(e) = tokio::fs::write(&marker, format!("Started, see {}\n", log_file.display())).await {
            return StageOutcome::Fatal(PipelineError::directory_creation(marker, e));
        }

        StageOutcome::Success(StageReport::new())
    }

    async fn render_reports(&self, session: &ArchiveSession) -> StageReport {
        let mut report = StageReport::new();
        match self.renderer.render(&session.context()).await {
            Ok(files) => {
                session.log().info(&format!(
                    "{} rendered {} report file(s)",
                    self.renderer.name(),
                    files.len()
                ));
                report.complete(LedgerColumn::Graphs);
            }
            Err(e) => report.fail(StageFailure::for_column(
                LedgerColumn::Graphs,
                format!("report rendering failed: {}", e),
            )),
        }
        report
    }

    async fn build_manifest(&self, session: &mut ArchiveSession) -> Option<ManifestSummary> {
        let name = layout::manifest_file_name(&session.date());
        match self.manifest.build(session.session_dir(), &name).await {
            Ok(summary) => {
                session.log().info(&format!(
                    "manifest lists {} files, {} MB",
                    summary.file_count(),
                    summary.size_megabytes()
                ));
                for skipped in &summary.skipped {
                    session
                        .log()
                        .warning(&format!("left out of manifest: {}", skipped));
                }
                if let Some(first) = summary.skipped.first() {
                    self.fail(
                        session,
                        StageFailure::new(
                            None,
                            format!(
                                "manifest skipped {} unreadable entries (first: {})",
                                summary.skipped.len(),
                                first
                            ),
                        ),
                    )
                    .await;
                }
                Some(summary)
            }
            Err(e) => {
                self.fail(
                    session,
                    StageFailure::for_column(LedgerColumn::Files, format!("manifest failed: {}", e)),
                )
                .await;
                None
            }
        }
    }

    async fn run_transfer(&self, session: &mut ArchiveSession) -> bool {
        let date = session.date();
        let job = TransferJob::new(session.session_dir().to_path_buf(), &self.config.transfer);
        session
            .log()
            .info(&format!("transferring {} to {}", job.source_dir.display(), job.destination()));

        match self.transfer.transfer(&job, session.log()).await {
            Ok(result) => {
                session.log().info(&format!(
                    "transfer to {} finished in {} ms",
                    result.destination, result.duration_ms
                ));
                let message =
                    transfer_success_message(&self.config.notify, &date, &result.destination);
                self.notify(session, &message).await;
                self.complete(session, LedgerColumn::DataSent).await;
                self.complete(session, LedgerColumn::Complete).await;
                true
            }
            Err(e) => {
                let reason = format!("transfer failed: {}", e);
                self.fail(
                    session,
                    StageFailure::for_column(LedgerColumn::DataSent, reason.clone()),
                )
                .await;
                let message =
                    transfer_failure_message(&self.config.notify, session.session_dir(), &reason);
                self.notify(session, &message).await;
                false
            }
        }
    }

    /// Records a stage's failures and completions, or propagates a fatal error.
    async fn apply(
        &self,
        session: &mut ArchiveSession,
        outcome: StageOutcome,
    ) -> Result<StageReport, PipelineError> {
        let report = match outcome {
            StageOutcome::Success(report) | StageOutcome::Recoverable(report) => report,
            StageOutcome::Fatal(e) => {
                session.record_error(&format!("{}: {}", PipelineState::Abort, describe(&e)));
                return Err(abort(e));
            }
        };

        // Failures first so a column that failed is never stamped complete
        for failure in &report.failures {
            self.fail(session, failure.clone()).await;
        }
        for column in &report.completed {
            self.complete(session, *column).await;
        }

        Ok(report)
    }

    async fn fail(&self, session: &mut ArchiveSession, failure: StageFailure) {
        session.record_error(&failure.message);
        if let Some(column) = failure.column {
            if session.mark_failed(column) {
                self.write_ledger(session, LedgerUpdate::failed(session.date(), column))
                    .await;
            }
        }
    }

    async fn complete(&self, session: &ArchiveSession, column: LedgerColumn) {
        if session.is_failed(column) {
            session
                .log()
                .info(&format!("{} already marked ERROR, not overwriting", column));
            return;
        }
        self.write_ledger(session, LedgerUpdate::completed(session.date(), column))
            .await;
    }

    async fn write_ledger(&self, session: &ArchiveSession, update: LedgerUpdate) {
        if !session.ledger_enabled() {
            session.log().info(&format!(
                "ledger disabled, skipping {}={}",
                update.column, update.value
            ));
            return;
        }
        let _ = self.ledger.update(&update, session.log()).await;
    }

    async fn notify(&self, session: &ArchiveSession, message: &EmailMessage) {
        match self.notifier.send(message).await {
            Ok(()) => session
                .log()
                .info(&format!("sent '{}' to {}", message.subject, message.to)),
            Err(e) => session.log().warning(&format!(
                "failed to send email with subject '{}' to {}: {}",
                message.subject, message.to, e
            )),
        }
    }
}

/// Logs the transition to `Abort` and hands the error back.
fn abort(error: PipelineError) -> PipelineError {
    error!(state = %PipelineState::Abort, "Archive session aborted: {}", describe(&error));
    error
}

/// The error and its immediate cause on one line.
fn describe(error: &PipelineError) -> String {
    match std::error::Error::source(error) {
        Some(source) => format!("{}: {}", error, source),
        None => error.to_string(),
    }
}
