//! Nightly telemetry tree copy.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::CollectorConfig;
use crate::ledger::LedgerColumn;
use crate::pipeline::{ArtifactStatus, SourceArtifact, StageFailure, StageReport};
use crate::session::{layout, ObservingDate, StageContext};

use super::decompress::Decompressor;
use super::error::CollectorError;

/// Instruments whose telemetry is archived.
pub const INSTRUMENTS: [u8; 2] = [1, 2];

/// What one instrument copy produced.
#[derive(Debug)]
pub struct CopiedTree {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files_copied: usize,
    pub files_decompressed: usize,
    /// Entries that could not be copied; the rest of the tree is still copied.
    pub copy_failures: Vec<CollectorError>,
    /// Per-file decompression failures; the rest of the tree is still processed.
    pub decompress_failures: Vec<CollectorError>,
}

impl CopiedTree {
    pub fn is_complete(&self) -> bool {
        self.copy_failures.is_empty() && self.decompress_failures.is_empty()
    }

    /// One line describing every failure, for the session log and ledger.
    pub fn failure_summary(&self, instrument: u8) -> String {
        let mut parts = Vec::new();
        if let Some(first) = self.copy_failures.first() {
            parts.push(format!(
                "{} entries failed to copy (first: {})",
                self.copy_failures.len(),
                first
            ));
        }
        if let Some(first) = self.decompress_failures.first() {
            parts.push(format!(
                "{} of {} files failed to decompress (first: {})",
                self.decompress_failures.len(),
                self.files_copied,
                first
            ));
        }
        format!("nightly{}: {}", instrument, parts.join("; "))
    }
}

/// Files copied by `copy_tree` and the entries it had to skip.
#[derive(Debug, Default)]
struct CopyOutcome {
    copied: Vec<PathBuf>,
    failures: Vec<CollectorError>,
}

/// Copies instrument telemetry from the primary or fallback tree.
pub struct NightlyCollector {
    config: CollectorConfig,
    decompressor: Decompressor,
}

impl NightlyCollector {
    pub fn new(config: CollectorConfig) -> Self {
        let decompressor = Decompressor::new(&config);
        Self {
            config,
            decompressor,
        }
    }

    /// `<root>/nightly<i>/<YY>/<MM>/<DD>` under the primary and fallback roots.
    pub fn source_candidates(&self, instrument: u8, date: &ObservingDate) -> (PathBuf, PathBuf) {
        let relative = PathBuf::from(layout::nightly_dir_name(instrument))
            .join(date.short_year())
            .join(format!("{:02}", date.month()))
            .join(format!("{:02}", date.day()));
        (
            self.config.primary_root.join(&relative),
            self.config.fallback_root.join(relative),
        )
    }

    /// The first candidate tree that exists.
    pub fn resolve_source(
        &self,
        instrument: u8,
        date: &ObservingDate,
    ) -> Result<PathBuf, CollectorError> {
        let (primary, fallback) = self.source_candidates(instrument, date);
        if primary.is_dir() {
            Ok(primary)
        } else if fallback.is_dir() {
            Ok(fallback)
        } else {
            Err(CollectorError::SourceNotFound {
                instrument,
                primary,
                fallback,
            })
        }
    }

    /// Copies one instrument's tree into `<session>/nightly<i>` and expands it.
    pub async fn collect_instrument(
        &self,
        instrument: u8,
        ctx: &StageContext<'_>,
    ) -> Result<CopiedTree, CollectorError> {
        let source = self.resolve_source(instrument, &ctx.date)?;
        let destination = ctx.session_dir.join(layout::nightly_dir_name(instrument));
        ctx.log.info(&format!(
            "copying nightly{} from {} to {}",
            instrument,
            source.display(),
            destination.display()
        ));

        let CopyOutcome { copied, failures } = copy_tree(&source, &destination).await?;
        for failure in &failures {
            ctx.log.warning(&failure.to_string());
        }
        if copied.is_empty() && failures.is_empty() {
            return Err(CollectorError::EmptySource {
                instrument,
                path: source,
            });
        }

        let mut files_decompressed = 0;
        let mut decompress_failures = Vec::new();
        for path in copied.iter() {
            match self.decompressor.decompress(path).await {
                Ok(true) => files_decompressed += 1,
                Ok(false) => {}
                Err(e) => {
                    ctx.log.warning(&e.to_string());
                    decompress_failures.push(e);
                }
            }
        }

        Ok(CopiedTree {
            source,
            destination,
            files_copied: copied.len(),
            files_decompressed,
            copy_failures: failures,
            decompress_failures,
        })
    }

    /// Collects every instrument; one instrument failing never stops the other.
    pub async fn collect(&self, ctx: &StageContext<'_>) -> StageReport {
        let mut report = StageReport::new();

        for instrument in INSTRUMENTS {
            let column = LedgerColumn::Nightly(instrument);
            match self.collect_instrument(instrument, ctx).await {
                Ok(tree) if tree.is_complete() => {
                    ctx.log.info(&format!(
                        "nightly{}: copied {} files, decompressed {}",
                        instrument, tree.files_copied, tree.files_decompressed
                    ));
                    report.complete(column);
                    report.artifacts.push(SourceArtifact::new(
                        column.name(),
                        tree.destination,
                        ArtifactStatus::Fetched,
                    ));
                }
                Ok(tree) => {
                    report.fail(StageFailure::for_column(
                        column,
                        tree.failure_summary(instrument),
                    ));
                }
                Err(e) => {
                    report.fail(StageFailure::for_column(column, e.to_string()));
                }
            }
        }

        report
    }
}

/// Recursively copies `from` into `to`, creating directories and
/// overwriting existing files.
///
/// Only a destination root that cannot be created is an error. Any other
/// entry that cannot be listed, stat'ed or copied is recorded and skipped.
async fn copy_tree(from: &Path, to: &Path) -> Result<CopyOutcome, CollectorError> {
    fs::create_dir_all(to)
        .await
        .map_err(|e| CollectorError::DirectoryCreationFailed {
            path: to.to_path_buf(),
            source: e,
        })?;

    let mut outcome = CopyOutcome::default();
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        if let Err(e) = fs::create_dir_all(&dst_dir).await {
            outcome.failures.push(CollectorError::DirectoryCreationFailed {
                path: dst_dir,
                source: e,
            });
            continue;
        }

        let mut entries = match fs::read_dir(&src_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                outcome
                    .failures
                    .push(CollectorError::copy_failed(src_dir, dst_dir, e));
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    outcome.failures.push(CollectorError::copy_failed(
                        src_dir.clone(),
                        dst_dir.clone(),
                        e,
                    ));
                    break;
                }
            };
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());
            // Follows symlinks, like a plain recursive copy of their targets
            let metadata = match fs::metadata(&src).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    outcome.failures.push(CollectorError::copy_failed(src, dst, e));
                    continue;
                }
            };

            if metadata.is_dir() {
                pending.push((src, dst));
            } else if metadata.is_file() {
                match fs::copy(&src, &dst).await {
                    Ok(_) => outcome.copied.push(dst),
                    Err(e) => outcome.failures.push(CollectorError::copy_failed(src, dst, e)),
                }
            }
        }
    }

    Ok(outcome)
}
