//! HTTP dataset fetcher.

use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::FeedsConfig;
use crate::pipeline::{ArtifactStatus, SourceArtifact, StageFailure, StageReport};
use crate::session::{layout, ObservingDate, StageContext};

use super::archiver::{filter_samples, ArchiverChannel, TelemetryDocument};
use super::catalog::dataset_catalog;
use super::error::FetchError;
use super::pages::{render_massdimm_page, render_skyprobe_page};
use super::types::{DatasetGroup, DatasetRequest, DatasetSource, PLACEHOLDER_CONTENT};

/// Fetches the dataset catalog sequentially.
pub struct HttpFetcher {
    client: Client,
    config: FeedsConfig,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with the given configuration.
    pub fn new(config: FeedsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn catalog(&self, date: &ObservingDate) -> Vec<DatasetRequest> {
        dataset_catalog(&self.config, date)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, self.config.timeout_secs, e))?;

        let status = response.status();
        debug!(url = url, status = status.as_u16(), "Feed response");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, self.config.timeout_secs, e))?;
        Ok(body.to_vec())
    }

    /// Retrieves one dataset's payload.
    pub async fn fetch(
        &self,
        request: &DatasetRequest,
        date: &ObservingDate,
    ) -> Result<Vec<u8>, FetchError> {
        match &request.source {
            DatasetSource::File { url } => self.get(url, &[]).await,
            DatasetSource::Archiver { url, channels } => {
                let from = format!("{}T00:00:00Z", date.canonical());
                let to = format!("{}T23:59:59Z", date.canonical());
                let mut document = TelemetryDocument::new(&request.id, date);

                for channel in channels {
                    let body = self
                        .get(
                            url,
                            &[("pv", channel.as_str()), ("from", from.as_str()), ("to", to.as_str())],
                        )
                        .await?;
                    let entries: Vec<ArchiverChannel> =
                        serde_json::from_slice(&body).map_err(|e| FetchError::ParseError {
                            url: url.clone(),
                            reason: format!("{}: {}", channel, e),
                        })?;
                    document
                        .channels
                        .insert(channel.clone(), filter_samples(&entries, date));
                }

                serde_json::to_vec_pretty(&document).map_err(|e| FetchError::ParseError {
                    url: url.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Fetches one dataset into the session directory, writing the
    /// placeholder when retrieval fails.
    pub async fn fetch_into(
        &self,
        request: &DatasetRequest,
        ctx: &StageContext<'_>,
    ) -> (SourceArtifact, Option<FetchError>) {
        let local_path = ctx.session_dir.join(&request.destination);
        ctx.log.info(&format!("fetching {}", request.id));

        let result = match self.fetch(request, &ctx.date).await {
            Ok(payload) => write_file(&local_path, &payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => (
                SourceArtifact::new(&request.id, local_path, ArtifactStatus::Fetched),
                None,
            ),
            Err(e) => {
                let status = if e.is_missing() {
                    ArtifactStatus::Missing
                } else {
                    ArtifactStatus::Error
                };
                if let Err(write_err) = write_file(&local_path, PLACEHOLDER_CONTENT.as_bytes()).await {
                    ctx.log.warning(&format!(
                        "could not write placeholder for {}: {}",
                        request.id, write_err
                    ));
                }
                (SourceArtifact::new(&request.id, local_path, status), Some(e))
            }
        }
    }

    /// Fetches the whole catalog and writes the auxiliary pages.
    pub async fn fetch_all(&self, ctx: &StageContext<'_>) -> StageReport {
        let mut report = StageReport::new();
        let catalog = self.catalog(&ctx.date);
        let mut failed_groups: HashSet<DatasetGroup> = HashSet::new();

        for request in &catalog {
            let (artifact, error) = self.fetch_into(request, ctx).await;
            if let Some(e) = error {
                failed_groups.insert(request.group);
                report.fail(StageFailure::for_column(
                    request.group.column(),
                    format!("{}: {}", request.id, e),
                ));
            }
            report.artifacts.push(artifact);
        }

        let seeing: Vec<SourceArtifact> = catalog
            .iter()
            .zip(report.artifacts.iter())
            .filter(|(request, _)| request.group == DatasetGroup::Seeing)
            .map(|(_, artifact)| artifact.clone())
            .collect();

        let pages = [
            (
                DatasetGroup::Seeing,
                Path::new(layout::MASSDIMM_DIR).join("massdimm.html"),
                render_massdimm_page(&seeing),
            ),
            (
                DatasetGroup::Skyprobe,
                Path::new(layout::SKYPROBE_DIR).join("skyprobe.html"),
                render_skyprobe_page(&ctx.date),
            ),
        ];
        for (group, relative, contents) in pages {
            if let Err(e) = write_file(&ctx.session_dir.join(&relative), contents.as_bytes()).await {
                failed_groups.insert(group);
                report.fail(StageFailure::for_column(group.column(), e.to_string()));
            }
        }

        let mut groups: Vec<DatasetGroup> = Vec::new();
        for request in &catalog {
            if !groups.contains(&request.group) {
                groups.push(request.group);
            }
        }
        for group in groups {
            if !failed_groups.contains(&group) {
                report.complete(group.column());
            }
        }

        report
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), FetchError> {
    let write_err = |e| FetchError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, contents).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerColumn;
    use crate::session::NoopSessionLog;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unreachable_feeds_leave_placeholders_everywhere() {
        let temp = TempDir::new().unwrap();
        let fetcher = HttpFetcher::new(fixtures::offline_config().feeds).unwrap();
        let ctx = StageContext {
            date: ObservingDate::parse("2024-03-15").unwrap(),
            session_dir: temp.path(),
            log: &NoopSessionLog,
        };

        let report = fetcher.fetch_all(&ctx).await;

        assert!(report.completed.is_empty());
        assert_eq!(report.failures.len(), 12);
        for artifact in &report.artifacts {
            assert_eq!(artifact.status, ArtifactStatus::Error);
            assert_eq!(
                std::fs::read_to_string(&artifact.local_path).unwrap(),
                PLACEHOLDER_CONTENT
            );
        }
        assert!(temp.path().join("skyprobe/skyprobe.html").is_file());
        assert!(temp.path().join("massdimm/massdimm.html").is_file());
        let columns: HashSet<LedgerColumn> =
            report.failures.iter().filter_map(|f| f.column).collect();
        assert_eq!(columns.len(), 3);
    }
}
