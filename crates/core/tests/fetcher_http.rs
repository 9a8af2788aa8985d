//! Dataset fetching against an in-process upstream.

mod common;

use common::{archiver_response, FakeUpstream, IN_DATE_SECS};
use tempfile::TempDir;

use wxarchive_core::fetcher::{DatasetGroup, TelemetryDocument, PLACEHOLDER_CONTENT};
use wxarchive_core::pipeline::ArtifactStatus;
use wxarchive_core::session::{FileSessionLog, StageContext};
use wxarchive_core::testing::fixtures;
use wxarchive_core::{HttpFetcher, LedgerColumn, ObservingDate, SessionLog};

fn date() -> ObservingDate {
    ObservingDate::parse("2024-03-15").unwrap()
}

fn fetcher_for(upstream: &FakeUpstream) -> HttpFetcher {
    HttpFetcher::new(fixtures::feeds_at(&upstream.base_url)).unwrap()
}

#[tokio::test]
async fn test_archiver_queries_each_channel_for_the_day() {
    let upstream = FakeUpstream::start().await;
    upstream.serve("/k2/getData.json", 200, archiver_response("k2:dcs:pnt:cam0:fwhm"));
    let fetcher = fetcher_for(&upstream);

    let request = fetcher
        .catalog(&date())
        .into_iter()
        .find(|r| r.id == "k2_fwhm")
        .unwrap();
    let payload = fetcher.fetch(&request, &date()).await.unwrap();

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/k2/getData.json?pv=k2%3Adcs%3Apnt%3Acam0%3Afwhm&"));
    assert!(requests[0].contains("from=2024-03-15T00%3A00%3A00Z"));
    assert!(requests[0].contains("to=2024-03-15T23%3A59%3A59Z"));

    let doc: TelemetryDocument = serde_json::from_slice(&payload).unwrap();
    assert_eq!(doc.dataset, "k2_fwhm");
    assert_eq!(doc.date, "2024-03-15");
    let samples = &doc.channels["k2:dcs:pnt:cam0:fwhm"];
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].secs, IN_DATE_SECS);
}

#[tokio::test]
async fn test_server_error_is_error_not_missing() {
    let upstream = FakeUpstream::start().await;
    upstream.serve_all_feeds();
    upstream.serve("/seeing/dimm/20240315.dimm.dat", 500, "boom");
    let fetcher = fetcher_for(&upstream);
    let temp = TempDir::new().unwrap();
    let log = FileSessionLog::in_memory("wxarchive");
    let ctx = StageContext {
        date: date(),
        session_dir: temp.path(),
        log: &log,
    };

    let report = fetcher.fetch_all(&ctx).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].column, Some(LedgerColumn::Massdimm));
    assert!(report.failures[0].message.starts_with("dimm:"));
    assert!(report.completed.contains(&DatasetGroup::Telemetry.column()));
    assert!(report.completed.contains(&LedgerColumn::Skyprobe));
    assert!(!report.completed.contains(&LedgerColumn::Massdimm));

    let dimm = report.artifacts.iter().find(|a| a.source_id == "dimm").unwrap();
    assert_eq!(dimm.status, ArtifactStatus::Error);
    assert_eq!(
        std::fs::read_to_string(&dimm.local_path).unwrap(),
        PLACEHOLDER_CONTENT
    );

    // The page only links what was retrieved
    let page = std::fs::read_to_string(temp.path().join("massdimm/massdimm.html")).unwrap();
    assert!(!page.contains("20240315.mkwc.dimm.dat"));
    assert!(page.contains("20240315.mkwc.mass.dat"));
    assert!(log.contents().contains("fetching dimm"));
}
