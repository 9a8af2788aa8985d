//! Common test utilities: an in-process fake upstream and a session harness.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use tempfile::TempDir;

use wxarchive_core::config::Config;
use wxarchive_core::testing::{fixtures, MockLedger, MockNotifier, MockRenderer, MockTransfer};
use wxarchive_core::{ArchivePipeline, ReportRenderer, TemplateRenderer};

/// 2024-03-15T01:00:00Z
pub const IN_DATE_SECS: i64 = 1_710_464_400;
/// 2024-03-14T23:00:00Z
pub const BEFORE_DATE_SECS: i64 = 1_710_457_200;

#[derive(Default)]
struct UpstreamState {
    responses: HashMap<String, (u16, Vec<u8>)>,
    requests: Vec<String>,
}

/// HTTP server answering from a path -> (status, body) table; unknown
/// paths get 404. Every request's path and query is recorded.
#[derive(Clone)]
pub struct FakeUpstream {
    pub base_url: String,
    state: Arc<Mutex<UpstreamState>>,
}

async fn respond(
    State(state): State<Arc<Mutex<UpstreamState>>>,
    uri: Uri,
) -> (StatusCode, Vec<u8>) {
    let mut state = state.lock().unwrap();
    state.requests.push(
        uri.path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
    );
    match state.responses.get(uri.path()) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            body.clone(),
        ),
        None => (StatusCode::NOT_FOUND, b"not found".to_vec()),
    }
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(UpstreamState::default()));
        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn serve(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn remove(&self, path: &str) {
        self.state.lock().unwrap().responses.remove(path);
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Every dataset of the catalog for 2024-03-15, answered successfully.
    pub fn serve_all_feeds(&self) {
        for kind in ["dimm", "mass", "masspro"] {
            self.serve(
                &format!("/seeing/{0}/20240315.{0}.dat", kind),
                200,
                format!("# {} seeing\n2024-03-15 05:00:00 0.45\n", kind),
            );
        }
        self.serve("/plots/images/20240315.wrf-vs-mkam.timeseries.jpg", 200, vec![0xff, 0xd8, 1]);
        self.serve("/plots/images/20240315.massprofile.jpg", 200, vec![0xff, 0xd8, 2]);
        self.serve("/plots/analysis/images/dimmdailyhistogram.jpg", 200, vec![0xff, 0xd8, 3]);
        self.serve("/plots/analysis/images/massdailyhistogram.jpg", 200, vec![0xff, 0xd8, 4]);
        self.serve("/skyprobe/mcal_20240315.png", 200, vec![0x89, b'P', b'N', b'G']);
        for instrument in [1, 2] {
            self.serve(
                &format!("/k{}/getData.json", instrument),
                200,
                archiver_response(&format!("k{}:met:tempRaw", instrument)),
            );
        }
    }
}

/// One channel with a sample on 2024-03-15 and one on the previous day.
pub fn archiver_response(channel: &str) -> String {
    format!(
        r#"[{{"meta": {{"name": "{}", "PREC": "2"}},
            "data": [
              {{"secs": {}, "val": 1.5, "nanos": 0, "severity": 0, "status": 0}},
              {{"secs": {}, "val": 2.5, "nanos": 0, "severity": 0, "status": 0}}
            ]}}]"#,
        channel, BEFORE_DATE_SECS, IN_DATE_SECS
    )
}

/// A pipeline wired to mocks, a fake upstream and a temporary archive.
pub struct Harness {
    pub pipeline: ArchivePipeline,
    pub ledger: Arc<MockLedger>,
    pub transfer: Arc<MockTransfer>,
    pub notifier: Arc<MockNotifier>,
    pub renderer: Arc<MockRenderer>,
    pub config: Config,
    pub temp: TempDir,
    pub archive_root: PathBuf,
}

impl Harness {
    /// Feeds point at `upstream` (or nowhere) and instrument trees live
    /// under the temporary directory.
    pub fn new(upstream: Option<&FakeUpstream>) -> Self {
        Self::build(upstream, false)
    }

    /// Same as `new` but renders the real index page.
    pub fn with_template_renderer(upstream: Option<&FakeUpstream>) -> Self {
        Self::build(upstream, true)
    }

    fn build(upstream: Option<&FakeUpstream>, template: bool) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut config = fixtures::offline_config();
        config.collector.primary_root = temp.path().join("h");
        config.collector.fallback_root = temp.path().join("s");
        if let Some(upstream) = upstream {
            config.feeds = fixtures::feeds_at(&upstream.base_url);
        }

        let ledger = Arc::new(MockLedger::new());
        let transfer = Arc::new(MockTransfer::new());
        let notifier = Arc::new(MockNotifier::new());
        let renderer = Arc::new(MockRenderer::new());
        let active_renderer: Arc<dyn ReportRenderer> = if template {
            Arc::new(TemplateRenderer::new(&config.report))
        } else {
            renderer.clone() as Arc<dyn ReportRenderer>
        };

        let pipeline = ArchivePipeline::new(
            Arc::new(config.clone()),
            ledger.clone(),
            active_renderer,
            transfer.clone(),
            notifier.clone(),
        )
        .expect("Failed to create pipeline");

        let archive_root = temp.path().join("archive");
        Self {
            pipeline,
            ledger,
            transfer,
            notifier,
            renderer,
            config,
            temp,
            archive_root,
        }
    }

    /// Populate `<root>/nightly<i>/24/03/15` with a couple of files.
    pub fn seed_nightly(&self, root: &str, instrument: u8) -> PathBuf {
        let dir = self
            .temp
            .path()
            .join(root)
            .join(format!("nightly{}", instrument))
            .join("24/03/15");
        std::fs::create_dir_all(dir.join("dcs")).unwrap();
        std::fs::write(dir.join("envMet.arT"), format!("k{} met\n", instrument)).unwrap();
        std::fs::write(dir.join("dcs/dcs.log"), "dcs\n").unwrap();
        dir
    }

    pub fn session_dir(&self) -> PathBuf {
        self.archive_root.join("20240315")
    }
}

/// Every regular file under `dir`, as paths relative to it.
pub fn regular_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let entry = entry.unwrap();
            let file_type = entry.file_type().unwrap();
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
                files.push(relative.to_string_lossy().into_owned());
            }
        }
    }
    files.sort();
    files
}
