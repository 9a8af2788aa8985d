//! Archive session state: the observing date, the directories a run owns,
//! its log and its error accounting.

mod date;
mod lock;
mod log;

pub use date::{DateError, ObservingDate};
pub use lock::{LockError, SessionLock};
pub use log::{FileSessionLog, LogLevel, NoopSessionLog, SessionLog};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ledger::LedgerColumn;

/// Logger name written into every session log line.
pub const LOG_NAME: &str = "wxarchive";

/// In-progress marker written into the session directory while a run is active.
pub const MARKER_FILE: &str = "wx.LOC";

/// Fixed file and directory names of the archive layout.
pub mod layout {
    use super::ObservingDate;
    use std::path::{Path, PathBuf};

    pub const README_FILE: &str = "README";
    pub const INDEX_FILE: &str = "index.html";
    pub const MASSDIMM_DIR: &str = "massdimm";
    pub const SKYPROBE_DIR: &str = "skyprobe";

    /// `root/<YYYYMMDD>`
    pub fn session_dir(root: &Path, date: &ObservingDate) -> PathBuf {
        root.join(date.compact())
    }

    /// `root/weather_<YYYYMMDD>.log`
    pub fn log_file(root: &Path, date: &ObservingDate) -> PathBuf {
        root.join(format!("weather_{}.log", date.compact()))
    }

    /// `root/.wx_<YYYYMMDD>.lock`
    pub fn lock_file(root: &Path, date: &ObservingDate) -> PathBuf {
        root.join(format!(".wx_{}.lock", date.compact()))
    }

    /// `weather<YYYYMMDD>.md5sum`, written at the session directory root.
    pub fn manifest_file_name(date: &ObservingDate) -> String {
        format!("weather{}.md5sum", date.compact())
    }

    /// `nightly<i>`
    pub fn nightly_dir_name(instrument: u8) -> String {
        format!("nightly{}", instrument)
    }
}

/// Borrowed view of a session handed to each stage.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub date: ObservingDate,
    pub session_dir: &'a Path,
    pub log: &'a dyn SessionLog,
}

/// One pipeline run for one observing date.
///
/// Only the orchestrator holds this mutably.
pub struct ArchiveSession {
    date: ObservingDate,
    session_dir: PathBuf,
    ledger_enabled: bool,
    error_count: u32,
    failed_columns: HashSet<LedgerColumn>,
    log: Arc<dyn SessionLog>,
}

impl ArchiveSession {
    pub fn new(
        date: ObservingDate,
        root_dir: &Path,
        ledger_enabled: bool,
        log: Arc<dyn SessionLog>,
    ) -> Self {
        Self {
            date,
            session_dir: layout::session_dir(root_dir, &date),
            ledger_enabled,
            error_count: 0,
            failed_columns: HashSet::new(),
            log,
        }
    }

    pub fn date(&self) -> ObservingDate {
        self.date
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn ledger_enabled(&self) -> bool {
        self.ledger_enabled
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn log(&self) -> &dyn SessionLog {
        self.log.as_ref()
    }

    pub fn context(&self) -> StageContext<'_> {
        StageContext {
            date: self.date,
            session_dir: &self.session_dir,
            log: self.log.as_ref(),
        }
    }

    /// Logs at ERROR and bumps the error count.
    pub fn record_error(&mut self, message: &str) {
        self.error_count += 1;
        self.log.error(message);
    }

    /// Marks a ledger column as failed; returns `false` if it already was.
    pub fn mark_failed(&mut self, column: LedgerColumn) -> bool {
        self.failed_columns.insert(column)
    }

    pub fn is_failed(&self, column: LedgerColumn) -> bool {
        self.failed_columns.contains(&column)
    }
}
