//! Per-date session lock.
//!
//! A pid file created with create-new semantics. A lock whose pid is no
//! longer running is reclaimed; a live holder rejects the new session.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another session for this date is running (pid {pid}, lock {path})")]
    HeldBy { path: PathBuf, pid: u32 },

    #[error("could not read session lock {path}; remove it if no session is running")]
    Unreadable { path: PathBuf },

    #[error("failed to create session lock {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Held for the lifetime of a session; removes the lock file on drop.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
}

impl SessionLock {
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        match try_acquire(path)? {
            Attempt::Acquired(lock) => Ok(lock),
            Attempt::HeldBy(pid) => Err(LockError::HeldBy {
                path: path.to_path_buf(),
                pid,
            }),
            Attempt::Stale(pid) => {
                tracing::warn!("Reclaiming stale session lock {} (pid {})", path.display(), pid);
                let _ = std::fs::remove_file(path);
                match try_acquire(path)? {
                    Attempt::Acquired(lock) => Ok(lock),
                    Attempt::HeldBy(pid) | Attempt::Stale(pid) => Err(LockError::HeldBy {
                        path: path.to_path_buf(),
                        pid,
                    }),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

enum Attempt {
    Acquired(SessionLock),
    HeldBy(u32),
    Stale(u32),
}

fn try_acquire(path: &Path) -> Result<Attempt, LockError> {
    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(file) => {
            record_pid(file, path)?;
            Ok(Attempt::Acquired(SessionLock {
                path: path.to_path_buf(),
            }))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let mut contents = String::new();
            OpenOptions::new()
                .read(true)
                .open(path)
                .and_then(|mut file| file.read_to_string(&mut contents))
                .map_err(|_| LockError::Unreadable {
                    path: path.to_path_buf(),
                })?;

            let pid = contents
                .trim()
                .parse::<u32>()
                .map_err(|_| LockError::Unreadable {
                    path: path.to_path_buf(),
                })?;

            if is_process_running(pid) {
                Ok(Attempt::HeldBy(pid))
            } else {
                Ok(Attempt::Stale(pid))
            }
        }
        Err(e) => Err(LockError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes our pid into a freshly created lock; a lock left empty would be
/// unreadable to every later run, so it is removed on failure.
fn record_pid<W: Write>(mut writer: W, path: &Path) -> Result<(), LockError> {
    let written = writeln!(writer, "{}", std::process::id()).and_then(|_| writer.flush());
    written.map_err(|e| {
        let _ = std::fs::remove_file(path);
        LockError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

fn is_process_running(pid: u32) -> bool {
    let proc_root = Path::new("/proc");
    if proc_root.is_dir() {
        return proc_root.join(pid.to_string()).exists();
    }

    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
