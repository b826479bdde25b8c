//! # Data Directory Locking
//!
//! Prevents two processes from opening the same register database. Two
//! engines on one directory would each believe they own the counter rows.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default wait for a held lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from data directory locking.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created.
    #[error("failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),

    /// Directory is already locked by another process.
    #[error("register database already in use ({}), holder pid {:?}", .path.display(), .pid)]
    AlreadyLocked {
        /// PID recorded by the holder, when readable.
        pid: Option<u32>,
        /// Lock file path.
        path: PathBuf,
    },

    /// Failed to record our PID in the lock file.
    #[error("failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Exclusive lock on a data directory, released on drop.
pub struct DatabaseLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DatabaseLock {
    /// Lock file name.
    pub const LOCK_FILE: &'static str = "REGISTER.lock";

    /// Acquire the lock, waiting up to [`DEFAULT_LOCK_TIMEOUT`].
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire_with_timeout(data_dir, DEFAULT_LOCK_TIMEOUT)
    }

    /// Acquire the lock, retrying with exponential backoff until `timeout`.
    pub fn acquire_with_timeout(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let deadline = Instant::now() + timeout;
        let lock_path = data_dir.join(Self::LOCK_FILE);
        let mut retry_delay = Duration::from_millis(10);

        loop {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)
                .map_err(LockError::CreateFailed)?;

            if file.try_lock_exclusive().is_ok() {
                let pid = std::process::id();
                let mut file = file;
                file.set_len(0).map_err(LockError::WriteFailed)?;
                writeln!(file, "{pid}").map_err(LockError::WriteFailed)?;
                file.sync_all().map_err(LockError::WriteFailed)?;
                tracing::debug!(path = %lock_path.display(), pid, "[register] data directory locked");
                return Ok(Self {
                    file,
                    path: lock_path,
                    pid,
                });
            }

            if Instant::now() >= deadline {
                return Err(LockError::AlreadyLocked {
                    pid: Self::read_existing_pid(&lock_path),
                    path: lock_path,
                });
            }

            drop(file);
            std::thread::sleep(retry_delay);
            retry_delay = (retry_delay * 2).min(Duration::from_millis(250));
        }
    }

    /// PID of the process holding the lock.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
