//! Cross-process mutual exclusion over the registry file.
//!
//! Every operation that inspects or mutates the registry acquires this
//! lock first. Acquisition polls `try_lock_exclusive` with a fixed backoff
//! until either the lock is obtained or the configured timeout elapses;
//! release happens through `Drop`, so a panic mid-critical-section or an
//! early `?` return still relinquishes the hold.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Acquisition timeout for the registry lock, per spec.md §4.4.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A held exclusive lock on `registryDir/registry.lock`.
///
/// Dropping the guard releases the lock. There is no explicit `release`
/// method; the guard's lifetime IS the critical section.
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Acquires an exclusive lock on `lock_path`, creating the file if
    /// necessary, polling until acquired or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if the lock is still held by another
    /// process when `timeout` elapses. Returns [`Error::Io`] if the lock
    /// file cannot be opened or created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use portreg::lock::LockGuard;
    /// use std::time::Duration;
    ///
    /// let guard = LockGuard::acquire("/tmp/portreg-example/registry.lock", Duration::from_secs(5)).unwrap();
    /// drop(guard); // releases the lock
    /// ```
    pub fn acquire(lock_path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = lock_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let started = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file, path }),
                Err(_) => {
                    if started.elapsed() >= timeout {
                        return Err(Error::LockTimeout {
                            path: path.display().to_string(),
                            seconds: timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }

    /// The path of the lock file this guard holds.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
