//! Advisory file locking for the data directory
//!
//! Each JSON storage call holds a lock on `<root>/.lock` for its own
//! read-modify-write of one collection. The lock is released between calls,
//! so a multi-call command is only serialized within one process.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt as Fs4FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = Fs4FileExt::unlock(&self.file);
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

impl LockMode {
    fn try_lock(self, file: &File) -> std::io::Result<bool> {
        match self {
            LockMode::Shared => Fs4FileExt::try_lock_shared(file),
            LockMode::Exclusive => Fs4FileExt::try_lock_exclusive(file),
        }
    }

    fn label(self) -> &'static str {
        match self {
            LockMode::Shared => "shared",
            LockMode::Exclusive => "exclusive",
        }
    }
}

/// Polling file locker with a timeout
///
/// Uses advisory locks (flock on Unix, LockFileEx on Windows).
///
/// # Examples
///
/// ```no_run
/// use cloudboard::storage::FileLocker;
/// use std::path::Path;
/// use std::time::Duration;
///
/// let locker = FileLocker::new(Duration::from_secs(5));
/// let guard = locker.lock_exclusive(Path::new("data/.lock")).unwrap();
/// // ... write collections ...
/// drop(guard);
/// ```
#[derive(Debug, Clone)]
pub struct FileLocker {
    timeout: Duration,
}

impl FileLocker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Acquire an exclusive (write) lock, waiting up to the timeout
    pub fn lock_exclusive(&self, path: &Path) -> Result<LockGuard> {
        self.acquire(path, LockMode::Exclusive)
    }

    /// Acquire a shared (read) lock, waiting up to the timeout
    pub fn lock_shared(&self, path: &Path) -> Result<LockGuard> {
        self.acquire(path, LockMode::Shared)
    }

    fn acquire(&self, path: &Path, mode: LockMode) -> Result<LockGuard> {
        let file = open_or_create(path)?;
        let start = Instant::now();

        loop {
            match mode.try_lock(&file) {
                Ok(true) => return Ok(LockGuard { file }),
                Ok(false) => {
                    if start.elapsed() >= self.timeout {
                        anyhow::bail!(
                            "Lock timeout: could not acquire {} lock on {} after {:?}",
                            mode.label(),
                            path.display(),
                            self.timeout
                        );
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    anyhow::bail!("IO error while trying to lock {}: {}", path.display(), e);
                }
            }
        }
    }
}

fn open_or_create(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open file for locking: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_dropping_guard_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join(".lock");
        let locker = FileLocker::new(Duration::from_millis(50));

        let guard = locker.lock_exclusive(&file_path).unwrap();
        assert!(locker.lock_shared(&file_path).is_err());

        drop(guard);
        assert!(locker.lock_shared(&file_path).is_ok());
        assert!(file_path.exists());
    }

    #[test]
    fn test_exclusive_lock_times_out_while_held() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join(".lock");

        let holder = FileLocker::new(Duration::from_millis(500));
        let _guard = holder.lock_exclusive(&file_path).unwrap();

        let path = file_path.clone();
        let waiter = thread::spawn(move || {
            FileLocker::new(Duration::from_millis(50)).lock_exclusive(&path)
        });

        let err = waiter.join().unwrap().unwrap_err();
        assert!(err.to_string().contains("Lock timeout"));
    }

    #[test]
    fn test_shared_locks_allow_concurrent_readers() {
        let temp_dir = TempDir::new().unwrap();
        let path = Arc::new(temp_dir.path().join(".lock"));
        let barrier = Arc::new(Barrier::new(3));
        let acquired = Arc::new(Mutex::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let path = Arc::clone(&path);
                let barrier = Arc::clone(&barrier);
                let acquired = Arc::clone(&acquired);
                thread::spawn(move || {
                    barrier.wait();
                    let locker = FileLocker::new(Duration::from_millis(500));
                    if let Ok(_guard) = locker.lock_shared(&path) {
                        thread::sleep(Duration::from_millis(50));
                        *acquired.lock().unwrap() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*acquired.lock().unwrap(), 3);
    }
}
