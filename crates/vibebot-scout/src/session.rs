use crate::error::{Result, ScoutError};
use fs2::FileExt;
use parking_lot::{Mutex, MutexGuard};
use std::fs::{File, OpenOptions};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const LOCK_FILE_POLL: Duration = Duration::from_millis(50);

/// Exclusive access to the session. Dropping it releases both the in-process
/// mutex and the lock file.
pub struct SessionGuard<'a, C> {
    client: MutexGuard<'a, C>,
    lock_file: Option<File>,
}

impl<C> Deref for SessionGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C> DerefMut for SessionGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C> Drop for SessionGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(file) = self.lock_file.take() {
            if let Err(err) = FileExt::unlock(&file) {
                debug!(error = %err, "session lock file unlock failed");
            }
        }
    }
}

/// The single authenticated platform session. Acquisition and engagement
/// both go through [`SessionLock::acquire`]; a caller that cannot get the
/// session within the timeout gets [`ScoutError::ResourceBusy`].
///
/// Threads share it behind an `Arc`. Separate processes driving the same
/// account exclude each other through [`SessionLock::with_lock_file`].
pub struct SessionLock<C> {
    client: Mutex<C>,
    timeout: Duration,
    lock_file: Option<PathBuf>,
}

impl<C> SessionLock<C> {
    pub fn new(client: C, timeout: Duration) -> Self {
        Self {
            client: Mutex::new(client),
            timeout,
            lock_file: None,
        }
    }

    /// Also takes an advisory lock on `path` for as long as the guard lives.
    pub fn with_lock_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file = Some(path.into());
        self
    }

    /// Both locks share one deadline.
    pub fn acquire(&self) -> Result<SessionGuard<'_, C>> {
        let deadline = Instant::now() + self.timeout;
        let client = self
            .client
            .try_lock_for(self.timeout)
            .ok_or(ScoutError::ResourceBusy(self.timeout))?;
        let lock_file = match &self.lock_file {
            Some(path) => Some(lock_until(path, deadline, self.timeout)?),
            None => None,
        };
        Ok(SessionGuard { client, lock_file })
    }
}

fn lock_until(path: &Path, deadline: Instant, timeout: Duration) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                let now = Instant::now();
                if now >= deadline {
                    debug!(path = %path.display(), "session lock file held elsewhere");
                    return Err(ScoutError::ResourceBusy(timeout));
                }
                thread::sleep(LOCK_FILE_POLL.min(deadline - now));
            }
            Err(err) => return Err(err.into()),
        }
    }
}
