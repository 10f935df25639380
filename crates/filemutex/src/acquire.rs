//! Timed acquisition with retry and exponential backoff

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{FileMutexError, LockMode, Result};
use crate::guard::{FileMutexReadGuard, FileMutexWriteGuard};
use crate::mutex::FileMutex;

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(10);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);
const PROGRESS_MESSAGE_THRESHOLD: Duration = Duration::from_secs(2);

impl FileMutex {
    /// Acquires the exclusive lock, giving up after `timeout`.
    ///
    /// A zero timeout makes a single attempt. On timeout nothing is held.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filemutex::FileMutex;
    /// use std::time::Duration;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mutex = FileMutex::new(std::env::temp_dir().join("my.lock"))?;
    /// let guard = mutex.lock_timeout(Duration::from_secs(30))?;
    /// // Critical section here
    /// drop(guard);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lock_timeout(&self, timeout: Duration) -> Result<FileMutexWriteGuard<'_>> {
        retry_until(self.path(), LockMode::Exclusive, timeout, || self.try_lock())
    }

    /// Acquires a shared lock, giving up after `timeout`.
    pub fn rlock_timeout(&self, timeout: Duration) -> Result<FileMutexReadGuard<'_>> {
        retry_until(self.path(), LockMode::Shared, timeout, || self.try_rlock())
    }
}

fn retry_until<G>(
    path: &Path,
    mode: LockMode,
    timeout: Duration,
    mut attempt: impl FnMut() -> Option<G>,
) -> Result<G> {
    let start = Instant::now();
    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut progress_shown = false;

    loop {
        if let Some(guard) = attempt() {
            return Ok(guard);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(FileMutexError::Timeout {
                path: path.to_path_buf(),
                mode,
                waited: elapsed,
            });
        }

        if !progress_shown && elapsed >= PROGRESS_MESSAGE_THRESHOLD {
            tracing::info!(%mode, path = %path.display(), "waiting for lock");
            progress_shown = true;
        }

        // Never sleep past the deadline
        thread::sleep(retry_delay.min(timeout - elapsed));
        retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_retry_returns_first_success() {
        let attempts = Cell::new(0);
        let result = retry_until(
            Path::new("x.lock"),
            LockMode::Exclusive,
            Duration::from_secs(5),
            || {
                attempts.set(attempts.get() + 1);
                (attempts.get() == 3).then_some(())
            },
        );

        assert!(result.is_ok());
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_zero_timeout_makes_single_attempt() {
        let attempts = Cell::new(0);
        let result = retry_until(Path::new("x.lock"), LockMode::Shared, Duration::ZERO, || {
            attempts.set(attempts.get() + 1);
            None::<()>
        });

        assert!(matches!(
            result,
            Err(FileMutexError::Timeout {
                mode: LockMode::Shared,
                ..
            })
        ));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_backoff_does_not_overshoot_deadline() {
        let start = Instant::now();
        let result = retry_until(
            Path::new("x.lock"),
            LockMode::Exclusive,
            Duration::from_millis(120),
            || None::<()>,
        );

        assert!(result.is_err());
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(120) && elapsed < Duration::from_millis(400),
            "Should give up shortly after the deadline, elapsed: {:?}",
            elapsed
        );
    }
}
