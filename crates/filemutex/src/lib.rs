//! Cross-process read/write mutex
//!
//! [`FileMutex`] works like [`std::sync::RwLock`] but also synchronizes with
//! other processes that open the same lock file path. Each instance owns an
//! in-process read/write lock and an open handle on the lock file; holds are
//! taken on the in-process lock first and then on the OS advisory lock
//! (`flock(2)` on Unix, `LockFileEx` on Windows).
//!
//! Contention is handled by blocking. Only construction and the timed
//! variants return errors; a failing advisory lock call means the locking
//! state can no longer be trusted and panics.
//!
//! ```no_run
//! use filemutex::FileMutex;
//!
//! # fn main() -> filemutex::Result<()> {
//! let mutex = FileMutex::new("/tmp/build.lock")?;
//! let guard = mutex.lock();
//! // Only one thread of one process gets here at a time
//! guard.close()?; // unlock and remove /tmp/build.lock
//! # Ok(())
//! # }
//! ```

mod acquire;
mod advisory;
mod error;
mod guard;
mod mutex;
mod options;

pub use error::{FileMutexError, LockMode, Result};
pub use guard::{FileMutexReadGuard, FileMutexWriteGuard};
pub use mutex::FileMutex;
pub use options::{FileMutexOptions, DEFAULT_MODE};
