//! Advisory file locking supplied by the OS
//!
//! `flock(2)` on Unix and `LockFileEx` on Windows, through `fs2`. The lock
//! table lives in the kernel and is what makes holds visible to other
//! processes, so nothing here keeps state of its own.
//!
//! Contention is the only expected failure. Anything else means the
//! descriptor or the OS call is broken while the in-process lock is already
//! held, and the caller is aborted.

use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::LockMode;

/// Blocks until the advisory lock is held in `mode`
pub(crate) fn acquire(file: &File, path: &Path, mode: LockMode) {
    // Fully qualified: std's inherent `File::lock_shared`/`unlock` would
    // otherwise shadow the fs2 trait methods on newer toolchains.
    let result = match mode {
        LockMode::Exclusive => FileExt::lock_exclusive(file),
        LockMode::Shared => FileExt::lock_shared(file),
    };
    if let Err(e) = result {
        fatal("acquire", path, mode, e);
    }
    tracing::debug!(%mode, path = %path.display(), "advisory lock acquired");
}

/// Single non-blocking attempt; `false` if another handle holds a
/// conflicting lock
pub(crate) fn try_acquire(file: &File, path: &Path, mode: LockMode) -> bool {
    let result = match mode {
        LockMode::Exclusive => FileExt::try_lock_exclusive(file),
        LockMode::Shared => FileExt::try_lock_shared(file),
    };
    match result {
        Ok(()) => {
            tracing::debug!(%mode, path = %path.display(), "advisory lock acquired");
            true
        }
        Err(e) if is_contended(&e) => false,
        Err(e) => fatal("acquire", path, mode, e),
    }
}

/// Releases whatever advisory lock the handle holds
pub(crate) fn release(file: &File, path: &Path, mode: LockMode) {
    if let Err(e) = FileExt::unlock(file) {
        fatal("release", path, mode, e);
    }
    tracing::debug!(%mode, path = %path.display(), "advisory lock released");
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || (err.raw_os_error().is_some()
            && err.raw_os_error() == fs2::lock_contended_error().raw_os_error())
}

fn fatal(operation: &str, path: &Path, mode: LockMode, err: io::Error) -> ! {
    tracing::error!(
        %mode,
        path = %path.display(),
        error = %err,
        "advisory lock {} failed",
        operation
    );
    panic!(
        "failed to {operation} {mode} advisory lock on {}: {err}",
        path.display()
    );
}
