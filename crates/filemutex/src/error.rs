//! Error types for file mutex operations

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Which side of the read/write lock an operation concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Write lock: one holder at a time
    Exclusive,
    /// Read lock: any number of concurrent holders
    Shared,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockMode::Exclusive => f.write_str("exclusive"),
            LockMode::Shared => f.write_str("shared"),
        }
    }
}

/// Error type for recoverable file mutex failures
///
/// Contention is never an error: blocking acquisitions wait, and only the
/// timed variants give up with [`FileMutexError::Timeout`]. Failures of the
/// advisory lock itself are not represented here, they abort the caller.
#[derive(Error, Debug)]
pub enum FileMutexError {
    /// I/O error while creating, opening or removing the lock file
    #[error("I/O error during {operation} on {}: {source}", path.display())]
    Io {
        /// The underlying I/O error
        source: std::io::Error,
        /// Path to the lock file
        path: PathBuf,
        /// Operation that failed
        operation: &'static str,
    },

    /// Timed acquisition gave up before both lock layers were held
    #[error("Timeout waiting {waited:?} for {mode} lock on {}", path.display())]
    Timeout {
        /// Path to the lock file
        path: PathBuf,
        /// Requested lock mode
        mode: LockMode,
        /// How long the caller waited
        waited: Duration,
    },
}

impl FileMutexError {
    pub(crate) fn io(
        source: std::io::Error,
        path: impl Into<PathBuf>,
        operation: &'static str,
    ) -> Self {
        FileMutexError::Io {
            source,
            path: path.into(),
            operation,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileMutexError>;
