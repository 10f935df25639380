//! RAII guards releasing both lock layers

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

use crate::advisory;
use crate::error::{FileMutexError, LockMode, Result};
use crate::mutex::FileMutex;

/// Exclusive hold on a [`FileMutex`]
///
/// Dropping the guard releases the advisory lock, then the in-process
/// write lock.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct FileMutexWriteGuard<'a> {
    mutex: &'a FileMutex,
    local: RwLockWriteGuard<'a, Option<File>>,
}

impl<'a> FileMutexWriteGuard<'a> {
    pub(crate) fn new(mutex: &'a FileMutex, local: RwLockWriteGuard<'a, Option<File>>) -> Self {
        Self { mutex, local }
    }

    /// Path of the lock file this guard holds
    pub fn path(&self) -> &Path {
        self.mutex.path()
    }

    /// Releases the exclusive lock. Same as dropping the guard.
    pub fn unlock(self) {}

    /// Releases the lock, closes the lock file and deletes it.
    ///
    /// The originating [`FileMutex`] cannot be locked again afterwards;
    /// create a new one for the next acquisition. Using the closed mutex
    /// panics.
    ///
    /// Closing the handle is best-effort. A failure to delete the file is
    /// returned, except when the file is already gone. The in-process lock
    /// is released in every case.
    ///
    /// The file is unlinked after the advisory lock is released. A process
    /// already blocked on the old file can take the lock in that window
    /// while a new `FileMutex::new` on the same path creates a fresh file,
    /// so two holders may coexist. Processes sharing a path must all follow
    /// the one-mutex-per-acquisition pattern and tolerate this.
    pub fn close(mut self) -> Result<()> {
        let mutex = self.mutex;

        if let Some(file) = self.local.take() {
            advisory::release(&file, mutex.path(), LockMode::Exclusive);
            drop(file);
        }

        let removed = match fs::remove_file(mutex.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::warn!(
                    path = %mutex.path().display(),
                    error = %e,
                    "failed to remove lock file"
                );
                Err(FileMutexError::io(e, mutex.path(), "remove lock file"))
            }
        };
        tracing::debug!(path = %mutex.path().display(), "lock file closed");

        drop(self);
        removed
    }
}

impl Drop for FileMutexWriteGuard<'_> {
    fn drop(&mut self) {
        // Already released by `close`
        if let Some(file) = self.local.as_ref() {
            advisory::release(file, self.mutex.path(), LockMode::Exclusive);
        }
    }
}

/// Shared hold on a [`FileMutex`]
///
/// The advisory shared lock is released when the last local reader drops
/// its guard, then the in-process read lock.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct FileMutexReadGuard<'a> {
    mutex: &'a FileMutex,
    local: RwLockReadGuard<'a, Option<File>>,
}

impl<'a> FileMutexReadGuard<'a> {
    pub(crate) fn new(mutex: &'a FileMutex, local: RwLockReadGuard<'a, Option<File>>) -> Self {
        Self { mutex, local }
    }

    /// Path of the lock file this guard holds
    pub fn path(&self) -> &Path {
        self.mutex.path()
    }

    /// Releases the shared lock. Same as dropping the guard.
    pub fn unlock(self) {}
}

impl Drop for FileMutexReadGuard<'_> {
    fn drop(&mut self) {
        let mut readers = self
            .mutex
            .readers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *readers -= 1;
        if *readers == 0 {
            if let Some(file) = self.local.as_ref() {
                advisory::release(file, self.mutex.path(), LockMode::Shared);
            }
        }
    }
}
