//! The two-layer mutex: an in-process `RwLock` paired with an advisory file lock

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, TryLockError};

use crate::advisory;
use crate::error::{LockMode, Result};
use crate::guard::{FileMutexReadGuard, FileMutexWriteGuard};
use crate::options::FileMutexOptions;

/// A read/write mutex that synchronizes threads of this process and other
/// processes using the same lock file path.
///
/// Every acquisition takes the in-process lock first and the advisory file
/// lock second; release happens in the reverse order when the guard is
/// dropped. Advisory locks are scoped to the open file handle, so two
/// `FileMutex` values pointing at the same path exclude each other even
/// inside a single process.
///
/// # Examples
///
/// ```no_run
/// use filemutex::FileMutex;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mutex = FileMutex::new("/tmp/my.lock")?;
///
/// {
///     let _guard = mutex.lock();
///     // Exclusive critical section
/// }
///
/// let _reader = mutex.rlock();
/// // Shared critical section
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileMutex {
    pub(crate) path: PathBuf,
    /// Guards the lock file handle. `None` once the file has been closed.
    pub(crate) local: RwLock<Option<File>>,
    /// Number of local shared holders; the advisory shared lock is held
    /// while this is non-zero.
    pub(crate) readers: Mutex<usize>,
}

impl FileMutex {
    /// Opens the lock file at `path`, creating it if absent.
    ///
    /// Fails if the file cannot be opened or created, e.g. because its
    /// directory does not exist or permission is denied.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, &FileMutexOptions::default())
    }

    /// Opens the lock file at `path` using the given options.
    pub fn with_options(path: impl AsRef<Path>, options: &FileMutexOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = options.open(path)?;
        tracing::debug!(path = %path.display(), "opened lock file");

        Ok(Self {
            path: path.to_path_buf(),
            local: RwLock::new(Some(file)),
            readers: Mutex::new(0),
        })
    }

    /// Path of the backing lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquires the exclusive lock, blocking until no other thread or
    /// process holds it in either mode.
    ///
    /// # Panics
    ///
    /// Panics if the advisory lock call fails for a reason other than
    /// contention, or if the lock file was already closed.
    pub fn lock(&self) -> FileMutexWriteGuard<'_> {
        let local = self.local.write().unwrap_or_else(PoisonError::into_inner);
        advisory::acquire(handle(&local, &self.path), &self.path, LockMode::Exclusive);
        FileMutexWriteGuard::new(self, local)
    }

    /// Acquires a shared lock, blocking only while a writer holds the lock
    /// in this process or another.
    ///
    /// # Panics
    ///
    /// Same conditions as [`FileMutex::lock`].
    pub fn rlock(&self) -> FileMutexReadGuard<'_> {
        let local = self.local.read().unwrap_or_else(PoisonError::into_inner);
        let file = handle(&local, &self.path);

        let mut readers = self.readers.lock().unwrap_or_else(PoisonError::into_inner);
        if *readers == 0 {
            advisory::acquire(file, &self.path, LockMode::Shared);
        }
        *readers += 1;
        drop(readers);

        FileMutexReadGuard::new(self, local)
    }

    /// Attempts to acquire the exclusive lock without blocking.
    ///
    /// Returns `None` if either layer is contended, in which case nothing is
    /// held.
    pub fn try_lock(&self) -> Option<FileMutexWriteGuard<'_>> {
        let local = match self.local.try_write() {
            Ok(local) => local,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };

        if !advisory::try_acquire(handle(&local, &self.path), &self.path, LockMode::Exclusive) {
            return None;
        }
        Some(FileMutexWriteGuard::new(self, local))
    }

    /// Attempts to acquire a shared lock without blocking.
    ///
    /// May return `None` while another local reader of this instance is
    /// taking or releasing the advisory lock, even if a shared hold would be
    /// granted a moment later. Use [`FileMutex::rlock_timeout`] to retry.
    pub fn try_rlock(&self) -> Option<FileMutexReadGuard<'_>> {
        let local = match self.local.try_read() {
            Ok(local) => local,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        let file = handle(&local, &self.path);

        // Another local reader may be blocked taking the advisory lock
        let mut readers = match self.readers.try_lock() {
            Ok(readers) => readers,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        if *readers == 0 && !advisory::try_acquire(file, &self.path, LockMode::Shared) {
            return None;
        }
        *readers += 1;
        drop(readers);

        Some(FileMutexReadGuard::new(self, local))
    }
}

fn handle<'a>(file: &'a Option<File>, path: &Path) -> &'a File {
    match file {
        Some(file) => file,
        None => panic!("lock file {} has been closed", path.display()),
    }
}
