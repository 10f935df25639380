//! Construction options for [`FileMutex`](crate::FileMutex)

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use crate::error::{FileMutexError, Result};

/// Permission bits for a newly created lock file: owner and group may read
/// and write, nobody may execute, the world has no access.
pub const DEFAULT_MODE: u32 = 0o660;

/// Options controlling how the lock file is opened
///
/// All fields fall back to their defaults when deserialized, so the struct
/// can be embedded in a host application's config file:
///
/// ```
/// use filemutex::FileMutexOptions;
///
/// let options: FileMutexOptions = serde_json::from_str(r#"{ "mode": 384 }"#).unwrap();
/// assert_eq!(options.mode, 0o600);
/// assert!(!options.create_parent_dirs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMutexOptions {
    /// Unix permission bits used when the lock file is created (before umask).
    /// Ignored on other platforms.
    pub mode: u32,
    /// Create missing parent directories instead of failing
    pub create_parent_dirs: bool,
}

impl Default for FileMutexOptions {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE,
            create_parent_dirs: false,
        }
    }
}

impl FileMutexOptions {
    /// Same as [`FileMutexOptions::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permission bits for a newly created lock file
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Creates missing parent directories when `create` is true
    pub fn create_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }

    /// Opens (creating if absent) the lock file without truncating it
    pub(crate) fn open(&self, path: &Path) -> Result<File> {
        if self.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| FileMutexError::io(e, path, "create parent directories"))?;
            }
        }

        // `create` requires write access; the contents are never touched
        let mut open = OpenOptions::new();
        open.read(true).write(true).create(true).truncate(false);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            open.mode(self.mode);
        }

        open.open(path).map_err(|e| FileMutexError::io(e, path, "open lock file"))
    }
}
