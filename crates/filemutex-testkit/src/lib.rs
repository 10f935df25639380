//! Test utilities for filemutex
//!
//! Helpers shared by the cross-process tests: locating the helper binaries
//! built from `examples/` and creating scratch directories.

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the current directory
///
/// Cargo runs tests from the crate root, so scratch files stay next to the
/// crate and are easy to inspect when a cross-process test fails.
///
/// # Panics
///
/// Panics if `.tmp/` or the temporary subdirectory cannot be created.
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let tmp_base = std::env::current_dir()?.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Get the path to a compiled example binary
///
/// Example binaries are built by `cargo test` into `target/<profile>/examples/`,
/// next to the `deps/` directory holding the test binary.
///
/// # Panics
///
/// Panics if unable to determine the current executable path
///
/// # Examples
///
/// ```no_run
/// use filemutex_testkit::example_bin;
/// use std::process::Command;
///
/// let status = Command::new(example_bin("lock_holder"))
///     .args(["app.lock", "marker.txt", "0"])
///     .status()
///     .unwrap();
/// assert!(status.success());
/// ```
pub fn example_bin(name: &str) -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current executable path");

    // Navigate from target/debug/deps/test_binary to target/debug/examples/
    path.pop(); // Remove test binary name
    path.pop(); // Remove "deps"
    path.push("examples");
    path.push(name);

    if cfg!(target_os = "windows") {
        path.set_extension("exe");
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_creates_in_tmp() {
        let temp = temp_dir_in_workspace();
        let path = temp.path();

        assert!(
            path.to_string_lossy().contains(".tmp"),
            "Path should contain .tmp, got: {}",
            path.display()
        );
        assert!(path.is_dir(), "Path should be a directory");
    }

    #[test]
    fn test_temp_dir_auto_cleanup() {
        let path = {
            let temp = temp_dir_in_workspace();
            temp.path().to_path_buf()
        };

        assert!(
            !path.exists(),
            "Directory should not exist after drop: {}",
            path.display()
        );
    }

    #[test]
    fn test_example_bin_returns_correct_path() {
        let path = example_bin("test_example");

        assert!(
            path.to_string_lossy().contains("examples"),
            "Path should contain 'examples' directory"
        );

        let file_name = path.file_name().unwrap().to_string_lossy();
        assert!(file_name.starts_with("test_example"));

        #[cfg(not(target_os = "windows"))]
        assert!(!file_name.ends_with(".exe"));
    }
}
