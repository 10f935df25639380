//! Helper binary that takes the exclusive lock and records its critical section
//!
//! Usage: lock_holder <lock_path> <marker_path> <process_id>
//!
//! Appends an `enter` line, holds the lock briefly, appends an `exit` line,
//! then unlocks. With working cross-process exclusion the marker file never
//! shows two `enter` lines without an `exit` in between.

use filemutex::FileMutex;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn append(marker_path: &Path, line: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(marker_path)
        .expect("Failed to open marker file");
    writeln!(file, "{}", line).expect("Failed to write marker");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: lock_holder <lock_path> <marker_path> <process_id>");
        std::process::exit(1);
    }

    let lock_path = PathBuf::from(&args[1]);
    let marker_path = PathBuf::from(&args[2]);
    let process_id = &args[3];

    let mutex = FileMutex::new(&lock_path).expect("Failed to open lock file");

    // Blocks until available
    let guard = mutex.lock();

    append(&marker_path, &format!("enter {}", process_id));
    std::thread::sleep(Duration::from_millis(50));
    append(&marker_path, &format!("exit {}", process_id));

    guard.unlock();
    println!("Process {} completed", process_id);
}
