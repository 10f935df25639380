//! Helper binary that takes a shared lock and waits for other readers
//!
//! Usage: shared_holder <lock_path> <rendezvous_dir> <process_id> <expected_readers>
//!
//! After acquiring the shared lock it creates `ready_<process_id>` in the
//! rendezvous directory, then keeps holding the lock until
//! `expected_readers` ready files exist. Exits with status 2 if they do not
//! all show up in time, which happens when shared holds exclude each other.

use filemutex::FileMutex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(10);

fn ready_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .expect("Failed to read rendezvous directory")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("ready_"))
        .count()
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!(
            "Usage: shared_holder <lock_path> <rendezvous_dir> <process_id> <expected_readers>"
        );
        std::process::exit(1);
    }

    let lock_path = PathBuf::from(&args[1]);
    let rendezvous_dir = PathBuf::from(&args[2]);
    let process_id = &args[3];
    let expected: usize = args[4].parse().expect("expected_readers must be a number");

    let mutex = FileMutex::new(&lock_path).expect("Failed to open lock file");
    let _guard = mutex.rlock();

    fs::write(rendezvous_dir.join(format!("ready_{}", process_id)), "")
        .expect("Failed to write ready marker");

    let start = Instant::now();
    while ready_count(&rendezvous_dir) < expected {
        if start.elapsed() >= RENDEZVOUS_TIMEOUT {
            eprintln!("Process {} gave up waiting for other readers", process_id);
            std::process::exit(2);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("Process {} completed", process_id);
}
