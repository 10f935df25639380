//! Helper binary for the single-use lifecycle
//!
//! Usage: close_cycle <lock_path> <marker_path> <process_id> <cycles>
//!
//! Each cycle opens a new mutex, locks it, appends a marker line, and closes
//! it, which removes the lock file.

use filemutex::FileMutex;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: close_cycle <lock_path> <marker_path> <process_id> <cycles>");
        std::process::exit(1);
    }

    let lock_path = PathBuf::from(&args[1]);
    let marker_path = PathBuf::from(&args[2]);
    let process_id = &args[3];
    let cycles: usize = args[4].parse().expect("cycles must be a number");

    for cycle in 0..cycles {
        // A closed mutex is never reused
        let mutex = FileMutex::new(&lock_path).expect("Failed to open lock file");
        let guard = mutex.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker_path)
            .expect("Failed to open marker file");
        writeln!(file, "process_{} cycle {}", process_id, cycle).expect("Failed to write marker");

        guard.close().expect("Failed to close lock file");
    }

    println!("Process {} completed", process_id);
}
