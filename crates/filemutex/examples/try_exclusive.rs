//! Helper binary making a single non-blocking exclusive attempt
//!
//! Usage: try_exclusive <lock_path>
//!
//! Exits with status 0 if the lock was free, 3 if another holder has it.

use filemutex::FileMutex;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: try_exclusive <lock_path>");
        std::process::exit(1);
    }

    let mutex = FileMutex::new(&args[1]).expect("Failed to open lock file");
    let acquired = mutex.try_lock().is_some();
    if !acquired {
        println!("busy");
        std::process::exit(3);
    }
    println!("acquired");
}
