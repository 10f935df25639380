//! Process-level file mutex tests
//!
//! These tests verify that the mutex works across process boundaries, not
//! just between threads. Helper binaries from `examples/` are spawned as
//! the competing processes.

use filemutex::FileMutex;
use filemutex_testkit::{example_bin, temp_dir_in_workspace};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn run_in_parallel(commands: Vec<Command>) {
    let handles: Vec<_> = commands
        .into_iter()
        .map(|mut command| {
            thread::spawn(move || {
                let status = command.status().expect("Failed to execute helper");
                assert!(status.success(), "{:?} should exit successfully", command);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Verifies that the exclusive lock prevents lost updates across processes.
///
/// Spawns 5 processes that each perform 20 read-modify-write operations on
/// a shared counter, each one under the lock. All 100 updates must survive.
#[test]
fn test_counter_with_lock_no_lost_updates() {
    let temp = TempDir::new().unwrap();
    let counter_path = temp.path().join("counter.txt");
    fs::write(&counter_path, "0").unwrap();

    const NUM_PROCESSES: usize = 5;
    const ITERATIONS_PER_PROCESS: usize = 20;

    let commands = (0..NUM_PROCESSES)
        .map(|_| {
            let mut command = Command::new(example_bin("counter_child_locked"));
            command
                .arg(&counter_path)
                .arg(ITERATIONS_PER_PROCESS.to_string());
            command
        })
        .collect();
    run_in_parallel(commands);

    let final_count: u32 = fs::read_to_string(&counter_path)
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    let expected = (NUM_PROCESSES * ITERATIONS_PER_PROCESS) as u32;
    assert_eq!(
        final_count, expected,
        "With locks, should have no lost updates: got {}, expected {}",
        final_count, expected
    );
}

#[test]
fn test_cross_process_exclusive_locking() {
    let temp = temp_dir_in_workspace();
    let lock_path = temp.path().join("test.lock");
    let marker_path = temp.path().join("marker.txt");

    const NUM_PROCESSES: usize = 3;

    let commands = (0..NUM_PROCESSES)
        .map(|id| {
            let mut command = Command::new(example_bin("lock_holder"));
            command.arg(&lock_path).arg(&marker_path).arg(id.to_string());
            command
        })
        .collect();
    run_in_parallel(commands);

    // Critical sections never overlap: every enter is directly followed by
    // the exit of the same process
    let content = fs::read_to_string(&marker_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), NUM_PROCESSES * 2, "Marker file: {}", content);

    for pair in lines.chunks(2) {
        let entered = pair[0].strip_prefix("enter ").expect("Expected enter line");
        let exited = pair[1].strip_prefix("exit ").expect("Expected exit line");
        assert_eq!(entered, exited, "Interleaved critical sections: {}", content);
    }
    for id in 0..NUM_PROCESSES {
        assert!(content.contains(&format!("enter {}", id)));
    }
}

#[test]
fn test_exclusive_holder_blocks_shared_process() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("rw.lock");
    let rendezvous = temp.path().join("rendezvous");
    fs::create_dir(&rendezvous).unwrap();

    let mutex = FileMutex::new(&lock_path).unwrap();
    let guard = mutex.lock();

    let mut reader = Command::new(example_bin("shared_holder"))
        .arg(&lock_path)
        .arg(&rendezvous)
        .arg("0")
        .arg("1")
        .stdout(Stdio::null())
        .spawn()
        .expect("Failed to spawn shared_holder");

    thread::sleep(Duration::from_millis(300));
    assert!(
        !rendezvous.join("ready_0").exists(),
        "Reader process must block while the exclusive lock is held"
    );

    guard.unlock();

    let status = reader.wait().unwrap();
    assert!(status.success());
    assert!(rendezvous.join("ready_0").exists());
}

#[test]
fn test_shared_holders_across_processes_overlap() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("shared.lock");
    let rendezvous = temp.path().join("rendezvous");
    fs::create_dir(&rendezvous).unwrap();

    const NUM_PROCESSES: usize = 3;

    // Each reader holds its shared lock until all readers hold theirs
    let commands = (0..NUM_PROCESSES)
        .map(|id| {
            let mut command = Command::new(example_bin("shared_holder"));
            command
                .arg(&lock_path)
                .arg(&rendezvous)
                .arg(id.to_string())
                .arg(NUM_PROCESSES.to_string());
            command
        })
        .collect();
    run_in_parallel(commands);
}

fn try_exclusive(lock_path: &Path) -> i32 {
    Command::new(example_bin("try_exclusive"))
        .arg(lock_path)
        .stdout(Stdio::null())
        .status()
        .expect("Failed to execute try_exclusive")
        .code()
        .expect("try_exclusive should exit normally")
}

#[test]
fn test_try_lock_sees_holds_of_other_processes() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("try.lock");

    let mutex = FileMutex::new(&lock_path).unwrap();
    assert_eq!(try_exclusive(&lock_path), 0, "Lock should be free");

    let write_guard = mutex.lock();
    assert_eq!(try_exclusive(&lock_path), 3, "Exclusive hold should be visible");
    drop(write_guard);

    let read_guard = mutex.rlock();
    assert_eq!(try_exclusive(&lock_path), 3, "Shared hold should be visible");
    drop(read_guard);

    assert_eq!(try_exclusive(&lock_path), 0, "Lock should be free again");
}

#[test]
fn test_close_cycles_across_processes() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("cycle.lock");
    let marker_path = temp.path().join("marker.txt");

    const NUM_PROCESSES: usize = 3;
    const CYCLES: usize = 5;

    let commands = (0..NUM_PROCESSES)
        .map(|id| {
            let mut command = Command::new(example_bin("close_cycle"));
            command
                .arg(&lock_path)
                .arg(&marker_path)
                .arg(id.to_string())
                .arg(CYCLES.to_string());
            command
        })
        .collect();
    run_in_parallel(commands);

    let content = fs::read_to_string(&marker_path).unwrap();
    assert_eq!(content.lines().count(), NUM_PROCESSES * CYCLES);
    assert!(!lock_path.exists(), "Last close should remove the lock file");

    // A fresh mutex works normally on the same path
    let mutex = FileMutex::new(&lock_path).unwrap();
    mutex.lock().unlock();
    assert!(lock_path.exists());
}
