//! Concurrency Invariant Tests
//!
//! Tests for invariants:
//! - Readers share the lock and never block each other
//! - A writer is never inside the region with anyone else
//! - Turns are granted strictly in sequence order
//! - Both execution modes leave the store consistent
//!
//! Exclusion is checked through the lock's own occupancy counters.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::thread_rng;

use chash::command::{Command, CommandKind};
use chash::executor::{execute_all, CommandExecutor, ExecutionMode};
use chash::observability::{MemoryAuditLog, MemoryStatus, NullAuditLog};
use chash::rwlock::ReaderWriterLock;
use chash::sequencer::TurnSequencer;
use chash::store::RecordStore;
use chash::worker::WorkerId;

// =============================================================================
// Reader / Writer Exclusion Tests
// =============================================================================

/// N readers can all be inside the region at the same time.
#[test]
fn test_readers_overlap() {
    const READERS: usize = 6;
    let lock = ReaderWriterLock::new(0u32, Arc::new(NullAuditLog));
    let inside = Barrier::new(READERS);

    thread::scope(|s| {
        for i in 0..READERS {
            let lock = &lock;
            let inside = &inside;
            s.spawn(move || {
                let guard = lock.read(WorkerId::new(i as u32 + 1));
                // Every reader must reach this point while holding the lock.
                inside.wait();
                assert_eq!(*guard, 0);
            });
        }
    });

    let snap = lock.metrics().snapshot();
    assert_eq!(snap.read_acquisitions, READERS as u64);
    assert_eq!(snap.peak_readers, READERS as u64);
    assert_eq!(snap.overlaps, 0);
}

/// Mixed readers and writers never share the region with a writer.
#[test]
fn test_writers_exclusive_under_contention() {
    const THREADS: u32 = 8;
    const ROUNDS: u32 = 150;
    let lock = ReaderWriterLock::new(Vec::<u32>::new(), Arc::new(NullAuditLog));

    thread::scope(|s| {
        for t in 0..THREADS {
            let lock = &lock;
            s.spawn(move || {
                let who = WorkerId::new(t + 1);
                for round in 0..ROUNDS {
                    if (t + round) % 3 == 0 {
                        let mut guard = lock.write(who);
                        assert_eq!(lock.metrics().active_writers(), 1);
                        assert_eq!(lock.metrics().active_readers(), 0);
                        guard.push(t);
                    } else {
                        let guard = lock.read(who);
                        assert_eq!(lock.metrics().active_writers(), 0);
                        let _ = guard.len();
                    }
                }
            });
        }
    });

    let snap = lock.metrics().snapshot();
    assert_eq!(snap.overlaps, 0);
    assert_eq!(snap.acquisitions(), (THREADS * ROUNDS) as u64);
    assert_eq!(snap.acquisitions(), snap.releases());
    assert_eq!(lock.reader_count(), 0);
    assert_eq!(lock.into_inner().len() as u64, snap.write_acquisitions);
}

/// A writer waits while a reader holds the lock.
#[test]
fn test_writer_waits_for_reader() {
    let lock = ReaderWriterLock::new(String::new(), Arc::new(NullAuditLog));
    let held = Barrier::new(2);

    thread::scope(|s| {
        let reader = s.spawn(|| {
            let guard = lock.read(WorkerId::new(1));
            held.wait();
            thread::sleep(Duration::from_millis(50));
            // Writer cannot have run yet.
            assert!(guard.is_empty());
        });

        held.wait();
        lock.write(WorkerId::new(2)).push_str("written");
        reader.join().unwrap();
    });

    assert_eq!(lock.into_inner(), "written");
}

/// Every acquisition in the audit log is matched by a release.
#[test]
fn test_audit_transitions_balanced() {
    let audit = Arc::new(MemoryAuditLog::new());
    let store = RecordStore::new(audit.clone());

    thread::scope(|s| {
        for i in 1..=10u32 {
            let store = &store;
            s.spawn(move || {
                let who = WorkerId::new(i);
                let _ = store.insert(who, &format!("w{}", i % 4), i);
                let _ = store.search(who, "w1");
            });
        }
    });

    let messages = audit.messages();
    let count = |suffix: &str| messages.iter().filter(|m| m.ends_with(suffix)).count();
    assert_eq!(count("READ LOCK ACQUIRED"), count("READ LOCK RELEASED"));
    assert_eq!(count("WRITE LOCK ACQUIRED"), count("WRITE LOCK RELEASED"));
    assert_eq!(count("WRITE LOCK ACQUIRED"), 10);
    assert_eq!(store.len(WorkerId::DRIVER), 4);
}

// =============================================================================
// Turn Ordering Tests
// =============================================================================

/// Workers started in random order are admitted in sequence order.
#[test]
fn test_turns_granted_in_order() {
    const WORKERS: u32 = 48;
    let sequencer = TurnSequencer::new();
    let mut order: Vec<u32> = (1..=WORKERS).collect();
    order.shuffle(&mut thread_rng());

    thread::scope(|s| {
        for turn in order {
            let sequencer = &sequencer;
            s.spawn(move || sequencer.wait_turn(turn));
        }
    });

    let admissions = sequencer.admissions();
    let turns: Vec<u32> = admissions.iter().map(|a| a.turn).collect();
    assert_eq!(turns, (1..=WORKERS).collect::<Vec<_>>());
    assert!(admissions.windows(2).all(|w| w[0].at <= w[1].at));
    assert_eq!(sequencer.next_turn(), WORKERS + 1);
}

// =============================================================================
// Execution Mode Tests
// =============================================================================

fn mixed_commands(n: u32) -> Vec<Command> {
    (1..=n)
        .map(|i| {
            let kind = match i % 5 {
                0 => CommandKind::Print,
                1 | 2 => CommandKind::Insert,
                3 => CommandKind::Search,
                _ => CommandKind::Update,
            };
            Command::new(kind, format!("emp{}", i % 7), i, i)
        })
        .collect()
}

/// Thread-per-command and pool modes admit every command exactly once.
#[test]
fn test_modes_admit_every_command() {
    for mode in [ExecutionMode::ThreadPerCommand, ExecutionMode::Pool(4)] {
        let exec = CommandExecutor::with_sinks(Arc::new(NullAuditLog), Arc::new(MemoryStatus::new()));
        let report = execute_all(&exec, mixed_commands(60), mode).unwrap();

        assert_eq!(report.len(), 60);
        let turns: Vec<u32> = exec.sequencer().admissions().iter().map(|a| a.turn).collect();
        assert_eq!(turns, (1..=60).collect::<Vec<_>>(), "mode {:?}", mode);

        let metrics = exec.store().lock_metrics().snapshot();
        assert_eq!(metrics.overlaps, 0);
        assert_eq!(metrics.acquisitions(), metrics.releases());
        assert!(exec.store().len(WorkerId::DRIVER) <= 7);
    }
}
