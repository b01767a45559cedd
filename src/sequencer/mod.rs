//! Turn sequencer
//!
//! Workers start in whatever order the OS schedules them. The sequencer
//! turns that into admission in turn order: `wait_turn(k)` returns only
//! after turns `1..k` have been granted.
//!
//! Admission is not completion. Turn `k + 1` is released the moment turn `k`
//! is granted, before worker `k` runs its command, so two admitted workers
//! can be inside their command bodies at once. Mutual exclusion over the
//! store comes from the store's lock alone.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Instant;

/// One granted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub turn: u32,
    pub at: Instant,
}

#[derive(Debug)]
struct SequencerInner {
    /// Never decremented or reset.
    next_turn: u32,
    admissions: Vec<Admission>,
}

/// Monitor admitting workers strictly in turn order.
#[derive(Debug)]
pub struct TurnSequencer {
    inner: Mutex<SequencerInner>,
    turn_changed: Condvar,
}

impl Default for TurnSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnSequencer {
    /// Sequencer whose first turn is 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SequencerInner {
                next_turn: 1,
                admissions: Vec::new(),
            }),
            turn_changed: Condvar::new(),
        }
    }

    /// Block until it is `turn`'s turn, then pass the turn on.
    ///
    /// Every waiter is woken on each grant and re-checks its own turn; a
    /// wake-up says nothing about whose turn it is. Turn 0, or a turn that
    /// was already granted, never arrives.
    pub fn wait_turn(&self, turn: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        while inner.next_turn != turn {
            inner = self
                .turn_changed
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }

        inner.next_turn = turn + 1;
        inner.admissions.push(Admission {
            turn,
            at: Instant::now(),
        });
        self.turn_changed.notify_all();
    }

    /// The turn that will be granted next.
    pub fn next_turn(&self) -> u32 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_turn
    }

    /// Every grant so far, in grant order.
    pub fn admissions(&self) -> Vec<Admission> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admissions
            .clone()
    }
}
