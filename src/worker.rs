//! Worker identity
//!
//! A worker is named by the sequence number of the command it runs. Id 0 is
//! reserved for the driver thread (the final snapshot).

use std::fmt;

/// Identifies who holds a lock or runs a command in audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(u32);

impl WorkerId {
    /// The driver thread.
    pub const DRIVER: WorkerId = WorkerId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "THREAD {}", self.0)
    }
}
