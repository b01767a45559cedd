//! Execution errors
//!
//! Store failures are outcomes, not errors. These cover the workers
//! themselves.

use std::io;

use thiserror::Error;

/// Result type for running a batch of commands
pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: String,
        #[source]
        source: io::Error,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: String },

    #[error("pool size must be greater than zero")]
    EmptyPool,

    #[error("commands out of sequence: expected turn {expected}, found {found}")]
    OutOfSequence { expected: u32, found: u32 },
}

impl ExecError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecError::Spawn { .. } => "CHASH_EXEC_SPAWN_FAILED",
            ExecError::WorkerPanicked { .. } => "CHASH_EXEC_WORKER_PANICKED",
            ExecError::EmptyPool => "CHASH_EXEC_EMPTY_POOL",
            ExecError::OutOfSequence { .. } => "CHASH_EXEC_OUT_OF_SEQUENCE",
        }
    }
}
