//! chash - a concurrent in-memory record store keyed by name hash
//!
//! Workers are spawned one per queued command. Each waits on the
//! [`sequencer::TurnSequencer`] for its turn, then runs exactly one
//! [`store::RecordStore`] operation under the semaphore-based
//! [`rwlock::ReaderWriterLock`].

pub mod cli;
pub mod command;
pub mod executor;
pub mod observability;
pub mod rwlock;
pub mod sequencer;
pub mod store;
pub mod worker;
