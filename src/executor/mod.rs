//! Command execution
//!
//! A worker waits for its turn on the [`TurnSequencer`], writes the audit
//! line for its command, runs the matching [`RecordStore`] operation and
//! reports the outcome on the status stream. An unrecognized command takes
//! its turn and does nothing else.

mod driver;
mod errors;
mod outcome;

pub use driver::{execute_all, ExecutionMode, RunReport};
pub use errors::{ExecError, ExecResult};
pub use outcome::{print_lines, Outcome};

use std::sync::Arc;

use crate::command::{Command, CommandKind};
use crate::observability::{self, AuditLog, StatusSink};
use crate::sequencer::TurnSequencer;
use crate::store::{jenkins_hash, truncate_name, Record, RecordStore};
use crate::worker::WorkerId;

/// Shared state every worker needs. One per run.
pub struct CommandExecutor {
    store: Arc<RecordStore>,
    sequencer: Arc<TurnSequencer>,
    audit: Arc<dyn AuditLog>,
    status: Arc<dyn StatusSink>,
}

impl CommandExecutor {
    pub fn new(
        store: Arc<RecordStore>,
        sequencer: Arc<TurnSequencer>,
        audit: Arc<dyn AuditLog>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            store,
            sequencer,
            audit,
            status,
        }
    }

    /// Build a fresh store and sequencer sharing `audit`.
    pub fn with_sinks(audit: Arc<dyn AuditLog>, status: Arc<dyn StatusSink>) -> Self {
        let store = Arc::new(RecordStore::new(Arc::clone(&audit)));
        Self::new(store, Arc::new(TurnSequencer::new()), audit, status)
    }

    /// Wait for `command`'s turn, then run it.
    pub fn run(&self, command: &Command) -> Outcome {
        self.sequencer.wait_turn(command.sequence);
        self.dispatch(command)
    }

    /// Run `command` immediately, without waiting for its turn.
    pub fn dispatch(&self, command: &Command) -> Outcome {
        let who = command.worker();
        if let Some(line) = audit_line(who, command) {
            observability::audit(&*self.audit, &line);
        }

        let name = command.name.as_str();
        let outcome = match command.kind {
            CommandKind::Insert => match self.store.insert(who, name, command.salary) {
                Ok(record) => Outcome::Inserted(record),
                Err(error) => Outcome::Failed {
                    kind: command.kind,
                    error,
                },
            },
            CommandKind::Delete => match self.store.delete(who, name) {
                Ok(record) => Outcome::Deleted(record),
                Err(error) => Outcome::Failed {
                    kind: command.kind,
                    error,
                },
            },
            CommandKind::Update => match self.store.update(who, name, command.salary) {
                Ok(previous) => Outcome::Updated {
                    previous,
                    salary: command.salary,
                },
                Err(error) => Outcome::Failed {
                    kind: command.kind,
                    error,
                },
            },
            CommandKind::Search => match self.store.search(who, name) {
                Some(record) => Outcome::Found(record),
                None => Outcome::Failed {
                    kind: command.kind,
                    error: crate::store::StoreError::NotFound {
                        hash: jenkins_hash(truncate_name(name)),
                    },
                },
            },
            CommandKind::Print => Outcome::Printed(self.print(who)),
            CommandKind::Unrecognized => Outcome::Skipped,
        };

        if let Some(line) = outcome.status_line(command) {
            self.status.emit(&line);
        }
        outcome
    }

    /// The driver's closing snapshot, printed as worker 0.
    pub fn print_final(&self) -> Vec<Record> {
        let who = WorkerId::DRIVER;
        observability::audit(&*self.audit, &format!("{} PRINT", who));
        self.print(who)
    }

    fn print(&self, who: WorkerId) -> Vec<Record> {
        self.store.print(who, |records| {
            self.status.emit_block(&print_lines(records));
            records.to_vec()
        })
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn sequencer(&self) -> &Arc<TurnSequencer> {
        &self.sequencer
    }

    pub fn audit_log(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }
}

/// `THREAD <n> <KIND>,<fields>` written before the store is touched.
fn audit_line(who: WorkerId, command: &Command) -> Option<String> {
    let name = truncate_name(&command.name);
    let hash = jenkins_hash(name);
    let line = match command.kind {
        CommandKind::Insert | CommandKind::Update => format!(
            "{} {},{},{},{}",
            who, command.kind, hash, name, command.salary
        ),
        CommandKind::Delete | CommandKind::Search => {
            format!("{} {},{},{}", who, command.kind, hash, name)
        }
        CommandKind::Print => format!("{} PRINT", who),
        CommandKind::Unrecognized => return None,
    };
    Some(line)
}
