//! Launching workers for a batch of commands
//!
//! Two modes, same admission contract:
//!
//! - [`ExecutionMode::ThreadPerCommand`]: every command gets its own thread,
//!   all started together.
//! - [`ExecutionMode::Pool`]: a fixed number of threads take commands off a
//!   queue in sequence order. The lowest turn not yet granted always belongs
//!   to a thread that will wait for it, so the pool cannot stall.
//!
//! Either way every spawned thread is joined before returning.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ScopedJoinHandle};

use super::errors::{ExecError, ExecResult};
use super::{CommandExecutor, Outcome};
use crate::command::{Command, CommandKind};
use crate::observability::{log_event_with_fields, Event};

/// How workers are provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    ThreadPerCommand,
    /// At most this many threads.
    Pool(usize),
}

/// Outcomes of a run, ordered by sequence number.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    outcomes: Vec<(Command, Outcome)>,
}

impl RunReport {
    fn new(mut outcomes: Vec<(Command, Outcome)>) -> Self {
        outcomes.sort_by_key(|(command, _)| command.sequence);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(Command, Outcome)] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the command with `sequence`.
    pub fn outcome(&self, sequence: u32) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(command, _)| command.sequence == sequence)
            .map(|(_, outcome)| outcome)
    }

    /// Successful commands of `kind`.
    pub fn successes(&self, kind: CommandKind) -> usize {
        self.count(kind, true)
    }

    /// Failed commands of `kind`.
    pub fn failures(&self, kind: CommandKind) -> usize {
        self.count(kind, false)
    }

    fn count(&self, kind: CommandKind, success: bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.kind() == kind && o.is_success() == success)
            .count()
    }
}

/// Run every command on its own worker and join them all.
///
/// Sequence numbers must be contiguous from the sequencer's next turn;
/// anything else would leave a worker waiting forever, so it is rejected
/// before a thread starts.
pub fn execute_all(
    executor: &CommandExecutor,
    commands: Vec<Command>,
    mode: ExecutionMode,
) -> ExecResult<RunReport> {
    check_sequences(executor, &commands)?;

    let outcomes = match mode {
        ExecutionMode::ThreadPerCommand => thread_per_command(executor, &commands)?,
        ExecutionMode::Pool(0) => return Err(ExecError::EmptyPool),
        ExecutionMode::Pool(size) => pool(executor, commands, size)?,
    };

    Ok(RunReport::new(outcomes))
}

fn check_sequences(executor: &CommandExecutor, commands: &[Command]) -> ExecResult<()> {
    let mut sequences: Vec<u32> = commands.iter().map(|c| c.sequence).collect();
    sequences.sort_unstable();

    let first = executor.sequencer().next_turn();
    for (offset, &found) in sequences.iter().enumerate() {
        let expected = first + offset as u32;
        if found != expected {
            return Err(ExecError::OutOfSequence { expected, found });
        }
    }
    Ok(())
}

fn thread_per_command(
    executor: &CommandExecutor,
    commands: &[Command],
) -> ExecResult<Vec<(Command, Outcome)>> {
    thread::scope(|scope| {
        let mut handles: Vec<(&Command, ScopedJoinHandle<'_, Outcome>)> =
            Vec::with_capacity(commands.len());
        let mut spawn_error = None;

        for command in commands {
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", command.sequence))
                .spawn_scoped(scope, move || executor.run(command));
            match spawned {
                Ok(handle) => handles.push((command, handle)),
                Err(source) => {
                    // Lower turns are already running and will finish;
                    // nothing above this one was started.
                    spawn_error = Some(ExecError::Spawn {
                        worker: command.worker().to_string(),
                        source,
                    });
                    break;
                }
            }
        }

        let spawned = handles.len().to_string();
        log_event_with_fields(Event::WorkersSpawned, &[("workers", spawned.as_str())]);

        let outcomes = join_all(handles);
        log_event_with_fields(Event::WorkersJoined, &[("workers", spawned.as_str())]);

        match spawn_error {
            Some(err) => Err(err),
            None => outcomes,
        }
    })
}

fn join_all(
    handles: Vec<(&Command, ScopedJoinHandle<'_, Outcome>)>,
) -> ExecResult<Vec<(Command, Outcome)>> {
    let mut outcomes = Vec::with_capacity(handles.len());
    let mut panicked = None;

    for (command, handle) in handles {
        match handle.join() {
            Ok(outcome) => outcomes.push((command.clone(), outcome)),
            Err(_) => {
                panicked.get_or_insert(ExecError::WorkerPanicked {
                    worker: command.worker().to_string(),
                });
            }
        }
    }

    match panicked {
        Some(err) => Err(err),
        None => Ok(outcomes),
    }
}

fn pool(
    executor: &CommandExecutor,
    mut commands: Vec<Command>,
    size: usize,
) -> ExecResult<Vec<(Command, Outcome)>> {
    commands.sort_by_key(|c| c.sequence);
    let size = size.min(commands.len()).max(1);

    let queue: Mutex<VecDeque<Command>> = Mutex::new(commands.into());
    let results: Mutex<Vec<(Command, Outcome)>> = Mutex::new(Vec::new());

    let joined = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(size);
        let mut spawn_error = None;

        for index in 0..size {
            let queue = &queue;
            let results = &results;
            let spawned = thread::Builder::new()
                .name(format!("pool-{}", index))
                .spawn_scoped(scope, move || loop {
                    // Taken in sequence order under the queue lock.
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some(command) = next else { break };
                    let outcome = executor.run(&command);
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((command, outcome));
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    spawn_error = Some(ExecError::Spawn {
                        worker: format!("pool-{}", index),
                        source,
                    });
                    break;
                }
            }
        }

        let spawned = handles.len().to_string();
        log_event_with_fields(Event::WorkersSpawned, &[("workers", spawned.as_str())]);

        let mut panicked = None;
        for (index, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                panicked.get_or_insert(ExecError::WorkerPanicked {
                    worker: format!("pool-{}", index),
                });
            }
        }
        log_event_with_fields(Event::WorkersJoined, &[("workers", spawned.as_str())]);

        match (spawn_error, panicked) {
            (Some(err), _) | (None, Some(err)) => Err(err),
            (None, None) => Ok(()),
        }
    });

    // With no pool thread alive the queue is never drained; that only
    // happens when the very first spawn failed.
    joined?;
    Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner))
}
