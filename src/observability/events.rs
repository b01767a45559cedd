//! Observable lifecycle events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Driver startup begins
    RunStart,
    /// Configuration resolved
    ConfigLoaded,
    /// Command file parsed
    CommandsLoaded,
    /// A command file line was not turned into a command
    LineSkipped,
    /// The `threads,<n>` header disagrees with the parsed command count
    ThreadCountMismatch,
    /// All workers launched
    WorkersSpawned,
    /// All workers finished
    WorkersJoined,
    /// Final snapshot emitted, shutdown begins
    RunComplete,
    /// Audit log write failed (never fatal)
    AuditWriteFailed,
    /// Startup failed before any worker ran (FATAL)
    StartupFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RunStart => "RUN_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CommandsLoaded => "COMMANDS_LOADED",
            Event::LineSkipped => "LINE_SKIPPED",
            Event::ThreadCountMismatch => "THREAD_COUNT_MISMATCH",
            Event::WorkersSpawned => "WORKERS_SPAWNED",
            Event::WorkersJoined => "WORKERS_JOINED",
            Event::RunComplete => "RUN_COMPLETE",
            Event::AuditWriteFailed => "AUDIT_WRITE_FAILED",
            Event::StartupFailed => "STARTUP_FAILED",
        }
    }

    /// Whether this event terminates the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StartupFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
