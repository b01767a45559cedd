//! Append-only audit log
//!
//! - One line per lock transition and per command
//! - Each line is `<timestamp>: <message>`, timestamp in microseconds
//!   since the Unix epoch
//! - Timestamps never decrease within one log, even if the wall clock
//!   steps backwards
//! - Flushed after every line

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

/// A single timestamped audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    /// Message body, without the timestamp prefix.
    pub message: String,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp, self.message)
    }
}

/// Hands out wall-clock microsecond timestamps that never go backwards.
#[derive(Debug, Default)]
struct MonotonicMicros {
    last: i64,
}

impl MonotonicMicros {
    fn next(&mut self) -> i64 {
        let now = Utc::now().timestamp_micros();
        self.last = self.last.max(now);
        self.last
    }
}

/// Audit log sink.
///
/// Shared by every worker, so implementations serialize appends internally.
pub trait AuditLog: Send + Sync {
    /// Append one message. The entry is visible once this returns.
    fn append(&self, message: &str) -> io::Result<()>;
}

struct FileAuditInner {
    writer: BufWriter<File>,
    clock: MonotonicMicros,
}

/// File-backed audit log.
///
/// The file is truncated on open; each run starts a fresh log.
pub struct FileAuditLog {
    path: PathBuf,
    inner: Mutex<FileAuditInner>,
}

impl FileAuditLog {
    /// Create (or truncate) the audit log at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            inner: Mutex::new(FileAuditInner {
                writer: BufWriter::new(file),
                clock: MonotonicMicros::default(),
            }),
        })
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, message: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamp = inner.clock.next();
        writeln!(inner.writer, "{}: {}", timestamp, message)?;
        inner.writer.flush()
    }
}

impl fmt::Debug for FileAuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAuditLog").field("path", &self.path).finish()
    }
}

#[derive(Debug, Default)]
struct MemoryAuditInner {
    entries: Vec<AuditEntry>,
    clock: MonotonicMicros,
}

/// In-memory audit log for testing.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    inner: Mutex<MemoryAuditInner>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, in append order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Message bodies only, in append order.
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, message: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamp = inner.clock.next();
        inner.entries.push(AuditEntry {
            timestamp,
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Audit log that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn append(&self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}
