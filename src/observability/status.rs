//! Human-readable status stream
//!
//! One line per operation outcome. Lines from different workers never
//! interleave mid-line.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Destination for status lines.
pub trait StatusSink: Send + Sync {
    /// Emit one line (without trailing newline).
    fn emit(&self, line: &str);

    /// Emit several lines as one uninterrupted block.
    fn emit_block(&self, lines: &[String]) {
        for line in lines {
            self.emit(line);
        }
    }
}

/// Writes status lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutStatus;

impl StatusSink for StdoutStatus {
    fn emit(&self, line: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }

    fn emit_block(&self, lines: &[String]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
        let _ = out.flush();
    }
}

/// Collects status lines in memory for testing.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    lines: Mutex<Vec<String>>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusSink for MemoryStatus {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }

    fn emit_block(&self, lines: &[String]) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(lines.iter().cloned());
    }
}
