//! Observability subsystem
//!
//! - Structured diagnostic logging (JSON, stderr)
//! - Append-only timestamped audit log
//! - Human-readable status stream
//! - Lock occupancy metrics
//!
//! Observability never changes execution: a failed audit write is logged
//! and the operation carries on.

pub mod audit;
mod events;
mod logger;
mod metrics;
pub mod status;

pub use audit::{AuditEntry, AuditLog, FileAuditLog, MemoryAuditLog, NullAuditLog};
pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{LockMetrics, LockMetricsSnapshot};
pub use status::{MemoryStatus, StatusSink, StdoutStatus};

/// Append `message` to the audit log, reporting (not propagating) failure.
pub fn audit(log: &dyn AuditLog, message: &str) {
    if let Err(e) = log.append(message) {
        let err = e.to_string();
        log_event_with_fields(
            Event::AuditWriteFailed,
            &[("error", err.as_str()), ("message", message)],
        );
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = match event {
        e if e.is_fatal() => Severity::Fatal,
        Event::AuditWriteFailed => Severity::Error,
        Event::LineSkipped | Event::ThreadCountMismatch => Severity::Warn,
        _ => Severity::Info,
    };
    Logger::log(severity, event.as_str(), fields);
}
