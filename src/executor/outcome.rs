//! Command outcomes and their status lines

use crate::command::{Command, CommandKind};
use crate::store::{Record, StoreError};

/// What one command did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted(Record),
    Deleted(Record),
    /// Record as it was before, and the salary it now has.
    Updated { previous: Record, salary: u32 },
    Found(Record),
    /// Sorted snapshot that was printed.
    Printed(Vec<Record>),
    /// Unrecognized command: turn taken, store untouched.
    Skipped,
    Failed { kind: CommandKind, error: StoreError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }

    /// The operation this outcome belongs to.
    pub fn kind(&self) -> CommandKind {
        match self {
            Outcome::Inserted(_) => CommandKind::Insert,
            Outcome::Deleted(_) => CommandKind::Delete,
            Outcome::Updated { .. } => CommandKind::Update,
            Outcome::Found(_) => CommandKind::Search,
            Outcome::Printed(_) => CommandKind::Print,
            Outcome::Skipped => CommandKind::Unrecognized,
            Outcome::Failed { kind, .. } => *kind,
        }
    }

    /// The status line for a non-PRINT outcome. PRINT emits its block from
    /// inside the store's read lock instead, see [`print_lines`].
    pub fn status_line(&self, command: &Command) -> Option<String> {
        let line = match self {
            Outcome::Inserted(r) => format!("Inserted {}", r),
            Outcome::Deleted(r) => format!("Deleted record for {}", r),
            Outcome::Updated { previous, salary } => format!(
                "Updated record {h} from {h},{n},{old} to {h},{n},{new}",
                h = previous.hash,
                n = command.name,
                old = previous.salary,
                new = salary,
            ),
            Outcome::Found(r) => format!("Found: {}", r),
            Outcome::Printed(_) | Outcome::Skipped => return None,
            Outcome::Failed { kind, error } => failure_line(*kind, error, command),
        };
        Some(line)
    }
}

fn failure_line(kind: CommandKind, error: &StoreError, command: &Command) -> String {
    match (kind, error) {
        (_, StoreError::DuplicateKey { hash }) => {
            format!("Insert failed. Entry {} is a duplicate.", hash)
        }
        (_, StoreError::AllocationFailure { hash }) => {
            format!("Insert failed. Entry {} could not be allocated.", hash)
        }
        (CommandKind::Delete, StoreError::NotFound { hash }) => {
            format!("Entry {} not deleted. Not in database.", hash)
        }
        (CommandKind::Search, StoreError::NotFound { .. }) => {
            format!("{} not found.", command.name)
        }
        (_, StoreError::NotFound { hash }) => {
            format!("Update failed. Entry {} not found.", hash)
        }
    }
}

/// `Current Database:` followed by one line per record, or `(empty)`.
pub fn print_lines(records: &[Record]) -> Vec<String> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push("Current Database:".to_string());
    if records.is_empty() {
        lines.push("(empty)".to_string());
    }
    lines.extend(records.iter().map(Record::to_string));
    lines
}
