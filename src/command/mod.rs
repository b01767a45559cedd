//! Commands and the command file
//!
//! A command file is line oriented: `COMMAND,NAME[,SALARY][,ignored...]`.
//! Every command line becomes a [`Command`] numbered `1..N` in file order;
//! that number is the worker's turn and its id in audit output. A line with
//! an unknown command word still gets a number and a worker.

mod errors;
mod parser;

pub use errors::{CommandError, CommandResult};
pub use parser::{load_commands, parse_commands, CommandFile, SkipReason, SkippedLine};

use std::fmt;
use std::str::FromStr;

use crate::worker::WorkerId;

/// The five store operations, plus the placeholder for a line whose command
/// word is none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Insert,
    Delete,
    Update,
    Search,
    Print,
    /// Holds its turn and touches nothing.
    Unrecognized,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Insert => "INSERT",
            CommandKind::Delete => "DELETE",
            CommandKind::Update => "UPDATE",
            CommandKind::Search => "SEARCH",
            CommandKind::Print => "PRINT",
            CommandKind::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = String;

    /// Case-insensitive. Only the five operation words parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Ok(CommandKind::Insert),
            "DELETE" => Ok(CommandKind::Delete),
            "UPDATE" => Ok(CommandKind::Update),
            "SEARCH" => Ok(CommandKind::Search),
            "PRINT" => Ok(CommandKind::Print),
            _ => Err(s.trim().to_string()),
        }
    }
}

/// One queued command. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub name: String,
    /// Zero for kinds that take no salary.
    pub salary: u32,
    /// Turn number, `1..=N`.
    pub sequence: u32,
}

impl Command {
    pub fn new(kind: CommandKind, name: impl Into<String>, salary: u32, sequence: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            salary,
            sequence,
        }
    }

    /// Worker that runs this command.
    pub fn worker(&self) -> WorkerId {
        WorkerId::new(self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!("insert".parse::<CommandKind>(), Ok(CommandKind::Insert));
        assert_eq!("Delete".parse::<CommandKind>(), Ok(CommandKind::Delete));
        assert_eq!(" PRINT ".parse::<CommandKind>(), Ok(CommandKind::Print));
        assert_eq!("upsert".parse::<CommandKind>(), Err("upsert".to_string()));
    }

    #[test]
    fn test_placeholder_word_does_not_parse() {
        assert!("unrecognized".parse::<CommandKind>().is_err());
        assert_eq!(CommandKind::Unrecognized.to_string(), "UNRECOGNIZED");
    }

    #[test]
    fn test_worker_id_is_sequence() {
        let cmd = Command::new(CommandKind::Search, "Bob", 0, 4);
        assert_eq!(cmd.worker(), WorkerId::new(4));
    }
}
