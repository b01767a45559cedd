//! Command file parsing
//!
//! - Blank lines are ignored
//! - Lines starting with the reserved keyword (`threads` by default) are
//!   configuration, not commands; `threads,<n>` records the declared count
//! - Unknown command words still take the next turn, as a command that
//!   does nothing, and are reported in [`CommandFile::skipped`]
//! - NAME is kept verbatim apart from the line terminator, then cut to
//!   49 bytes
//! - SALARY defaults to 0 when absent or not an unsigned integer

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::errors::{CommandError, CommandResult};
use super::{Command, CommandKind};
use crate::store::truncate_name;

/// Why a command line will not run an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownCommand(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownCommand(word) => write!(f, "unknown command {:?}", word),
        }
    }
}

/// A command line whose operation will not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source.
    pub line_number: usize,
    /// Turn held by the placeholder command.
    pub sequence: u32,
    pub reason: SkipReason,
}

/// Everything read from a command source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandFile {
    /// Count from a `threads,<n>` line, if one was present.
    pub declared_threads: Option<usize>,
    /// One command per command line, sequence numbers `1..=N` in file
    /// order. Skipped lines appear as [`CommandKind::Unrecognized`].
    pub commands: Vec<Command>,
    pub skipped: Vec<SkippedLine>,
}

/// Open and parse the command file at `path`.
pub fn load_commands(path: impl AsRef<Path>, reserved_keyword: &str) -> CommandResult<CommandFile> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CommandError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_commands(BufReader::new(file), reserved_keyword)
}

/// Parse commands from any line-oriented source.
pub fn parse_commands<R: BufRead>(mut reader: R, reserved_keyword: &str) -> CommandResult<CommandFile> {
    let mut parsed = CommandFile::default();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| CommandError::Read {
                line: line_number + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);

        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(reserved_keyword) {
            if let Some(count) = declared_count(line) {
                parsed.declared_threads = Some(count);
            }
            continue;
        }

        let (command, skipped) = parse_line(line, parsed.commands.len() as u32 + 1);
        if let Some(reason) = skipped {
            parsed.skipped.push(SkippedLine {
                line_number,
                sequence: command.sequence,
                reason,
            });
        }
        parsed.commands.push(command);
    }

    Ok(parsed)
}

fn parse_line(line: &str, sequence: u32) -> (Command, Option<SkipReason>) {
    let mut fields = line.splitn(3, ',');

    let word = fields.next().unwrap_or_default();
    let (kind, skipped) = match word.parse::<CommandKind>() {
        Ok(kind) => (kind, None),
        Err(word) => (
            CommandKind::Unrecognized,
            Some(SkipReason::UnknownCommand(word)),
        ),
    };

    let name = truncate_name(fields.next().unwrap_or_default());

    let salary = fields
        .next()
        .and_then(|rest| rest.split(',').next())
        .and_then(|field| field.trim().parse::<u32>().ok())
        .unwrap_or(0);

    (Command::new(kind, name, salary, sequence), skipped)
}

/// `threads,<n>[,...]` -> `n`
fn declared_count(line: &str) -> Option<usize> {
    line.split(',').nth(1)?.trim().parse().ok()
}
