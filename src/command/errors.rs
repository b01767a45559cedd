//! Command source errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for command loading
pub type CommandResult<T> = Result<T, CommandError>;

/// Command source errors. Both are fatal to a run.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::SourceUnavailable { .. } => "CHASH_COMMAND_SOURCE_UNAVAILABLE",
            CommandError::Read { .. } => "CHASH_COMMAND_READ_FAILED",
        }
    }
}
