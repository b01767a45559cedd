//! CLI-specific error types
//!
//! Every CLI error is fatal: the process reports it and exits non-zero.

use std::fmt;

use crate::command::CommandError;
use crate::executor::ExecError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing, unreadable or invalid
    ConfigError,
    /// Command file could not be opened or read
    SourceUnavailable,
    /// Audit log could not be created
    AuditLogUnavailable,
    /// Workers could not be started or did not finish
    ExecutionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHASH_CLI_CONFIG_ERROR",
            Self::SourceUnavailable => "CHASH_CLI_SOURCE_UNAVAILABLE",
            Self::AuditLogUnavailable => "CHASH_CLI_AUDIT_LOG_UNAVAILABLE",
            Self::ExecutionFailed => "CHASH_CLI_EXECUTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn audit_log_unavailable(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::AuditLogUnavailable, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<CommandError> for CliError {
    fn from(e: CommandError) -> Self {
        Self::new(CliErrorCode::SourceUnavailable, e.to_string())
    }
}

impl From<ExecError> for CliError {
    fn from(e: ExecError) -> Self {
        Self::new(CliErrorCode::ExecutionFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
