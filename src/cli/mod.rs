//! CLI module for chash
//!
//! Provides command-line interface for:
//! - run: Execute a command file against a fresh store (the default)
//! - hash: Print the key a name would be stored under

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Action, Cli, RunArgs};
pub use commands::{hash_lines, run, run_command, run_commands, RunSummary};
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use errors::{CliError, CliErrorCode, CliResult};
