//! CLI argument definitions using clap
//!
//! Commands:
//! - chash [run] [--config <path>] [--commands <path>] [--log <path>] [--workers <n>]
//! - chash hash <NAME>...

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// chash - concurrent hash-keyed record store driven by a command file
#[derive(Parser, Debug)]
#[command(name = "chash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Execute a command file (the default)
    Run(RunArgs),

    /// Print the hash the store would use for each name
    Hash {
        /// Names to hash
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Default for Action {
    fn default() -> Self {
        Action::Run(RunArgs::default())
    }
}

/// Options for `run`. Each one overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Command file to execute
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Audit log to write
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Use a pool of this many workers instead of one thread per command
    #[arg(long)]
    pub workers: Option<usize>,

    /// Diagnostic log level (trace, info, warn, error, fatal)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
