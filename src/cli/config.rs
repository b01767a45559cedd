//! Run configuration
//!
//! Optional JSON file; every field has a default, and CLI flags override
//! whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::args::RunArgs;
use super::errors::{CliError, CliResult};
use crate::executor::ExecutionMode;
use crate::observability::Severity;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chash.json";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Command file (default "commands.txt")
    #[serde(default = "default_commands_file")]
    pub commands_file: PathBuf,

    /// Audit log, truncated at start (default "hash.log")
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,

    /// Lines starting with this are configuration, not commands
    /// (default "threads")
    #[serde(default = "default_reserved_keyword")]
    pub reserved_keyword: String,

    /// Pool size; absent means one thread per command
    #[serde(default)]
    pub workers: Option<usize>,

    /// Diagnostic log threshold (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_commands_file() -> PathBuf {
    PathBuf::from("commands.txt")
}
fn default_audit_log() -> PathBuf {
    PathBuf::from("hash.log")
}
fn default_reserved_keyword() -> String {
    "threads".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commands_file: default_commands_file(),
            audit_log: default_audit_log(),
            reserved_keyword: default_reserved_keyword(),
            workers: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration for a run.
    ///
    /// An explicit `--config` must exist. Otherwise [`DEFAULT_CONFIG_FILE`]
    /// is used when present, and built-in defaults when not.
    pub fn resolve(args: &RunArgs) -> CliResult<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = base.with_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI flags on top of this config.
    pub fn with_overrides(mut self, args: &RunArgs) -> Self {
        if let Some(path) = &args.commands {
            self.commands_file = path.clone();
        }
        if let Some(path) = &args.log {
            self.audit_log = path.clone();
        }
        if let Some(workers) = args.workers {
            self.workers = Some(workers);
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.workers == Some(0) {
            return Err(CliError::config_error("workers must be > 0"));
        }

        if self.reserved_keyword.is_empty() {
            return Err(CliError::config_error("reserved_keyword must not be empty"));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed diagnostic log threshold.
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Worker provisioning for this run.
    pub fn execution_mode(&self) -> ExecutionMode {
        match self.workers {
            Some(size) => ExecutionMode::Pool(size),
            None => ExecutionMode::ThreadPerCommand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.commands_file, PathBuf::from("commands.txt"));
        assert_eq!(config.audit_log, PathBuf::from("hash.log"));
        assert_eq!(config.reserved_keyword, "threads");
        assert_eq!(config.execution_mode(), ExecutionMode::ThreadPerCommand);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chash.json");
        fs::write(&path, r#"{"workers": 4, "audit_log": "run.log"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.audit_log, PathBuf::from("run.log"));
        assert_eq!(config.commands_file, PathBuf::from("commands.txt"));
        assert_eq!(config.execution_mode(), ExecutionMode::Pool(4));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.reserved_keyword.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chash.json");
        fs::write(&path, r#"{"threads": 4}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/chash.json")),
            ..RunArgs::default()
        };
        assert!(Config::resolve(&args).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let args = RunArgs {
            commands: Some(PathBuf::from("other.txt")),
            workers: Some(2),
            log_level: Some("info".into()),
            ..RunArgs::default()
        };
        let config = Config::default().with_overrides(&args);
        assert_eq!(config.commands_file, PathBuf::from("other.txt"));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.severity().unwrap(), Severity::Info);
        assert_eq!(config.audit_log, PathBuf::from("hash.log"));
    }
}
