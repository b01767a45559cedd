//! CLI command implementations
//!
//! `run` follows a fixed startup order: resolve configuration, open the
//! audit log, load the command file, then start workers. Any failure before
//! the first worker is spawned is fatal and nothing has been executed.

use std::sync::Arc;

use crate::command::{load_commands, CommandFile};
use crate::executor::{execute_all, CommandExecutor, RunReport};
use crate::observability::{
    log_event, log_event_with_fields, AuditLog, Event, FileAuditLog, LockMetricsSnapshot,
    Logger, StatusSink, StdoutStatus,
};
use crate::store::{jenkins_hash, truncate_name, Record};

use super::args::{Action, Cli, RunArgs};
use super::config::Config;
use super::errors::{CliError, CliResult};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-command outcomes in sequence order
    pub report: RunReport,
    /// The driver's closing snapshot
    pub final_state: Vec<Record>,
    /// Lock counters after the closing snapshot
    pub lock: LockMetricsSnapshot,
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.action.unwrap_or_default())
}

/// Run a CLI action
pub fn run_command(action: Action) -> CliResult<()> {
    match action {
        Action::Run(args) => run_from_args(&args).map(|_| ()),
        Action::Hash { names } => {
            for line in hash_lines(&names) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn run_from_args(args: &RunArgs) -> CliResult<RunSummary> {
    log_event(Event::RunStart);

    let config = Config::resolve(args).inspect_err(startup_failed)?;
    Logger::set_threshold(config.severity()?);

    let commands_file = config.commands_file.display().to_string();
    let audit_log = config.audit_log.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("commands_file", commands_file.as_str()),
            ("audit_log", audit_log.as_str()),
        ],
    );

    run_commands(&config, Arc::new(StdoutStatus))
}

/// Execute the configured command file, writing status lines to `status`.
pub fn run_commands(config: &Config, status: Arc<dyn StatusSink>) -> CliResult<RunSummary> {
    let audit: Arc<dyn AuditLog> = Arc::new(
        FileAuditLog::create(&config.audit_log)
            .map_err(|e| {
                CliError::audit_log_unavailable(format!(
                    "Failed to create audit log {}: {}",
                    config.audit_log.display(),
                    e
                ))
            })
            .inspect_err(startup_failed)?,
    );

    let file = load_commands(&config.commands_file, &config.reserved_keyword)
        .map_err(CliError::from)
        .inspect_err(startup_failed)?;
    report_loaded(&file);

    status.emit(&format!(
        "Starting {} threads from {}...",
        file.commands.len(),
        config.commands_file.display()
    ));

    let executor = CommandExecutor::with_sinks(Arc::clone(&audit), Arc::clone(&status));
    let report = execute_all(&executor, file.commands, config.execution_mode())?;

    status.emit("All threads finished. Final database state:");
    let final_state = executor.print_final();

    let lock = executor.store().lock_metrics().snapshot();
    let commands = report.len().to_string();
    let records = final_state.len().to_string();
    let acquisitions = lock.acquisitions().to_string();
    let releases = lock.releases().to_string();
    log_event_with_fields(
        Event::RunComplete,
        &[
            ("commands", commands.as_str()),
            ("records", records.as_str()),
            ("lock_acquisitions", acquisitions.as_str()),
            ("lock_releases", releases.as_str()),
        ],
    );

    Ok(RunSummary {
        report,
        final_state,
        lock,
    })
}

fn report_loaded(file: &CommandFile) {
    let count = file.commands.len().to_string();
    let skipped = file.skipped.len().to_string();
    log_event_with_fields(
        Event::CommandsLoaded,
        &[("commands", count.as_str()), ("skipped", skipped.as_str())],
    );

    for line in &file.skipped {
        let line_number = line.line_number.to_string();
        let sequence = line.sequence.to_string();
        let reason = line.reason.to_string();
        log_event_with_fields(
            Event::LineSkipped,
            &[
                ("line", line_number.as_str()),
                ("turn", sequence.as_str()),
                ("reason", reason.as_str()),
            ],
        );
    }

    if let Some(declared) = file.declared_threads {
        if declared != file.commands.len() {
            let declared = declared.to_string();
            log_event_with_fields(
                Event::ThreadCountMismatch,
                &[("declared", declared.as_str()), ("commands", count.as_str())],
            );
        }
    }
}

fn startup_failed(err: &CliError) {
    let message = err.message().to_string();
    log_event_with_fields(
        Event::StartupFailed,
        &[("code", err.code_str()), ("error", message.as_str())],
    );
}

/// `<hash>,<name>` for each name, hashed the way the store keys it.
pub fn hash_lines(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let name = truncate_name(name);
            format!("{},{}", jenkins_hash(name), name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use crate::command::CommandKind;
    use crate::observability::MemoryStatus;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_in(dir: &Path, commands: &str) -> Config {
        let commands_file = dir.join("commands.txt");
        fs::write(&commands_file, commands).unwrap();
        Config {
            commands_file,
            audit_log: dir.join("hash.log"),
            // One worker keeps completion order equal to file order.
            workers: Some(1),
            ..Config::default()
        }
    }

    #[test]
    fn test_hash_lines() {
        let lines = hash_lines(&["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(lines, vec!["210078619,Alice", "3345588153,Bob"]);
    }

    #[test]
    fn test_run_commands_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            dir.path(),
            "threads,4,0\nINSERT,A,100\nINSERT,B,200\nDELETE,A,0\nPRINT,0,0\n",
        );
        let status = Arc::new(MemoryStatus::new());

        let summary = run_commands(&config, status.clone()).unwrap();

        assert_eq!(summary.final_state.len(), 1);
        assert_eq!(summary.final_state[0].name, "B");
        assert_eq!(summary.final_state[0].salary, 200);
        assert_eq!(summary.report.successes(CommandKind::Delete), 1);
        assert_eq!(summary.lock.acquisitions(), summary.lock.releases());

        let lines = status.lines();
        assert_eq!(lines[0], format!("Starting 4 threads from {}...", config.commands_file.display()));
        assert!(lines.contains(&"All threads finished. Final database state:".to_string()));

        let log = fs::read_to_string(&config.audit_log).unwrap();
        assert!(log.lines().last().unwrap().ends_with("THREAD 0 READ LOCK RELEASED"));
        assert!(!log.contains("Number of lock"));
    }

    #[test]
    fn test_missing_command_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            commands_file: dir.path().join("absent.txt"),
            audit_log: dir.path().join("hash.log"),
            ..Config::default()
        };

        let err = run_commands(&config, Arc::new(MemoryStatus::new())).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::SourceUnavailable);
    }

    #[test]
    fn test_unwritable_audit_log_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(dir.path(), "PRINT,0,0\n");
        config.audit_log = dir.path().join("missing").join("hash.log");

        let err = run_commands(&config, Arc::new(MemoryStatus::new())).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::AuditLogUnavailable);
    }
}
