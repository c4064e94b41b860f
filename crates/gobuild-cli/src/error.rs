//! CLI-specific error types and exit codes.

use gobuild_core::{ConfigError, CoreError, ProcessError, ProcessOutcome, SettingsError, TaskError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or missing task input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Go toolchain or settings could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    /// The process could not be started or supervised.
    #[error("Process error: {0}")]
    Process(String),

    /// The go command ran and did not succeed.
    #[error("Task finished with result: {}", .0.label())]
    Task(ProcessOutcome),

    /// The user declined a required prompt.
    #[error("Aborted")]
    Aborted,
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Task(ProcessOutcome::Cancelled) => 130,
            Self::Task(_) | Self::Aborted => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Process(_) => 71,  // EX_OSERR
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }

    /// Exit status for a finished task, `None` on success.
    pub const fn from_outcome(outcome: ProcessOutcome) -> Option<Self> {
        match outcome {
            ProcessOutcome::Success => None,
            other => Some(Self::Task(other)),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Process(e) => e.into(),
            CoreError::Config(e) => e.into(),
            CoreError::Task(e) => e.into(),
            CoreError::Settings(e) => e.into(),
        }
    }
}

impl From<ProcessError> for CliError {
    fn from(err: ProcessError) -> Self {
        Self::Process(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<TaskError> for CliError {
    fn from(err: TaskError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
