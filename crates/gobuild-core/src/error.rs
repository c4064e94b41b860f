//! Error taxonomy shared by every gobuild crate.
//!
//! Runtime failure of a supervised command is *not* represented here: a
//! command that exits non-zero is the ordinary `ProcessOutcome::Error`
//! terminal result and travels through the completion record.

use std::io;

use thiserror::Error;

use crate::utils::format_message;

/// Documentation page offered when configuration resolution fails.
pub const CONFIG_DOCS_URL: &str =
    "https://github.com/golang/sublime-build/blob/master/docs/configuration.md";

/// Errors raised by the process supervision subsystem.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be launched (missing binary, permissions).
    ///
    /// No process exists and no registry state was touched.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to launch.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The argument vector was empty.
    #[error("Cannot start a process without a program")]
    EmptyCommand,

    /// A coordinating-context-only operation was invoked from another thread.
    #[error("{0} must be run on the coordinating context")]
    WrongContext(&'static str),

    /// The coordinating context is gone or dropped a job.
    #[error("Coordinator unavailable: {0}")]
    Coordinator(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProcessError {
    /// Build a spawn error for `program`.
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}

/// Failures reported by a [`ConfigResolver`](crate::ports::ConfigResolver).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The named executable was not found on the configured `PATH`.
    #[error("The {name} executable could not be found")]
    ExecutableNotFound {
        /// Executable name, e.g. `go`.
        name: String,
    },

    /// One or more required settings were not found anywhere.
    #[error("Missing required settings: {}", missing.join(", "))]
    EnvVarMissing {
        /// Names of the missing variables.
        missing: Vec<String>,
    },

    /// `GOROOT` points somewhere that does not exist.
    #[error("{0}")]
    GoRootNotFound(String),

    /// No `GOPATH` entry exists on disk.
    #[error("{0}")]
    GoPathNotFound(String),
}

impl ConfigError {
    /// Dialog text shown to the user for this failure.
    ///
    /// Every variant is followed by an offer to open [`CONFIG_DOCS_URL`].
    pub fn prompt_message(&self) -> String {
        let body = match self {
            Self::ExecutableNotFound { name } => format!(
                "
                Golang Build

                The {name} executable could not be found. Please ensure it is
                installed and available via your PATH.

                Would you like to view documentation for setting a custom PATH?
                "
            ),
            Self::EnvVarMissing { missing } => {
                let plural = if missing.len() > 1 { "s" } else { "" };
                format!(
                    "
                Golang Build

                The setting{plural} {} could not be found in your Sublime Text
                settings or your shell environment.

                Would you like to view the configuration documentation?
                ",
                    missing.join(", ")
                )
            }
            Self::GoRootNotFound(msg) | Self::GoPathNotFound(msg) => format!(
                "
                Golang Build

                {msg}.

                Would you like to view the configuration documentation?
                "
            ),
        };
        format_message(&body)
    }
}

/// Failures while turning a task request into an argument vector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task name is not one of the known tasks.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// `run` needs a `.go` file and none was given or open.
    #[error("No Go file to run: pass one in the flags or open one")]
    MissingRunFile,

    /// `cross_compile` needs a target platform.
    #[error("No target platform selected for cross compilation")]
    MissingPlatform,

    /// The `(GOOS, GOARCH)` pair is not a supported cross-compile target.
    #[error("Unsupported cross-compile target: {os}/{arch}")]
    UnsupportedPlatform {
        /// Requested `GOOS`.
        os: String,
        /// Requested `GOARCH`.
        arch: String,
    },

    /// `get` needs a package URL.
    #[error("No package URL given for go get")]
    MissingUrl,

    /// No working directory could be determined.
    #[error("No files or folders are open, or the open file or folder does not exist on disk")]
    NoWorkingDir,
}

/// Core error type aggregating the domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Process supervision failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Configuration resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Task planning failed.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Settings validation failed.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_names_program() {
        let err = ProcessError::spawn(
            "/nope/go",
            io::Error::new(io::ErrorKind::NotFound, "No such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/nope/go"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_wrong_context_message() {
        let err = ProcessError::WrongContext("OutputSink::reset");
        assert_eq!(
            err.to_string(),
            "OutputSink::reset must be run on the coordinating context"
        );
    }

    #[test]
    fn test_executable_prompt_is_unwrapped() {
        let msg = ConfigError::ExecutableNotFound {
            name: "go".to_string(),
        }
        .prompt_message();
        assert!(msg.starts_with("Golang Build\n\nThe go executable could not be found."));
        assert!(msg.contains("installed and available via your PATH."));
        assert!(msg.ends_with("setting a custom PATH?"));
    }

    #[test]
    fn test_env_var_prompt_pluralizes() {
        let one = ConfigError::EnvVarMissing {
            missing: vec!["GOPATH".to_string()],
        }
        .prompt_message();
        assert!(one.contains("The setting GOPATH could not be found"));

        let two = ConfigError::EnvVarMissing {
            missing: vec!["GOPATH".to_string(), "GOROOT".to_string()],
        }
        .prompt_message();
        assert!(two.contains("The settings GOPATH, GOROOT could not be found"));
    }

    #[test]
    fn test_core_error_from_task_error() {
        let err: CoreError = TaskError::MissingUrl.into();
        assert!(matches!(err, CoreError::Task(TaskError::MissingUrl)));
    }
}
