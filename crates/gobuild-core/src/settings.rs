//! Settings domain types and validation.
//!
//! These are pure domain types; loading them from disk is left to adapters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BuildTask, GO_ENV_VARS};

/// Default size of each read from a child's output stream.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 32 * 1024;

/// Default topic completion records are published on.
pub const DEFAULT_COMPLETION_TOPIC: &str = "build_complete";

/// Default identifier of the output panel.
pub const DEFAULT_PANEL_NAME: &str = "golang_build";

const MIN_READ_CHUNK_SIZE: usize = 1024;
const MAX_READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Supervisor settings.
///
/// All fields are optional to support partial files and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Bytes read from a child's stdout/stderr per chunk (1 KiB - 1 MiB).
    pub read_chunk_size: Option<usize>,

    /// Variables listed in output headers when present in a run's environment.
    pub header_env_vars: Option<Vec<String>>,

    /// Topic completion records are published on.
    pub completion_topic: Option<String>,

    /// Identifier of the output panel.
    pub panel_name: Option<String>,

    /// Per-task flags keyed by task label (`"build" -> ["-v"]`).
    pub task_flags: Option<HashMap<String, Vec<String>>>,

    /// Plugin-level values for Go environment variables and `PATH`.
    pub env_overrides: Option<HashMap<String, String>>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            read_chunk_size: Some(DEFAULT_READ_CHUNK_SIZE),
            header_env_vars: Some(GO_ENV_VARS.iter().map(ToString::to_string).collect()),
            completion_topic: Some(DEFAULT_COMPLETION_TOPIC.to_string()),
            panel_name: Some(DEFAULT_PANEL_NAME.to_string()),
            task_flags: None,
            env_overrides: None,
        }
    }

    /// Parse settings from a JSON document.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Get the effective read chunk size (with default fallback).
    #[must_use]
    pub const fn effective_read_chunk_size(&self) -> usize {
        match self.read_chunk_size {
            Some(size) => size,
            None => DEFAULT_READ_CHUNK_SIZE,
        }
    }

    /// Get the effective header variable list (with default fallback).
    pub fn effective_header_env_vars(&self) -> Vec<String> {
        self.header_env_vars
            .clone()
            .unwrap_or_else(|| GO_ENV_VARS.iter().map(ToString::to_string).collect())
    }

    pub fn effective_completion_topic(&self) -> &str {
        self.completion_topic
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETION_TOPIC)
    }

    pub fn effective_panel_name(&self) -> &str {
        self.panel_name.as_deref().unwrap_or(DEFAULT_PANEL_NAME)
    }

    /// Configured flags for `task`, `None` when the task has no entry.
    pub fn flags_for(&self, task: BuildTask) -> Option<Vec<String>> {
        self.task_flags
            .as_ref()
            .and_then(|flags| flags.get(task.as_str()))
            .cloned()
    }

    /// Plugin-level value for an environment variable.
    pub fn env_override(&self, name: &str) -> Option<&str> {
        self.env_overrides
            .as_ref()
            .and_then(|env| env.get(name))
            .map(String::as_str)
    }

    /// Merge an update into this one, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref size) = other.read_chunk_size {
            self.read_chunk_size = *size;
        }
        if let Some(ref vars) = other.header_env_vars {
            self.header_env_vars.clone_from(vars);
        }
        if let Some(ref topic) = other.completion_topic {
            self.completion_topic.clone_from(topic);
        }
        if let Some(ref name) = other.panel_name {
            self.panel_name.clone_from(name);
        }
        if let Some(ref flags) = other.task_flags {
            self.task_flags.clone_from(flags);
        }
        if let Some(ref env) = other.env_overrides {
            self.env_overrides.clone_from(env);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub read_chunk_size: Option<Option<usize>>,
    pub header_env_vars: Option<Option<Vec<String>>>,
    pub completion_topic: Option<Option<String>>,
    pub panel_name: Option<Option<String>>,
    pub task_flags: Option<Option<HashMap<String, Vec<String>>>>,
    pub env_overrides: Option<Option<HashMap<String, String>>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Read chunk size must be between 1 KiB and 1 MiB, got {0}")]
    InvalidChunkSize(usize),

    #[error("Completion topic cannot be empty")]
    EmptyTopic,

    #[error("Panel name cannot be empty")]
    EmptyPanelName,

    #[error("Unknown task in task_flags: {0}")]
    UnknownTaskFlags(String),

    #[error("Invalid settings file: {0}")]
    Parse(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(size) = settings.read_chunk_size {
        if !(MIN_READ_CHUNK_SIZE..=MAX_READ_CHUNK_SIZE).contains(&size) {
            return Err(SettingsError::InvalidChunkSize(size));
        }
    }

    if settings
        .completion_topic
        .as_ref()
        .is_some_and(|t| t.trim().is_empty())
    {
        return Err(SettingsError::EmptyTopic);
    }

    if settings
        .panel_name
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyPanelName);
    }

    if let Some(flags) = &settings.task_flags {
        if let Some(unknown) = flags.keys().find(|k| k.parse::<BuildTask>().is_err()) {
            return Err(SettingsError::UnknownTaskFlags(unknown.clone()));
        }
    }

    Ok(())
}
