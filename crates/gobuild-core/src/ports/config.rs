//! Configuration and shell environment ports.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where a resolved setting value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
    /// The open project's settings.
    ProjectFile,
    /// The open project's settings, platform-specific section.
    ProjectFileOsSpecific,
    /// The plugin's own settings file.
    PluginSettings,
    /// The plugin's settings file, platform-specific section.
    PluginSettingsOsSpecific,
    /// The user's login shell environment.
    ShellEnvironment,
}

impl SettingSource {
    /// Whether the value was configured for this plugin rather than inherited
    /// from the user's shell.
    pub const fn is_plugin_configured(self) -> bool {
        !matches!(self, Self::ShellEnvironment)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProjectFile => "project file",
            Self::ProjectFileOsSpecific => "project file (os-specific)",
            Self::PluginSettings => "golang.sublime-settings",
            Self::PluginSettingsOsSpecific => "golang.sublime-settings (os-specific)",
            Self::ShellEnvironment => "shell environment",
        }
    }
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Host state configuration lookups are scoped to.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// File open in the active view, if saved.
    pub active_file: Option<PathBuf>,
    /// Folders open in the window.
    pub folders: Vec<PathBuf>,
}

/// A located executable and the environment to run it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub executable: PathBuf,
    pub env: HashMap<String, String>,
}

/// Resolves executables and settings from layered stores.
pub trait ConfigResolver: Send + Sync {
    /// Locate `executable` and collect `required` and `optional` variables.
    ///
    /// Fails when the executable is not on the configured `PATH`, when a
    /// required variable has no value, or when `GOROOT`/`GOPATH` point
    /// nowhere.
    fn resolve(
        &self,
        executable: &str,
        required: &[&str],
        optional: &[&str],
        ctx: &ResolveContext,
    ) -> Result<ResolvedConfig, ConfigError>;

    /// Look up a single setting and report where it came from.
    fn setting_value(&self, name: &str, ctx: &ResolveContext) -> Option<(String, SettingSource)>;
}

/// Access to the user's login shell environment.
pub trait ShellEnvPort: Send + Sync {
    /// Path of the user's shell and its exported environment.
    fn shell_env_and_path(&self) -> (PathBuf, HashMap<String, String>);
}
