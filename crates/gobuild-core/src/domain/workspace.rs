//! Working directory and terminal environment policies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::task::GO_ENV_VARS;
use crate::error::TaskError;
use crate::ports::SettingSource;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: char = ':';

/// What the host's active view is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveDocument {
    /// No view is active.
    #[default]
    None,
    /// A view with a buffer that has never been saved.
    Unsaved,
    /// A view backed by a file on disk.
    Saved(PathBuf),
}

impl ActiveDocument {
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Saved(path) => Some(path),
            Self::None | Self::Unsaved => None,
        }
    }
}

/// Pick the directory a task runs in.
///
/// The directory containing the active file wins, then the first open
/// folder. The result must exist on disk.
pub fn determine_working_dir(
    active: &ActiveDocument,
    folders: &[PathBuf],
) -> Result<PathBuf, TaskError> {
    let candidate = active
        .file()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| folders.first().cloned());

    match candidate {
        Some(dir) if dir.exists() => Ok(dir),
        _ => Err(TaskError::NoWorkingDir),
    }
}

/// Environment overrides for a terminal opened on the project.
///
/// Only Go variables whose value came from a project or plugin settings file
/// are passed through; values from the user's shell are already present in
/// the terminal. A configured `PATH` is prepended to the shell `PATH` so the
/// terminal still searches every default location.
pub fn terminal_env_overrides<F>(
    lookup: F,
    shell_env: &HashMap<String, String>,
) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<(String, SettingSource)>,
{
    let mut overrides: HashMap<String, String> = GO_ENV_VARS
        .iter()
        .filter_map(|name| {
            lookup(name)
                .filter(|(_, source)| source.is_plugin_configured())
                .map(|(value, _)| ((*name).to_string(), value))
        })
        .collect();

    if let Some((value, source)) = lookup("PATH") {
        if source.is_plugin_configured() {
            let shell_path = shell_env.get("PATH").map_or("", String::as_str);
            overrides.insert(
                "PATH".to_string(),
                format!("{value}{PATH_LIST_SEPARATOR}{shell_path}"),
            );
        }
    }

    overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_working_dir_prefers_active_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("main.go");
        let other = TempDir::new().unwrap();

        let wd = determine_working_dir(
            &ActiveDocument::Saved(file),
            &[other.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(wd, dir.path());
    }

    #[test]
    fn test_working_dir_falls_back_to_first_folder() {
        let folder = TempDir::new().unwrap();
        let wd =
            determine_working_dir(&ActiveDocument::Unsaved, &[folder.path().to_path_buf()])
                .unwrap();
        assert_eq!(wd, folder.path());
    }

    #[test]
    fn test_working_dir_must_exist() {
        let err = determine_working_dir(
            &ActiveDocument::Saved(PathBuf::from("/definitely/not/here/main.go")),
            &[],
        )
        .unwrap_err();
        assert_eq!(err, TaskError::NoWorkingDir);

        assert_eq!(
            determine_working_dir(&ActiveDocument::None, &[]).unwrap_err(),
            TaskError::NoWorkingDir
        );
    }

    #[test]
    fn test_terminal_overrides_skip_shell_values() {
        let lookup = |name: &str| match name {
            "GOPATH" => Some(("/proj/go".to_string(), SettingSource::ProjectFile)),
            "GOROOT" => Some(("/usr/lib/go".to_string(), SettingSource::ShellEnvironment)),
            "PATH" => Some(("/opt/go/bin".to_string(), SettingSource::PluginSettings)),
            _ => None,
        };
        let shell_env = HashMap::from([("PATH".to_string(), "/usr/bin".to_string())]);

        let overrides = terminal_env_overrides(lookup, &shell_env);
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides["GOPATH"], "/proj/go");
        assert_eq!(
            overrides["PATH"],
            format!("/opt/go/bin{PATH_LIST_SEPARATOR}/usr/bin")
        );
    }
}
