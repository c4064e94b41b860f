//! Shell environment and terminal launching.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use gobuild_core::{ShellEnvPort, TerminalLauncher};
use tracing::{debug, info};

#[cfg(windows)]
const SHELL_VAR: &str = "COMSPEC";
#[cfg(not(windows))]
const SHELL_VAR: &str = "SHELL";

#[cfg(windows)]
const FALLBACK_SHELL: &str = "cmd.exe";
#[cfg(not(windows))]
const FALLBACK_SHELL: &str = "/bin/sh";

/// The environment this process was started with stands in for the login
/// shell's.
#[derive(Debug, Clone, Default)]
pub struct ProcessShellEnv;

impl ShellEnvPort for ProcessShellEnv {
    fn shell_env_and_path(&self) -> (PathBuf, HashMap<String, String>) {
        let env: HashMap<String, String> = std::env::vars().collect();
        let shell = env
            .get(SHELL_VAR)
            .map_or_else(|| PathBuf::from(FALLBACK_SHELL), PathBuf::from);
        (shell, env)
    }
}

/// Runs the user's shell in the foreground of the current terminal.
#[derive(Debug, Clone)]
pub struct ShellTerminalLauncher {
    shell: PathBuf,
}

impl ShellTerminalLauncher {
    pub const fn new(shell: PathBuf) -> Self {
        Self { shell }
    }
}

impl TerminalLauncher for ShellTerminalLauncher {
    fn launch(
        &self,
        working_dir: &Path,
        env_overrides: &HashMap<String, String>,
    ) -> io::Result<()> {
        info!(shell = %self.shell.display(), dir = %working_dir.display(), "Opening terminal");
        debug!(overrides = ?env_overrides, "Terminal environment overrides");

        let status = Command::new(&self.shell)
            .current_dir(working_dir)
            .envs(env_overrides)
            .status()?;
        debug!(status = %status, "Terminal closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_env_mirrors_process_env() {
        let (shell, env) = ProcessShellEnv.shell_env_and_path();
        assert!(!shell.as_os_str().is_empty());
        assert_eq!(env.get("PATH"), std::env::var("PATH").ok().as_ref());
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_missing_shell_fails() {
        let launcher = ShellTerminalLauncher::new(PathBuf::from("/definitely/not/a/shell"));
        assert!(launcher.launch(Path::new("/"), &HashMap::new()).is_err());
    }
}
