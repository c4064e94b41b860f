//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Settings (JSON file, validated)
//! - Configuration resolution and the shell environment
//! - The build supervisor with terminal-backed output
//!
//! Command handlers receive the composed `CliContext`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use gobuild_core::{
    ConfigResolver, PromptSurface, Settings, ShellEnvPort, TargetId, TerminalLauncher,
    validate_settings,
};
use gobuild_runtime::BuildSupervisor;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    ConsolePrompt, EnvConfigResolver, ProcessShellEnv, ShellTerminalLauncher,
    terminal_surface_factory,
};

/// The CLI drives a single output target.
pub const CLI_TARGET: TargetId = TargetId(1);

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Settings file, defaults when absent.
    pub settings_path: Option<PathBuf>,
    /// Name or path of the go executable.
    pub go: String,
    /// Directory to run in; the current directory when absent.
    pub cwd: Option<PathBuf>,
    /// Accept confirmations without asking.
    pub assume_yes: bool,
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    pub supervisor: BuildSupervisor,
    pub config: Arc<dyn ConfigResolver>,
    pub shell: Arc<dyn ShellEnvPort>,
    pub prompt: Arc<dyn PromptSurface>,
    pub terminal: Arc<dyn TerminalLauncher>,
    pub go: String,
    /// Folder tasks run in unless a run file says otherwise.
    pub folder: PathBuf,
}

/// Install the tracing subscriber. Logs go to stderr so they never mix with
/// task output on stdout.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and validate a settings file, or fall back to defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::with_defaults());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings = Settings::from_json(&text)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    validate_settings(&settings)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Wire every adapter and start the supervisor.
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let settings = load_settings(config.settings_path.as_deref())?;

    let folder = match config.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };

    let shell: Arc<dyn ShellEnvPort> = Arc::new(ProcessShellEnv);
    let (shell_path, _) = shell.shell_env_and_path();
    let resolver = EnvConfigResolver::new(
        settings.env_overrides.clone().unwrap_or_default(),
        Arc::clone(&shell),
    );

    let supervisor = BuildSupervisor::new(
        settings.clone(),
        terminal_surface_factory(settings.effective_panel_name()),
    )
    .context("Failed to start the build supervisor")?;

    Ok(CliContext {
        settings,
        supervisor,
        config: Arc::new(resolver),
        shell,
        prompt: Arc::new(ConsolePrompt::new(config.assume_yes)),
        terminal: Arc::new(ShellTerminalLauncher::new(shell_path)),
        go: config.go,
        folder,
    })
}
