//! Terminal and environment implementations of the core ports.

mod config;
mod prompt;
mod shell;
mod surface;

pub use config::EnvConfigResolver;
pub use prompt::ConsolePrompt;
pub use shell::{ProcessShellEnv, ShellTerminalLauncher};
pub use surface::{TerminalSurface, terminal_surface_factory};
