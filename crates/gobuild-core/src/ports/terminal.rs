//! Terminal launcher port.

use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Opens an interactive terminal for the user.
pub trait TerminalLauncher: Send + Sync {
    /// Open a terminal in `working_dir` with `env_overrides` applied on top of
    /// the user's environment.
    fn launch(
        &self,
        working_dir: &Path,
        env_overrides: &HashMap<String, String>,
    ) -> io::Result<()>;
}
