//! Open a shell configured for the project.

use gobuild_core::{ActiveDocument, ResolveContext, determine_working_dir, terminal_env_overrides};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Launch the user's shell in the project folder with the Go settings from
/// the settings file applied.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let working_dir =
        determine_working_dir(&ActiveDocument::None, std::slice::from_ref(&ctx.folder))?;
    let resolve_ctx = ResolveContext {
        active_file: None,
        folders: vec![ctx.folder.clone()],
    };

    let (_, shell_env) = ctx.shell.shell_env_and_path();
    let overrides =
        terminal_env_overrides(|name| ctx.config.setting_value(name, &resolve_ctx), &shell_env);
    ctx.terminal.launch(&working_dir, &overrides)?;
    Ok(())
}
