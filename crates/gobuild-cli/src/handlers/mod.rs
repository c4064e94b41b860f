//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<_, CliError>`
//! - Thin wrappers that gather input, call the core and runtime, and format
//!   output for the terminal.

pub mod task;
pub mod terminal;
