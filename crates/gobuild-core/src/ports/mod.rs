//! Port definitions (trait abstractions) for external collaborators.
//!
//! The supervisor only reaches its surroundings through these traits: where
//! output is displayed, how the user is asked things, where configuration
//! comes from, how terminals are opened and who hears about completions.
//!
//! # Design Rules
//!
//! - No process or OS types in any signature
//! - Presentation and prompt methods are only called from the coordinating context
//! - Emitters must not block

pub mod config;
pub mod event_emitter;
pub mod prompt;
pub mod surface;
pub mod terminal;

pub use config::{ConfigResolver, ResolveContext, ResolvedConfig, SettingSource, ShellEnvPort};
pub use event_emitter::{CompletionEmitter, NoopEmitter};
pub use prompt::{PromptSurface, report_config_error};
pub use surface::PresentationSurface;
pub use terminal::TerminalLauncher;

#[cfg(test)]
pub use prompt::MockPromptSurface;
