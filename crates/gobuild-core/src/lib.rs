//! Core domain types and port definitions for gobuild.
//!
//! This crate holds everything the process supervisor needs to talk about
//! (targets, output chunks, terminal outcomes, build tasks, completion
//! records) and the traits through which it reaches its collaborators
//! (presentation surfaces, prompts, configuration, terminals). It contains
//! no process or OS code; see `gobuild-runtime` for that.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    ActiveDocument, BuildTask, CROSS_COMPILE_TARGETS, DEFAULT_FLAGS, GO_ENV_VARS, OutputChunk,
    ProcessOutcome, StreamKind, TargetId, TaskOptions, TaskPlan, cross_compile_labels,
    determine_working_dir, ensure_bench_flag, plan_task, resolve_run_flags,
    terminal_env_overrides,
};
pub use error::{CONFIG_DOCS_URL, ConfigError, CoreError, ProcessError, TaskError};
pub use events::BuildCompleteEvent;
pub use ports::{
    CompletionEmitter, ConfigResolver, NoopEmitter, PresentationSurface, PromptSurface,
    ResolveContext, ResolvedConfig, SettingSource, ShellEnvPort, TerminalLauncher,
    report_config_error,
};
pub use settings::{
    DEFAULT_COMPLETION_TOPIC, DEFAULT_PANEL_NAME, DEFAULT_READ_CHUNK_SIZE, Settings,
    SettingsError, SettingsUpdate, validate_settings,
};
pub use utils::{format_message, join_command_line};
