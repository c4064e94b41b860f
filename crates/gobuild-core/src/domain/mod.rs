//! Core domain types.
//!
//! These types describe supervised runs independent of how processes are
//! spawned or where output is displayed.
//!
//! # Structure
//!
//! - `target` - Logical target identity (`TargetId`)
//! - `output` - Output stream chunks (`OutputChunk`, `StreamKind`)
//! - `outcome` - Terminal results (`ProcessOutcome`)
//! - `task` - Go task planning (`BuildTask`, `plan_task`)
//! - `workspace` - Working directory and terminal environment policies

mod outcome;
mod output;
mod target;
pub mod task;
pub mod workspace;

pub use outcome::ProcessOutcome;
pub use output::{OutputChunk, StreamKind};
pub use target::TargetId;

// Re-export task types at the domain level for convenience
pub use task::{
    BuildTask, CROSS_COMPILE_TARGETS, DEFAULT_FLAGS, GO_ENV_VARS, TaskOptions, TaskPlan,
    cross_compile_labels, ensure_bench_flag, plan_task, resolve_run_flags,
};

pub use workspace::{ActiveDocument, determine_working_dir, terminal_env_overrides};
