//! Supervised subprocesses.
//!
//! # Structure
//!
//! - `ProcessHandle` - One spawned child, its merged output channel and terminal result
//! - `StreamDrain` - Reads one output stream to exhaustion
//! - `ProcessTreeKiller` - Whole-tree termination (process group signal or `taskkill`)

mod drain;
mod handle;
mod kill;

pub use drain::StreamDrain;
pub use handle::{ProcessHandle, StartOptions};
#[cfg(unix)]
pub use kill::SignalTreeKiller;
pub use kill::{ProcessTreeKiller, TaskkillTreeKiller, default_tree_killer};
