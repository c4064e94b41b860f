//! Process supervision runtime for gobuild.
//!
//! Spawns `go` subprocesses, drains their output without blocking, records a
//! single terminal result per process and funnels everything into one
//! reusable output sink per target. All presentation-surface mutation runs on
//! a single [`Coordinator`] thread.
//!
//! ```text
//! BuildSupervisor
//!   ├── Registry ──── TargetId -> ProcessHandle, TargetId -> OutputSink
//!   ├── Coordinator ─ applies queued sink writes, runs prompts
//!   └── EventBus ──── topic -> broadcast::Sender<BuildCompleteEvent>
//!
//! ProcessHandle ─┬─ StreamDrain(stdout) ─┐
//!                └─ StreamDrain(stderr) ─┴─> merged channel ─> ProcessPrinter ─> OutputSink
//! ```
#![deny(unsafe_code)]

mod coordinator;
mod events;
mod printer;
pub mod process;
mod registry;
pub mod sink;
mod supervisor;
mod sync;

pub use coordinator::Coordinator;
pub use events::EventBus;
pub use printer::{PrinterConfig, PrinterHandle, PrinterState, ProcessPrinter, format_header};
pub use process::{
    ProcessHandle, ProcessTreeKiller, StartOptions, StreamDrain, TaskkillTreeKiller,
    default_tree_killer,
};
#[cfg(unix)]
pub use process::SignalTreeKiller;
pub use registry::Registry;
pub use sink::{MemorySurface, OutputSink, PrinterPermit, ResultLocation, parse_result_line};
pub use supervisor::{BuildSupervisor, SupervisedRun, SurfaceFactory, memory_surface_factory};
