//! # gobuild
//!
//! Facade over the workspace crates. Hosts the end-to-end tests under
//! `tests/`; applications should depend on the crates directly:
//!
//! - `gobuild_core` - Domain types, ports, settings and errors
//! - `gobuild_runtime` - Process supervision, output sinks and the supervisor
//! - `gobuild_cli` - The `gobuild` command-line front end

pub use gobuild_core::{
    BuildCompleteEvent, BuildTask, CoreError, OutputChunk, PresentationSurface, ProcessError,
    ProcessOutcome, Settings, StreamKind, TargetId,
};
pub use gobuild_runtime::{
    BuildSupervisor, Coordinator, EventBus, MemorySurface, OutputSink, PrinterState,
    ProcessHandle, ProcessPrinter, Registry, memory_surface_factory,
};
