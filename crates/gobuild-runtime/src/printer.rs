//! Bridge from a process's output channel to its target's sink.
//!
//! ```text
//! Starting ──> Streaming ──> Finalizing ──> Done
//!  lock,        body          footer (waits
//!  header       chunks        until applied),
//!                             completion record
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use gobuild_core::{
    BuildCompleteEvent, CompletionEmitter, OutputChunk, ProcessError, TargetId, join_command_line,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::process::ProcessHandle;
use crate::sink::{OutputSink, PrinterPermit};

const HEADER_SEPARATOR: &str = "\n\n";
const FOOTER_SEPARATOR: &str = "\n";

/// Where a printer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterState {
    /// Waiting for the admission lock or writing the header.
    Starting,
    Streaming,
    Finalizing,
    /// Lock released. Terminal.
    Done,
}

/// What a printer reports alongside the process output.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub target: TargetId,
    /// Task label carried in the completion record.
    pub task: String,
    /// Variables listed in the header when present in the process env.
    pub header_env_vars: Vec<String>,
    /// Topic the completion record is published on.
    pub topic: String,
}

/// Render the header block written before a process's output.
///
/// ```text
/// > Environment:
/// >   GOPATH=/go
/// > Directory: /go/src/hello
/// > Command: /usr/bin/go build -v
/// > Output:
/// ```
///
/// Only `header_env_vars` present in `env` are listed, sorted by name; the
/// environment block is omitted when none are.
pub fn format_header(
    env: &HashMap<String, String>,
    header_env_vars: &[String],
    cwd: &Path,
    args: &[String],
) -> String {
    let mut names: Vec<&String> = header_env_vars
        .iter()
        .filter(|name| env.contains_key(*name))
        .collect();
    names.sort();
    names.dedup();

    let mut header = String::new();
    if !names.is_empty() {
        header.push_str("> Environment:\n");
        for name in names {
            let _ = writeln!(header, ">   {name}={}", env[name]);
        }
    }
    let _ = writeln!(header, "> Directory: {}", cwd.display());
    let _ = writeln!(header, "> Command: {}", join_command_line(args));
    header.push_str("> Output:\n");
    header
}

/// Sets `Done` when dropped so every exit path reports completion.
struct DoneOnDrop(watch::Sender<PrinterState>);

impl Drop for DoneOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(PrinterState::Done);
    }
}

/// Streams one process into one sink.
pub struct ProcessPrinter {
    process: Arc<ProcessHandle>,
    sink: OutputSink,
    permit: Option<PrinterPermit>,
    config: PrinterConfig,
    emitter: Arc<dyn CompletionEmitter>,
    state: watch::Sender<PrinterState>,
}

impl ProcessPrinter {
    /// Start printing `process` into `sink` on a new task.
    ///
    /// With `permit` the printer starts immediately; without one it first
    /// waits for the sink's admission lock.
    pub fn spawn(
        process: Arc<ProcessHandle>,
        sink: OutputSink,
        permit: Option<PrinterPermit>,
        config: PrinterConfig,
        emitter: Arc<dyn CompletionEmitter>,
    ) -> PrinterHandle {
        let (state, state_rx) = watch::channel(PrinterState::Starting);
        let printer = Self {
            process,
            sink,
            permit,
            config,
            emitter,
            state,
        };
        let task = tokio::spawn(printer.run());
        PrinterHandle {
            state: state_rx,
            task,
        }
    }

    async fn run(mut self) {
        // Declared before the permit so the lock is released first on unwind
        let _done = DoneOnDrop(self.state.clone());

        let permit = match self.permit.take() {
            Some(permit) => permit,
            None => self.sink.acquire_for_printing().await,
        };
        let target = self.config.target;

        let process = Arc::clone(&self.process);
        self.sink.set_base_dir(process.cwd());
        self.sink.write(
            format_header(
                process.env(),
                &self.config.header_env_vars,
                process.cwd(),
                process.args(),
            ),
            Some(HEADER_SEPARATOR),
            None,
        );

        let Some(mut output) = process.take_output() else {
            error!(target_id = %target, "Process output already taken by another printer");
            return;
        };

        self.transition(PrinterState::Streaming);
        while let Some(chunk) = output.recv().await {
            match chunk {
                OutputChunk::Stdout(text) | OutputChunk::Stderr(text) => self.sink.append(text),
                OutputChunk::Eof => break,
            }
        }

        self.transition(PrinterState::Finalizing);
        let outcome = process.wait().await;
        let runtime = process.elapsed();
        let footer = format!(
            "> Elapsed: {:.3}s\n> Result: {}",
            runtime.as_secs_f64(),
            outcome.label()
        );
        if !self.sink.write_and_wait(footer, Some(FOOTER_SEPARATOR)).await {
            warn!(target_id = %target, "Footer write was discarded");
        }

        self.emitter.emit(
            &self.config.topic,
            BuildCompleteEvent {
                target,
                task: self.config.task.clone(),
                args: process.args().to_vec(),
                working_dir: process.cwd().to_path_buf(),
                env: process.env().clone(),
                started_at: process.started_at(),
                runtime,
                result: outcome,
            },
        );

        permit.release();
    }

    fn transition(&self, next: PrinterState) {
        debug!(target_id = %self.config.target, state = ?next, "Printer state");
        self.state.send_replace(next);
    }
}

/// Handle to a running [`ProcessPrinter`].
#[derive(Debug)]
pub struct PrinterHandle {
    state: watch::Receiver<PrinterState>,
    task: JoinHandle<()>,
}

impl PrinterHandle {
    pub fn state(&self) -> PrinterState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch(&self) -> watch::Receiver<PrinterState> {
        self.state.clone()
    }

    /// Wait for the printer to reach `Done`.
    pub async fn wait(self) -> Result<(), ProcessError> {
        self.task
            .await
            .map_err(|e| ProcessError::Internal(format!("printer task failed: {e}")))
    }
}
