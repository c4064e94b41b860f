//! Process-wide supervision service.
//!
//! `BuildSupervisor` owns the registry, the coordinator and the completion
//! bus. It is created once by the host and shared with every command handler.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use gobuild_core::{
    BuildCompleteEvent, CompletionEmitter, PresentationSurface, ProcessError, PromptSurface,
    Settings, TargetId, format_message,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::events::EventBus;
use crate::printer::{PrinterConfig, PrinterHandle, ProcessPrinter};
use crate::process::{ProcessHandle, ProcessTreeKiller, StartOptions, default_tree_killer};
use crate::registry::Registry;
use crate::sink::{MemorySurface, OutputSink, PrinterPermit};

const RUNNING_BUILD_PROMPT: &str = "
    Golang Build

    There is already a build running. Would you like to stop it?
    ";
const STOP_RUNNING_LABEL: &str = "Stop Running Build";

/// Terminates a started process whose printer was never attached.
///
/// Armed from spawn until `ProcessPrinter::spawn`, covering a dropped start
/// future.
struct UnprintedGuard {
    target: TargetId,
    process: Option<Arc<ProcessHandle>>,
}

impl UnprintedGuard {
    fn new(target: TargetId, process: Arc<ProcessHandle>) -> Self {
        Self {
            target,
            process: Some(process),
        }
    }

    fn disarm(mut self) {
        self.process = None;
    }
}

impl Drop for UnprintedGuard {
    fn drop(&mut self) {
        if let Some(process) = self.process.take() {
            if process.terminate() {
                warn!(target_id = %self.target, "Start abandoned before printing, process terminated");
            }
        }
    }
}

/// Builds the presentation surface for a target's sink on first use.
pub type SurfaceFactory = Arc<dyn Fn(TargetId) -> Box<dyn PresentationSurface> + Send + Sync>;

/// A factory producing in-memory surfaces named `panel_name`.
pub fn memory_surface_factory(panel_name: impl Into<String>) -> SurfaceFactory {
    let panel_name = panel_name.into();
    Arc::new(move |_| Box::new(MemorySurface::new(panel_name.clone())))
}

/// A started process and the printer streaming it.
#[derive(Debug)]
pub struct SupervisedRun {
    pub process: Arc<ProcessHandle>,
    pub printer: PrinterHandle,
}

/// Entry point for starting, cancelling and observing supervised builds.
pub struct BuildSupervisor {
    settings: Settings,
    registry: Registry,
    coordinator: Arc<Coordinator>,
    events: Arc<EventBus>,
    surfaces: SurfaceFactory,
    killer: Arc<dyn ProcessTreeKiller>,
}

impl BuildSupervisor {
    /// Start the coordinator and an empty registry.
    pub fn new(settings: Settings, surfaces: SurfaceFactory) -> Result<Self, ProcessError> {
        Ok(Self {
            settings,
            registry: Registry::new(),
            coordinator: Arc::new(Coordinator::start()?),
            events: Arc::new(EventBus::new()),
            surfaces,
            killer: default_tree_killer(),
        })
    }

    /// Replace the process-tree killer used for cancellation.
    #[must_use]
    pub fn with_killer(mut self, killer: Arc<dyn ProcessTreeKiller>) -> Self {
        self.killer = killer;
        self
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Spawn `args` for `target` and stream it into the target's sink.
    ///
    /// A spawn failure is returned before anything is registered. When no
    /// printer is active on the sink its previous content is cleared first;
    /// otherwise this run's output queues behind the active printer.
    pub async fn start_supervised_process(
        &self,
        task: impl Into<String>,
        target: TargetId,
        args: Vec<String>,
        cwd: impl Into<PathBuf>,
        env: HashMap<String, String>,
    ) -> Result<SupervisedRun, ProcessError> {
        let task = task.into();
        let process = ProcessHandle::start_with(
            args,
            cwd,
            env,
            StartOptions {
                chunk_size: self.settings.effective_read_chunk_size(),
                killer: Arc::clone(&self.killer),
            },
        )?;
        info!(target_id = %target, task = %task, pid = ?process.pid(), "Supervised process started");

        // Registered before the first await: cancellable while the coordinator is busy
        if let Some(previous) = self.registry.set_process(target, Some(Arc::clone(&process))) {
            if !previous.is_finished() {
                debug!(target_id = %target, "Replaced an unfinished process entry");
            }
        }
        let guard = UnprintedGuard::new(target, Arc::clone(&process));

        let sink = self.sink_for(target);
        let permit = self.reset_for_new_run(&sink).await;

        let printer = ProcessPrinter::spawn(
            Arc::clone(&process),
            sink.clone(),
            permit,
            PrinterConfig {
                target,
                task,
                header_env_vars: self.settings.effective_header_env_vars(),
                topic: self.settings.effective_completion_topic().to_string(),
            },
            Arc::clone(&self.events) as Arc<dyn CompletionEmitter>,
        );
        guard.disarm();
        sink.show();

        Ok(SupervisedRun { process, printer })
    }

    /// Take the printer lock and clear the sink on the coordinator.
    ///
    /// `None` when another printer holds the lock, or the reset could not
    /// run; the new printer then waits for the lock itself.
    async fn reset_for_new_run(&self, sink: &OutputSink) -> Option<PrinterPermit> {
        let Some(permit) = sink.try_acquire_for_printing() else {
            debug!(target_id = %sink.target(), "Printer active, appending to existing output");
            return None;
        };

        let resetting = sink.clone();
        let reset = self
            .coordinator
            .run(move || resetting.reset_with_permit(&permit).map(|()| permit))
            .await;
        match reset {
            Ok(Ok(permit)) => Some(permit),
            Ok(Err(e)) | Err(e) => {
                warn!(target_id = %sink.target(), error = %e, "Could not reset output sink");
                None
            }
        }
    }

    fn sink_for(&self, target: TargetId) -> OutputSink {
        self.registry.get_sink(target, || {
            OutputSink::new(target, (self.surfaces)(target), Arc::clone(&self.coordinator))
        })
    }

    /// Terminate the live process for `target`, if any.
    ///
    /// Returns whether a live process was found and signalled.
    pub fn cancel_supervised_process(&self, target: TargetId) -> bool {
        let Some(process) = self.registry.get_process(target) else {
            return false;
        };
        if !process.terminate() {
            return false;
        }
        self.registry.set_process(target, None);
        info!(target_id = %target, "Supervised process cancelled");
        true
    }

    /// Bring the target's existing output back to the front.
    ///
    /// Returns `false` when nothing was ever printed for `target`.
    pub fn reopen_output(&self, target: TargetId) -> bool {
        match self.registry.existing_sink(target) {
            Some(sink) => {
                sink.show();
                true
            }
            None => false,
        }
    }

    /// Ask whether a running build for `target` should be stopped.
    ///
    /// Returns `true` when the caller should abandon its new run because
    /// the user chose to keep the running one. Accepting terminates the
    /// running process and returns `false`, as does having nothing running.
    pub async fn yield_to_running(
        &self,
        target: TargetId,
        prompt: Arc<dyn PromptSurface>,
    ) -> Result<bool, ProcessError> {
        let Some(process) = self.active_process(target) else {
            return Ok(false);
        };

        let message = format_message(RUNNING_BUILD_PROMPT);
        let stop = self
            .coordinator
            .run(move || prompt.confirm(&message, STOP_RUNNING_LABEL))
            .await?;
        if !stop {
            debug!(target_id = %target, "Keeping running build");
            return Ok(true);
        }

        process.terminate();
        self.registry.set_process(target, None);
        Ok(false)
    }

    /// The registered process for `target` if it has not finished.
    pub fn active_process(&self, target: TargetId) -> Option<Arc<ProcessHandle>> {
        self.registry
            .get_process(target)
            .filter(|process| !process.is_finished())
    }

    /// The target's output sink, if one was ever created.
    pub fn output(&self, target: TargetId) -> Option<OutputSink> {
        self.registry.existing_sink(target)
    }

    /// Subscribe to completion records published on `topic`.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<BuildCompleteEvent> {
        self.events.subscribe(topic)
    }

    /// Subscribe on the configured completion topic.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<BuildCompleteEvent> {
        self.subscribe(self.settings.effective_completion_topic())
    }

    /// Terminate every unfinished process and stop the coordinator.
    pub fn shutdown(&self) {
        for (target, process) in self.registry.active_processes() {
            if process.terminate() {
                info!(target_id = %target, "Terminated on shutdown");
            }
        }
        self.coordinator.shutdown();
    }
}

impl Drop for BuildSupervisor {
    fn drop(&mut self) {
        for (_, process) in self.registry.active_processes() {
            process.terminate();
        }
    }
}

impl fmt::Debug for BuildSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSupervisor")
            .field("targets", &self.registry.targets())
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mockall::mock! {
    pub Prompt {}

    impl PromptSurface for Prompt {
        fn confirm(&self, message: &str, ok_label: &str) -> bool;
        fn input(&self, caption: &str, initial: &str) -> Option<String>;
        fn quick_panel(&self, items: &[String]) -> Option<usize>;
        fn open_url(&self, url: &str);
        fn error_message(&self, message: &str);
    }
}
