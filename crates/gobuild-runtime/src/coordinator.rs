//! The single coordinating context.
//!
//! Every presentation-surface mutation and every user prompt runs here, one
//! job at a time, in submission order. It plays the role a UI thread plays in
//! an editor: workers never touch the surface directly, they schedule jobs.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread::{self, JoinHandle, ThreadId};

use gobuild_core::ProcessError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::sync::lock;

const THREAD_NAME: &str = "gobuild-coordinator";

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A dedicated OS thread that executes scheduled jobs sequentially.
pub struct Coordinator {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    thread_id: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Start the coordinator thread.
    pub fn start() -> Result<Self, ProcessError> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    // A panicking job must not take the surface owner down with it
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        error!("Coordinator job panicked");
                    }
                }
                debug!("Coordinator thread exiting");
            })
            .map_err(|e| ProcessError::Coordinator(format!("failed to start thread: {e}")))?;

        let thread_id = handle.thread().id();
        debug!(?thread_id, "Coordinator started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread_id,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue `job` without waiting for it.
    pub fn schedule<F>(&self, job: F) -> Result<(), ProcessError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            return Err(ProcessError::Coordinator(
                "coordinator has been shut down".to_string(),
            ));
        };
        sender
            .send(Box::new(job))
            .map_err(|_| ProcessError::Coordinator("coordinator thread has stopped".to_string()))
    }

    /// Run `job` on the coordinator and wait for its result.
    ///
    /// Runs inline when already on the coordinator thread.
    pub async fn run<F, R>(&self, job: F) -> Result<R, ProcessError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(job());
        }

        let (tx, rx) = oneshot::channel();
        self.schedule(move || {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(job());
        })?;

        rx.await.map_err(|_| {
            ProcessError::Coordinator("job was dropped before completing".to_string())
        })
    }

    /// Whether the caller is running on the coordinator thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stop accepting jobs, let queued ones finish and join the thread.
    ///
    /// Idempotent. When called from the coordinator itself the thread is
    /// left to exit on its own once the queue drains.
    pub fn shutdown(&self) {
        drop(lock(&self.sender).take());

        if self.is_current() {
            return;
        }

        if let Some(handle) = lock(&self.handle).take() {
            if handle.join().is_err() {
                warn!("Coordinator thread panicked during shutdown");
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("thread_id", &self.thread_id)
            .finish_non_exhaustive()
    }
}
