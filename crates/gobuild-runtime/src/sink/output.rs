//! Per-target output sink.
//!
//! Producers on any thread enqueue writes; the coordinator applies them to the
//! presentation surface in enqueue order, each one whole. A separate printer
//! admission lock keeps a single `ProcessPrinter` on the sink at a time.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gobuild_core::{PresentationSurface, ProcessError, TargetId};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, oneshot};
use tracing::{debug, error, warn};

use crate::coordinator::Coordinator;
use crate::sync::lock;

struct PendingWrite {
    text: String,
    separator: Option<String>,
    done: Option<oneshot::Sender<()>>,
}

struct SinkInner {
    target: TargetId,
    coordinator: Arc<Coordinator>,
    surface: Mutex<Box<dyn PresentationSurface>>,
    queue: Mutex<VecDeque<PendingWrite>>,
    printer_lock: Arc<AsyncMutex<()>>,
}

impl SinkInner {
    /// Apply every queued write. Coordinator only.
    fn process_queue(&self) {
        let pending: Vec<PendingWrite> = lock(&self.queue).drain(..).collect();
        if pending.is_empty() {
            return;
        }

        let mut surface = lock(&self.surface);
        for write in pending {
            if let Some(separator) = write.separator.as_deref() {
                if surface.size() > 0 && !surface.ends_with(separator) {
                    surface.append(separator);
                }
            }
            surface.append(&write.text);

            if let Some(done) = write.done {
                if done.send(()).is_err() {
                    debug!(target_id = %self.target, "Write waiter went away before confirmation");
                }
            }
        }
    }
}

/// Proof of holding a sink's printer admission lock.
///
/// Released on drop or via [`release`](Self::release).
pub struct PrinterPermit {
    guard: OwnedMutexGuard<()>,
    target: TargetId,
}

impl PrinterPermit {
    pub const fn target(&self) -> TargetId {
        self.target
    }

    fn belongs_to(&self, lock: &Arc<AsyncMutex<()>>) -> bool {
        Arc::ptr_eq(OwnedMutexGuard::mutex(&self.guard), lock)
    }

    pub fn release(self) {
        debug!(target_id = %self.target, "Printer lock released");
    }
}

impl fmt::Debug for PrinterPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterPermit")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// A reusable, append-only output panel for one target.
///
/// Cheap to clone; clones share the same surface, queue and lock.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<SinkInner>,
}

impl OutputSink {
    pub fn new(
        target: TargetId,
        surface: Box<dyn PresentationSurface>,
        coordinator: Arc<Coordinator>,
    ) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                target,
                coordinator,
                surface: Mutex::new(surface),
                queue: Mutex::new(VecDeque::new()),
                printer_lock: Arc::new(AsyncMutex::new(())),
            }),
        }
    }

    pub fn target(&self) -> TargetId {
        self.inner.target
    }

    /// Queue a write. Callable from any thread.
    ///
    /// When `separator` is given and the surface already has content that does
    /// not end with it, the separator is written first. `done` fires once this
    /// write has been applied; it is dropped unfired if the write is discarded.
    pub fn write(
        &self,
        text: impl Into<String>,
        separator: Option<&str>,
        done: Option<oneshot::Sender<()>>,
    ) {
        lock(&self.inner.queue).push_back(PendingWrite {
            text: text.into(),
            separator: separator.map(ToString::to_string),
            done,
        });

        let inner = Arc::clone(&self.inner);
        if let Err(e) = self.inner.coordinator.schedule(move || inner.process_queue()) {
            warn!(target_id = %self.inner.target, error = %e, "Discarding queued output");
            lock(&self.inner.queue).clear();
        }
    }

    /// Queue a write with no separator.
    pub fn append(&self, text: impl Into<String>) {
        self.write(text, None, None);
    }

    /// Queue a write and wait until it has been applied.
    ///
    /// Returns `false` if the write was discarded instead.
    pub async fn write_and_wait(&self, text: impl Into<String>, separator: Option<&str>) -> bool {
        let (tx, rx) = oneshot::channel();
        self.write(text, separator, Some(tx));
        rx.await.is_ok()
    }

    /// Wait for the printer admission lock.
    pub async fn acquire_for_printing(&self) -> PrinterPermit {
        let guard = Arc::clone(&self.inner.printer_lock).lock_owned().await;
        debug!(target_id = %self.inner.target, "Printer lock acquired");
        PrinterPermit {
            guard,
            target: self.inner.target,
        }
    }

    /// Take the printer admission lock if nobody holds it.
    pub fn try_acquire_for_printing(&self) -> Option<PrinterPermit> {
        let guard = Arc::clone(&self.inner.printer_lock).try_lock_owned().ok()?;
        Some(PrinterPermit {
            guard,
            target: self.inner.target,
        })
    }

    /// Whether a printer currently holds the admission lock.
    pub fn is_printing(&self) -> bool {
        self.inner.printer_lock.try_lock().is_err()
    }

    /// Clear the surface and pending writes if no printer holds the lock.
    ///
    /// Coordinator only. Returns `Ok(false)` and keeps the content when a
    /// printer is active, so its output keeps accumulating.
    pub fn reset(&self) -> Result<bool, ProcessError> {
        self.ensure_coordinator("OutputSink::reset")?;

        let Ok(_free) = self.inner.printer_lock.try_lock() else {
            debug!(target_id = %self.inner.target, "Printer active, keeping existing output");
            return Ok(false);
        };
        self.clear();
        Ok(true)
    }

    /// Clear the surface and pending writes while holding the printer lock.
    ///
    /// Coordinator only. Lets a caller reset and then start printing without
    /// another printer slipping in between.
    pub fn reset_with_permit(&self, permit: &PrinterPermit) -> Result<(), ProcessError> {
        self.ensure_coordinator("OutputSink::reset_with_permit")?;

        let owned = permit.belongs_to(&self.inner.printer_lock);
        debug_assert!(owned, "printer permit belongs to another sink");
        if !owned {
            error!(
                target_id = %self.inner.target,
                permit = %permit.target,
                "Reset with foreign printer permit"
            );
            return Err(ProcessError::Internal(
                "printer permit belongs to another sink".to_string(),
            ));
        }
        self.clear();
        Ok(())
    }

    fn ensure_coordinator(&self, op: &'static str) -> Result<(), ProcessError> {
        if self.inner.coordinator.is_current() {
            Ok(())
        } else {
            error!(target_id = %self.inner.target, op, "Called off the coordinating context");
            Err(ProcessError::WrongContext(op))
        }
    }

    fn clear(&self) {
        // Dropping pending writes drops their completion senders, waking waiters
        let discarded = std::mem::take(&mut *lock(&self.inner.queue));
        lock(&self.inner.surface).clear();
        debug!(target_id = %self.inner.target, discarded = discarded.len(), "Output sink reset");
    }

    /// Record the directory result paths resolve against.
    pub fn set_base_dir(&self, dir: &Path) {
        let inner = Arc::clone(&self.inner);
        let dir = dir.to_path_buf();
        if let Err(e) = self
            .inner
            .coordinator
            .schedule(move || lock(&inner.surface).set_base_dir(&dir))
        {
            warn!(target_id = %self.inner.target, error = %e, "Could not set output base directory");
        }
    }

    /// Bring the surface to the front.
    pub fn show(&self) {
        let inner = Arc::clone(&self.inner);
        if let Err(e) = self
            .inner
            .coordinator
            .schedule(move || lock(&inner.surface).show())
        {
            warn!(target_id = %self.inner.target, error = %e, "Could not show output");
        }
    }

    /// Applied content length in characters.
    pub fn content_len(&self) -> usize {
        lock(&self.inner.surface).size()
    }

    /// Copy of the applied content.
    pub fn contents(&self) -> String {
        lock(&self.inner.surface).snapshot()
    }

    pub fn base_dir(&self) -> Option<PathBuf> {
        lock(&self.inner.surface).base_dir()
    }

    /// Wait until every write queued before this call has been applied.
    pub async fn flush(&self) -> bool {
        self.write_and_wait(String::new(), None).await
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("target", &self.inner.target)
            .field("printing", &self.is_printing())
            .finish_non_exhaustive()
    }
}
