//! Completion notification port.
//!
//! Implementations handle transport details (broadcast channels, editor
//! package events, logging).

use crate::events::BuildCompleteEvent;

/// Publishes completion records by topic name.
///
/// # Implementations
///
/// - `NoopEmitter` - For tests and contexts nobody listens to
/// - `EventBus` in `gobuild-runtime` - topic-keyed broadcast channels
pub trait CompletionEmitter: Send + Sync {
    /// Publish `event` on `topic`.
    ///
    /// Delivery happens on the calling thread, at most once per subscriber.
    /// This method should not block.
    fn emit(&self, topic: &str, event: BuildCompleteEvent);
}

/// A no-op emitter that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl CompletionEmitter for NoopEmitter {
    fn emit(&self, _topic: &str, _event: BuildCompleteEvent) {
        // Intentionally do nothing
    }
}
