//! Topic-keyed completion broadcasting.

use std::collections::HashMap;
use std::sync::Mutex;

use gobuild_core::{BuildCompleteEvent, CompletionEmitter};
use tokio::sync::broadcast;
use tracing::debug;

use crate::sync::lock;

/// Broadcast channel capacity per topic
const CHANNEL_CAPACITY: usize = 64;

/// Publish/subscribe bus for completion records.
///
/// Each topic gets its own broadcast channel, created on first use. Every
/// subscriber sees each event published after it subscribed at most once;
/// a subscriber that falls more than `CHANNEL_CAPACITY` events behind
/// misses the oldest ones.
#[derive(Debug, Default)]
pub struct EventBus {
    topics: Mutex<HashMap<String, broadcast::Sender<BuildCompleteEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<BuildCompleteEvent> {
        lock(&self.topics)
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish `event` on `topic`. Returns how many subscribers received it.
    pub fn publish(&self, topic: &str, event: BuildCompleteEvent) -> usize {
        let sender = self.sender(topic);
        // No subscribers: nothing to deliver, skip the send
        if sender.receiver_count() == 0 {
            return 0;
        }
        debug!(topic, task = %event.task, result = %event.result, "Publishing completion");
        sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published on `topic` from now on.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<BuildCompleteEvent> {
        self.sender(topic).subscribe()
    }

    /// Number of live subscribers on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.topics)
            .get(topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl CompletionEmitter for EventBus {
    fn emit(&self, topic: &str, event: BuildCompleteEvent) {
        self.publish(topic, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gobuild_core::{ProcessOutcome, TargetId};
    use std::path::PathBuf;
    use std::time::Duration;

    fn event(result: ProcessOutcome) -> BuildCompleteEvent {
        BuildCompleteEvent {
            target: TargetId(1),
            task: "test".to_string(),
            args: vec!["go".to_string(), "test".to_string()],
            working_dir: PathBuf::from("/src"),
            env: HashMap::new(),
            started_at: Utc::now(),
            runtime: Duration::from_millis(10),
            result,
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_their_topic_only() {
        let bus = EventBus::new();
        let mut builds = bus.subscribe("build_complete");
        let mut other = bus.subscribe("lint_complete");

        assert_eq!(bus.publish("build_complete", event(ProcessOutcome::Error)), 1);

        let received = builds.recv().await.unwrap();
        assert_eq!(received.result, ProcessOutcome::Error);
        assert!(matches!(
            other.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.publish("build_complete", event(ProcessOutcome::Success)), 0);
        assert_eq!(bus.subscriber_count("build_complete"), 0);
        assert_eq!(bus.subscriber_count("never_used"), 0);
    }

    #[test]
    fn test_each_subscriber_gets_one_copy() {
        let bus = EventBus::new();
        let mut a = bus.subscribe("build_complete");
        let mut b = bus.subscribe("build_complete");
        assert_eq!(bus.subscriber_count("build_complete"), 2);

        bus.emit("build_complete", event(ProcessOutcome::Cancelled));

        assert_eq!(a.try_recv().unwrap().result, ProcessOutcome::Cancelled);
        assert_eq!(b.try_recv().unwrap().result, ProcessOutcome::Cancelled);
        assert!(a.try_recv().is_err());
        assert!(b.try_recv().is_err());
    }
}
