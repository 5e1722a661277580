//! In-process publish/subscribe for room events.

use std::future::Future;

use dashmap::DashMap;
use platepick_protocol::RoomEvent;
use tokio::sync::broadcast;

/// Default per-topic buffer before slow subscribers start lagging.
pub const DEFAULT_TOPIC_CAPACITY: usize = 256;

/// Errors a bus may report on publish.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The bus could not accept the event at all.
    #[error("message bus unavailable: {0}")]
    Unavailable(String),
}

/// Where the session engine sends room events.
///
/// A publish with nobody listening is not an error; implementations
/// report how many subscribers the event reached.
pub trait MessageBus: Send + Sync + 'static {
    fn publish(
        &self,
        topic: &str,
        event: RoomEvent,
    ) -> impl Future<Output = Result<usize, BusError>> + Send;
}

/// One `broadcast` channel per topic, created on first subscribe.
///
/// Every subscriber sees every event published after it subscribed, in
/// publish order. A subscriber that falls more than the topic capacity
/// behind loses the oldest events and is told how many it missed.
#[derive(Debug)]
pub struct TopicBus {
    topics: DashMap<String, broadcast::Sender<RoomEvent>>,
    capacity: usize,
}

impl Default for TopicBus {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

impl TopicBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Starts receiving events for `topic`.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<RoomEvent> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Forgets `topic` if nobody listens to it any more.
    pub fn release(&self, topic: &str) {
        let removed = self
            .topics
            .remove_if(topic, |_, sender| sender.receiver_count() == 0);
        if removed.is_some() {
            tracing::debug!(%topic, "topic released");
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map_or(0, |sender| sender.receiver_count())
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl MessageBus for TopicBus {
    async fn publish(&self, topic: &str, event: RoomEvent) -> Result<usize, BusError> {
        let sender = match self.topics.get(topic) {
            Some(sender) => sender.clone(),
            None => {
                tracing::debug!(%topic, kind = event.kind(), "no subscribers for topic");
                return Ok(0);
            }
        };
        // send only fails when every receiver is gone
        Ok(sender.send(event).unwrap_or(0))
    }
}
