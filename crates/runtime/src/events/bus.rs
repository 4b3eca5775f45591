//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::RaidEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Planning, roster, scheduling and cancellation
    Lifecycle,
    /// Terminal results, resolved or recorded
    Resolution,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::Lifecycle, Topic::Resolution];
}

impl RaidEvent {
    pub fn topic(&self) -> Topic {
        match self {
            RaidEvent::Planned { .. }
            | RaidEvent::Joined { .. }
            | RaidEvent::Left { .. }
            | RaidEvent::Scheduled { .. }
            | RaidEvent::Cancelled { .. } => Topic::Lifecycle,
            RaidEvent::Resolved(_) | RaidEvent::Recorded(_) => Topic::Resolution,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front and never change.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<RaidEvent>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    fn sender(&self, topic: Topic) -> Option<&broadcast::Sender<RaidEvent>> {
        self.channels.get(&topic)
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: RaidEvent) {
        let topic = event.topic();
        if let Some(tx) = self.sender(topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<RaidEvent> {
        match self.sender(topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created in the constructor.
            None => broadcast::channel(1).1,
        }
    }

}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use raid_core::{CharacterId, RaidId, Role};

    use super::*;

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut resolution = bus.subscribe(Topic::Resolution);

        bus.publish(RaidEvent::Joined {
            raid: RaidId(1),
            character: CharacterId(2),
            role: Role::Scout,
        });

        let event = lifecycle.recv().await.unwrap();
        assert_eq!(event.raid(), RaidId(1));
        assert!(resolution.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(RaidEvent::Left {
            raid: RaidId(3),
            character: CharacterId(4),
        });
    }
}
