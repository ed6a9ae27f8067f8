//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use raid_core::{RaidEvent, SessionId};
use tokio::sync::broadcast;

use super::types::LifecycleEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Health sync, progress, titles, bindings and participant notices
    Display,
    /// Commands queued into private battles and battle stops
    Battle,
    /// Reward grants
    Reward,
    /// Session start, settlement and removal
    Lifecycle,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Display, Topic::Battle, Topic::Reward, Topic::Lifecycle];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An outbox entry of one session.
    Session { session: SessionId, event: RaidEvent },
    Lifecycle(LifecycleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Session { event, .. } => match event {
                RaidEvent::SyncHealth { .. }
                | RaidEvent::Progress { .. }
                | RaidEvent::Title { .. }
                | RaidEvent::DisplayBound { .. }
                | RaidEvent::DisplayUnbound { .. }
                | RaidEvent::DisplayHidden
                | RaidEvent::Notice { .. } => Topic::Display,
                RaidEvent::Battle { .. } | RaidEvent::StopBattle { .. } => Topic::Battle,
                RaidEvent::Reward { .. } => Topic::Reward,
                RaidEvent::Settled(_) => Topic::Lifecycle,
            },
            Event::Lifecycle(_) => Topic::Lifecycle,
        }
    }

    pub fn session(&self) -> SessionId {
        match self {
            Event::Session { session, .. } => *session,
            Event::Lifecycle(event) => event.session(),
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front and never change.
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created in `with_capacity`; this arm hands out a closed receiver.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
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
    use raid_core::ParticipantId;

    use super::*;

    #[tokio::test]
    async fn routes_events_by_topic() {
        let bus = EventBus::new();
        let mut display = bus.subscribe(Topic::Display);
        let mut rewards = bus.subscribe(Topic::Reward);

        bus.publish(Event::Session {
            session: SessionId(1),
            event: RaidEvent::Progress { ratio: 0.5 },
        });
        bus.publish(Event::Session {
            session: SessionId(1),
            event: RaidEvent::Reward {
                participant: ParticipantId(3),
                won: true,
                specimen: None,
            },
        });

        let event = display.recv().await.expect("display event");
        assert_eq!(event.topic(), Topic::Display);
        let event = rewards.recv().await.expect("reward event");
        assert_eq!(event.topic(), Topic::Reward);
        assert!(display.try_recv().is_err());
    }
}
