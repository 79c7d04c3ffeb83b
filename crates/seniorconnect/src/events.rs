//! Change notifications for the presentation layer.
//!
//! Stores and the call manager publish an [`Event`] after every state change.
//! Nothing in the core depends on anyone listening: publishing with no
//! subscribers is not an error, and a subscriber that falls behind only loses
//! its own backlog.

use tokio::sync::broadcast;
use tracing::trace;

use crate::call::{CallState, SessionId};
use crate::models::{HelpRequest, User};

/// Number of events buffered per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// A state change the presentation layer may want to re-render for.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The stored user was created, updated or cleared.
    UserChanged(Option<User>),
    /// The logged-in flag changed.
    LoginChanged(bool),
    /// The volunteer list changed; carries the new length.
    VolunteersChanged {
        /// Number of volunteers after the change.
        count: usize,
    },
    /// A call session moved to a new state.
    CallStateChanged {
        /// Session the change belongs to.
        session: SessionId,
        /// The state just entered.
        state: CallState,
    },
    /// A help request was submitted.
    HelpRequested(HelpRequest),
}

/// Cloneable handle for publishing and subscribing to [`Event`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, event: Event) {
        if self.sender.send(event).is_err() {
            trace!("No subscribers for event");
        }
    }

    /// Start receiving events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain every event currently queued on a receiver.
#[cfg(test)]
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(Event::LoginChanged(true));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(Event::LoginChanged(true));
        bus.publish(Event::VolunteersChanged { count: 3 });

        assert_eq!(
            drain(&mut rx),
            vec![
                Event::LoginChanged(true),
                Event::VolunteersChanged { count: 3 }
            ]
        );
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(Event::LoginChanged(false));
        assert_eq!(drain(&mut rx), vec![Event::LoginChanged(false)]);
        assert_eq!(clone.subscriber_count(), 1);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.publish(Event::LoginChanged(true));
        let mut rx = bus.subscribe();
        assert!(drain(&mut rx).is_empty());
    }
}
