// Copyright 2025 Cowboy AI, LLC.

//! Event broadcast hub
//!
//! Fan-out of ride lifecycle and location events to every connected
//! subscriber. Delivery is at-most-once and best-effort: there is no
//! persistence of missed messages and no replay on reconnect, and a
//! subscriber that falls behind the channel capacity skips the overwritten
//! events. Clients filter by ride and user id themselves - events are
//! broadcast, not addressed.

use crate::events::RideEvent;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// Event publisher trait for the coordinator to emit events
///
/// Publication is fire-and-forget: it never blocks and never fails the
/// mutation that triggered it.
pub trait EventPublisher: Send + Sync {
    /// Publish one ride event to all current subscribers
    fn publish(&self, event: RideEvent);
}

/// Default channel capacity before slow subscribers start skipping events
pub const DEFAULT_HUB_CAPACITY: usize = 256;

/// Broadcast hub over a `tokio::sync::broadcast` channel
///
/// # Examples
///
/// ```rust
/// use ride_dispatch::{BroadcastHub, EventPublisher, RideCompleted, RideEvent, RideId};
///
/// # tokio_test::block_on(async {
/// let hub = BroadcastHub::new(16);
/// let mut events = hub.subscribe();
///
/// hub.publish(RideEvent::Completed(RideCompleted { ride_id: RideId::new() }));
/// let received = events.recv().await.unwrap();
/// assert_eq!(received.event_type(), "ride.completed");
/// # });
/// ```
#[derive(Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<RideEvent>,
}

impl BroadcastHub {
    /// Create a hub with the given per-subscriber buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RideEvent> {
        self.sender.subscribe()
    }

    /// Subscribe as an async stream
    pub fn subscribe_stream(&self) -> BroadcastStream<RideEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl EventPublisher for BroadcastHub {
    fn publish(&self, event: RideEvent) {
        // A send error only means nobody is listening right now; with no
        // replay semantics that is not a failure
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(receivers, "ride event broadcast");
            }
            Err(broadcast::error::SendError(event)) => {
                trace!(
                    event_type = event.event_type(),
                    "no subscribers connected, event dropped"
                );
            }
        }
    }
}

/// Recording publisher for tests
///
/// Captures every published event so assertions can inspect order and
/// payloads without wiring a channel.
#[derive(Clone, Default)]
pub struct MockEventPublisher {
    published: Arc<RwLock<Vec<RideEvent>>>,
}

impl MockEventPublisher {
    /// Create a new recording publisher
    pub fn new() -> Self {
        Self::default()
    }

    /// All events published so far, in publish order
    pub fn published_events(&self) -> Vec<RideEvent> {
        self.published.read().unwrap().clone()
    }

    /// Wire names of all events published so far, in publish order
    pub fn published_event_types(&self) -> Vec<&'static str> {
        self.published
            .read()
            .unwrap()
            .iter()
            .map(RideEvent::event_type)
            .collect()
    }
}

impl EventPublisher for MockEventPublisher {
    fn publish(&self, event: RideEvent) {
        self.published.write().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RideCanceled, RideCompleted};
    use crate::identifiers::RideId;

    fn completed(ride_id: RideId) -> RideEvent {
        RideEvent::Completed(RideCompleted { ride_id })
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let hub = BroadcastHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        let ride_id = RideId::new();
        hub.publish(completed(ride_id));
        hub.publish(RideEvent::Canceled(RideCanceled { ride_id }));

        for receiver in [&mut first, &mut second] {
            assert_eq!(receiver.recv().await.unwrap().event_type(), "ride.completed");
            assert_eq!(receiver.recv().await.unwrap().event_type(), "ride.canceled");
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let hub = BroadcastHub::new(8);
        assert_eq!(hub.subscriber_count(), 0);
        // Must not panic or block
        hub.publish(completed(RideId::new()));
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let hub = BroadcastHub::new(8);
        hub.publish(completed(RideId::new()));

        let mut late = hub.subscribe();
        let ride_id = RideId::new();
        hub.publish(completed(ride_id));

        // Only the event published after subscription arrives
        let event = late.recv().await.unwrap();
        assert_eq!(event.ride_id(), ride_id);
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_overwritten_events() {
        let hub = BroadcastHub::new(2);
        let mut slow = hub.subscribe();

        for _ in 0..5 {
            hub.publish(completed(RideId::new()));
        }

        // The first recv reports the lag; subsequent recvs see the tail
        match slow.recv().await {
            Err(broadcast::error::RecvError::Lagged(skipped)) => assert_eq!(skipped, 3),
            other => panic!("expected lag, got {other:?}"),
        }
        assert!(slow.recv().await.is_ok());
    }

    #[test]
    fn mock_publisher_records_in_order() {
        let publisher = MockEventPublisher::new();
        let ride_id = RideId::new();
        publisher.publish(completed(ride_id));
        publisher.publish(RideEvent::Canceled(RideCanceled { ride_id }));

        assert_eq!(
            publisher.published_event_types(),
            vec!["ride.completed", "ride.canceled"]
        );
        assert_eq!(publisher.published_events()[0].ride_id(), ride_id);
    }
}
