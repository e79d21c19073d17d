//! Event fan-out to a room's live observers.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use askroom_core::{RoomEvent, RoomId};

use super::registry::RoomRegistry;
use crate::metrics::{EVENTS_PUBLISHED_TOTAL, WS_DELIVERY_FAILURES_TOTAL};

/// Pushes room events to every observer of a room.
///
/// Delivery is best-effort: no retry, no buffering beyond each observer's
/// channel, no ordering across connections. A failed write evicts that one
/// observer and the fan-out continues.
pub struct EventDispatcher {
    registry: Arc<RoomRegistry>,
}

impl EventDispatcher {
    /// Create a dispatcher over the given registry.
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Publish an event to every observer of `room`.
    ///
    /// A no-op when the room has no observers. The event is serialized once
    /// and the shared string fanned out; sends happen outside the registry
    /// lock. An observer whose channel is full or closed is cancelled and
    /// deregistered before this call returns, so it cannot receive a later
    /// publish.
    pub fn publish(&self, room: &RoomId, event: &RoomEvent) {
        let recipients = self.registry.snapshot(room);
        if recipients.is_empty() {
            return;
        }

        let json = match serde_json::to_string(event) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(kind = event.kind(), error = %e, "failed to serialize event");
                return;
            }
        };

        counter!(EVENTS_PUBLISHED_TOTAL, "kind" => event.kind()).increment(1);
        debug!(
            kind = event.kind(),
            %room,
            recipients = recipients.len(),
            "broadcast event to room"
        );

        for sub in recipients {
            if !sub.send(json.clone()) {
                warn!(kind = event.kind(), %room, "failed to send event, evicting observer");
                counter!(WS_DELIVERY_FAILURES_TOTAL, "kind" => event.kind()).increment(1);
                sub.cancel();
                self.registry.deregister(room, sub.id());
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::subscriber::Subscriber;
    use askroom_core::MessageId;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn make_subscriber(buffer: usize) -> (Subscriber, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Subscriber::new(tx, CancellationToken::new()), rx)
    }

    fn make_dispatcher() -> (EventDispatcher, Arc<RoomRegistry>) {
        let registry = Arc::new(RoomRegistry::new());
        (EventDispatcher::new(registry.clone()), registry)
    }

    fn created(text: &str) -> RoomEvent {
        RoomEvent::MessageCreated {
            id: MessageId::new(),
            message: text.into(),
        }
    }

    #[tokio::test]
    async fn publish_to_empty_room_is_noop() {
        let (dispatcher, _registry) = make_dispatcher();
        // Should not panic
        dispatcher.publish(&RoomId::new(), &created("nobody listening"));
    }

    #[tokio::test]
    async fn publish_reaches_all_room_observers() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (sub_1, mut rx_1) = make_subscriber(8);
        let (sub_2, mut rx_2) = make_subscriber(8);
        registry.register(room, sub_1);
        registry.register(room, sub_2);

        dispatcher.publish(&room, &created("hello"));

        assert!(rx_1.try_recv().is_ok());
        assert!(rx_2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn publish_is_scoped_to_room() {
        let (dispatcher, registry) = make_dispatcher();
        let room_a = RoomId::new();
        let room_b = RoomId::new();
        let (sub_a, mut rx_a) = make_subscriber(8);
        let (sub_b, mut rx_b) = make_subscriber(8);
        registry.register(room_a, sub_a);
        registry.register(room_b, sub_b);

        dispatcher.publish(&room_a, &created("only room a"));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn serialized_payload_is_shared() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (sub_1, mut rx_1) = make_subscriber(8);
        let (sub_2, mut rx_2) = make_subscriber(8);
        registry.register(room, sub_1);
        registry.register(room, sub_2);

        dispatcher.publish(&room, &created("shared"));

        let a = rx_1.recv().await.unwrap();
        let b = rx_2.recv().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn payload_has_wire_shape() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (sub, mut rx) = make_subscriber(8);
        registry.register(room, sub);

        let id = MessageId::new();
        dispatcher.publish(
            &room,
            &RoomEvent::MessageCreated {
                id,
                message: "Hello".into(),
            },
        );

        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["kind"], "message_created");
        assert_eq!(parsed["value"]["id"], id.to_string());
        assert_eq!(parsed["value"]["message"], "Hello");
    }

    #[tokio::test]
    async fn failed_send_evicts_only_that_observer() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        // rx dropped immediately: every send fails
        let (broken, _) = make_subscriber(1);
        let broken_watch = broken.clone();
        let (healthy, mut rx) = make_subscriber(8);
        registry.register(room, broken);
        registry.register(room, healthy);

        dispatcher.publish(&room, &created("first"));

        assert!(broken_watch.is_cancelled());
        assert_eq!(registry.connection_count(), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn evicted_observer_misses_next_publish() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (broken, _) = make_subscriber(1);
        registry.register(room, broken);

        dispatcher.publish(&room, &created("first"));
        assert_eq!(registry.connection_count(), 0);

        // Second publish sees an empty room
        dispatcher.publish(&room, &created("second"));
    }

    #[tokio::test]
    async fn full_channel_counts_as_failure() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (slow, mut rx) = make_subscriber(1);
        registry.register(room, slow);

        dispatcher.publish(&room, &created("fills the buffer"));
        dispatcher.publish(&room, &created("overflows"));

        // First landed, second evicted the observer
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn sequential_publishes_arrive_in_order() {
        let (dispatcher, registry) = make_dispatcher();
        let room = RoomId::new();
        let (sub, mut rx) = make_subscriber(8);
        registry.register(room, sub);

        for i in 0..5 {
            dispatcher.publish(&room, &created(&format!("msg_{i}")));
        }

        for i in 0..5 {
            let msg = rx.recv().await.unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
            assert_eq!(parsed["value"]["message"], format!("msg_{i}"));
        }
    }

    #[tokio::test]
    async fn concurrent_publish_and_register() {
        let (dispatcher, registry) = make_dispatcher();
        let dispatcher = Arc::new(dispatcher);
        let room = RoomId::new();

        let publisher = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    dispatcher.publish(&room, &created("spin"));
                    tokio::task::yield_now().await;
                }
            })
        };

        let churner = {
            let registry = registry.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    let (sub, _rx) = make_subscriber(1);
                    let id = sub.id();
                    registry.register(room, sub);
                    registry.deregister(&room, id);
                    tokio::task::yield_now().await;
                }
            })
        };

        publisher.await.unwrap();
        churner.await.unwrap();
    }
}
