//! Per-room registry of live observer connections.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use askroom_core::{RoomId, SubscriberId};

use super::subscriber::Subscriber;

/// Tracks which observers are watching which room.
///
/// A single mutex guards the whole map. Holders never perform I/O under the
/// lock: the dispatcher takes a [`snapshot`](Self::snapshot) and writes
/// outside it.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, HashMap<SubscriberId, Subscriber>>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscriber under a room, creating the room's set on first
    /// use.
    pub fn register(&self, room: RoomId, subscriber: Subscriber) {
        let mut rooms = self.rooms.lock();
        let _ = rooms
            .entry(room)
            .or_default()
            .insert(subscriber.id(), subscriber);
        debug!(%room, "observer registered");
    }

    /// Remove a subscriber from a room.
    ///
    /// A no-op when the room or subscriber is already gone, so the
    /// dispatcher's eviction and the connection task's cleanup can race
    /// safely. Empty room sets are dropped.
    pub fn deregister(&self, room: &RoomId, id: SubscriberId) {
        let mut rooms = self.rooms.lock();
        if let Some(set) = rooms.get_mut(room) {
            if set.remove(&id).is_some() {
                debug!(%room, "observer deregistered");
            }
            if set.is_empty() {
                let _ = rooms.remove(room);
            }
        }
    }

    /// Clone the current set of subscribers for a room.
    ///
    /// Empty for unknown rooms. The clone decouples fan-out writes from the
    /// lock.
    pub fn snapshot(&self, room: &RoomId) -> Vec<Subscriber> {
        let rooms = self.rooms.lock();
        rooms
            .get(room)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Cancel every subscriber and clear the registry (graceful shutdown).
    pub fn drain(&self) {
        let drained: Vec<Subscriber> = {
            let mut rooms = self.rooms.lock();
            rooms.drain().flat_map(|(_, set)| set.into_values()).collect()
        };
        for sub in &drained {
            sub.cancel();
        }
        debug!(count = drained.len(), "registry drained");
    }

    /// Total live connections across all rooms.
    pub fn connection_count(&self) -> usize {
        self.rooms.lock().values().map(HashMap::len).sum()
    }

    /// Number of rooms with at least one observer.
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
