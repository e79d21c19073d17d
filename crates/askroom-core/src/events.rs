//! Room events pushed to live observers.
//!
//! An event describes one state change inside a room. Events are transient:
//! they are serialized once per publish, fanned out to every observer of the
//! room, and never persisted. The room they belong to is routing metadata
//! carried separately and never appears in the payload.

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// A state change inside a room.
///
/// Serializes as `{"kind": <tag>, "value": <payload>}` on the wire, e.g.
/// `{"kind":"message_created","value":{"id":"...","message":"Hello"}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new message was posted.
    MessageCreated {
        /// The new message's ID.
        id: MessageId,
        /// The message text.
        message: String,
    },
    /// A message's reaction count went up.
    MessageReactionIncreased {
        /// The reacted message's ID.
        id: MessageId,
        /// The count after the increment.
        count: i64,
    },
    /// A message's reaction count went down.
    MessageReactionDecreased {
        /// The un-reacted message's ID.
        id: MessageId,
        /// The count after the decrement.
        count: i64,
    },
    /// A message was marked as answered.
    MessageAnswered {
        /// The answered message's ID.
        id: MessageId,
    },
}

impl RoomEvent {
    /// The wire tag for this event, for logging and metrics labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "message_created",
            Self::MessageReactionIncreased { .. } => "message_reaction_increased",
            Self::MessageReactionDecreased { .. } => "message_reaction_decreased",
            Self::MessageAnswered { .. } => "message_answered",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
