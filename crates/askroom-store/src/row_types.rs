//! Row structs mirroring the database tables.

use serde::Serialize;

/// A row from the `rooms` table.
#[derive(Clone, Debug, Serialize)]
pub struct RoomRow {
    /// Room ID (UUID string).
    pub id: String,
    /// The room's theme / topic.
    pub theme: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A row from the `messages` table.
#[derive(Clone, Debug, Serialize)]
pub struct MessageRow {
    /// Message ID (UUID string).
    pub id: String,
    /// Owning room ID (UUID string).
    pub room_id: String,
    /// The message text.
    pub message: String,
    /// Current reaction count (never negative).
    pub reaction_count: i64,
    /// Whether the message has been marked answered.
    pub answered: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}
