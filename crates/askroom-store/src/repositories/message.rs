//! Message repository — CRUD and reaction counters for the `messages` table.
//!
//! Reaction updates use `RETURNING` so the caller gets the exact post-update
//! count in the same statement; that value is what gets broadcast.

use askroom_core::{MessageId, RoomId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::row_types::MessageRow;

/// Message repository — stateless, every method takes `&Connection`.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a new message into a room.
    pub fn create(conn: &Connection, room_id: &RoomId, message: &str) -> Result<MessageRow> {
        let id = MessageId::new().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO messages (id, room_id, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, room_id.to_string(), message, now],
        )?;
        Ok(MessageRow {
            id,
            room_id: room_id.to_string(),
            message: message.to_owned(),
            reaction_count: 0,
            answered: false,
            created_at: now,
        })
    }

    /// Get a message by ID.
    pub fn get_by_id(conn: &Connection, message_id: &MessageId) -> Result<Option<MessageRow>> {
        let row = conn
            .query_row(
                "SELECT id, room_id, message, reaction_count, answered, created_at
                 FROM messages WHERE id = ?1",
                params![message_id.to_string()],
                map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List all messages in a room, oldest first.
    pub fn list_for_room(conn: &Connection, room_id: &RoomId) -> Result<Vec<MessageRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, room_id, message, reaction_count, answered, created_at
             FROM messages WHERE room_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt
            .query_map(params![room_id.to_string()], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Check if a message exists.
    pub fn exists(conn: &Connection, message_id: &MessageId) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM messages WHERE id = ?1)",
            params![message_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Increment a message's reaction count.
    ///
    /// Returns the updated count, or `None` if the message doesn't exist.
    pub fn add_reaction(conn: &Connection, message_id: &MessageId) -> Result<Option<i64>> {
        let count = conn
            .query_row(
                "UPDATE messages SET reaction_count = reaction_count + 1
                 WHERE id = ?1 RETURNING reaction_count",
                params![message_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count)
    }

    /// Decrement a message's reaction count, clamped at zero.
    ///
    /// Returns the updated count, or `None` if the message doesn't exist.
    pub fn remove_reaction(conn: &Connection, message_id: &MessageId) -> Result<Option<i64>> {
        let count = conn
            .query_row(
                "UPDATE messages SET reaction_count = MAX(reaction_count - 1, 0)
                 WHERE id = ?1 RETURNING reaction_count",
                params![message_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count)
    }

    /// Mark a message as answered. Returns `true` if a row was updated.
    pub fn mark_answered(conn: &Connection, message_id: &MessageId) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE messages SET answered = 1 WHERE id = ?1",
            params![message_id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        room_id: row.get(1)?,
        message: row.get(2)?,
        reaction_count: row.get(3)?,
        answered: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
