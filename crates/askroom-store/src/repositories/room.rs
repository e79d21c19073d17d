//! Room repository — CRUD for the `rooms` table.

use askroom_core::RoomId;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::row_types::RoomRow;

/// Room repository — stateless, every method takes `&Connection`.
pub struct RoomRepo;

impl RoomRepo {
    /// Create a new room with the given theme.
    pub fn create(conn: &Connection, theme: &str) -> Result<RoomRow> {
        let id = RoomId::new().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO rooms (id, theme, created_at) VALUES (?1, ?2, ?3)",
            params![id, theme, now],
        )?;
        Ok(RoomRow {
            id,
            theme: theme.to_owned(),
            created_at: now,
        })
    }

    /// Get room by ID.
    pub fn get_by_id(conn: &Connection, room_id: &RoomId) -> Result<Option<RoomRow>> {
        let row = conn
            .query_row(
                "SELECT id, theme, created_at FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| {
                    Ok(RoomRow {
                        id: row.get(0)?,
                        theme: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// List all rooms, oldest first.
    pub fn list(conn: &Connection) -> Result<Vec<RoomRow>> {
        let mut stmt =
            conn.prepare("SELECT id, theme, created_at FROM rooms ORDER BY created_at ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RoomRow {
                    id: row.get(0)?,
                    theme: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Check if a room exists.
    pub fn exists(conn: &Connection, room_id: &RoomId) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?1)",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
