//! `/api/rooms` handlers.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use askroom_store::RoomRepo;

use crate::errors::ApiError;
use crate::server::AppState;

/// Request body for `POST /api/rooms`.
#[derive(Debug, Deserialize)]
pub struct CreateRoomBody {
    /// The room's theme / topic.
    pub theme: String,
}

/// Response body carrying a created entity's ID.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// The new entity's ID.
    pub id: String,
}

/// One room in the `GET /api/rooms` listing.
#[derive(Debug, Serialize)]
pub struct RoomSummary {
    /// Room ID.
    pub id: String,
    /// The room's theme.
    pub theme: String,
}

/// `POST /api/rooms` — create a room.
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomBody>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let conn = state.conn()?;
    let room = RoomRepo::create(&conn, &body.theme)?;
    info!(room_id = %room.id, "room created");
    Ok(Json(CreatedResponse { id: room.id }))
}

/// `GET /api/rooms` — list all rooms.
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomSummary>>, ApiError> {
    let conn = state.conn()?;
    let rooms = RoomRepo::list(&conn)?
        .into_iter()
        .map(|r| RoomSummary {
            id: r.id,
            theme: r.theme,
        })
        .collect();
    Ok(Json(rooms))
}
