//! `/api/rooms/{room_id}/messages` handlers.
//!
//! Path IDs are validated room-first: a malformed ID is a 400, a missing
//! room or message a 404, before any mutation runs.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use askroom_core::{MessageId, RoomEvent, RoomId};
use askroom_store::{MessageRepo, MessageRow, RoomRepo};

use super::rooms::CreatedResponse;
use crate::errors::ApiError;
use crate::server::AppState;

/// Request body for `POST /api/rooms/{room_id}/messages`.
#[derive(Debug, Deserialize)]
pub struct CreateMessageBody {
    /// The message text.
    pub message: String,
}

/// A message as returned by the read endpoints.
#[derive(Debug, Serialize)]
pub struct MessageView {
    /// Message ID.
    pub id: String,
    /// Owning room ID.
    pub room_id: String,
    /// The message text.
    pub message: String,
    /// Current reaction count.
    pub reaction_count: i64,
    /// Whether the message was marked answered.
    pub answered: bool,
}

impl From<MessageRow> for MessageView {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            message: row.message,
            reaction_count: row.reaction_count,
            answered: row.answered,
        }
    }
}

/// Response body carrying an updated reaction count.
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    /// The count after the update.
    pub count: i64,
}

fn parse_room(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::parse(raw).map_err(|_| ApiError::InvalidId(raw.to_owned()))
}

fn parse_message(raw: &str) -> Result<MessageId, ApiError> {
    MessageId::parse(raw).map_err(|_| ApiError::InvalidId(raw.to_owned()))
}

fn ensure_room(conn: &askroom_store::PooledConnection, room: &RoomId) -> Result<(), ApiError> {
    if RoomRepo::exists(conn, room)? {
        Ok(())
    } else {
        Err(ApiError::RoomNotFound)
    }
}

/// `POST /api/rooms/{room_id}/messages` — post a message into a room.
pub async fn create_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<CreateMessageBody>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let room = parse_room(&room_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    let row = MessageRepo::create(&conn, &room, &body.message)?;
    drop(conn);
    info!(room_id = %room, message_id = %row.id, "message created");

    let id = MessageId::parse(&row.id).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.dispatcher.publish(
        &room,
        &RoomEvent::MessageCreated {
            id,
            message: row.message.clone(),
        },
    );

    Ok(Json(CreatedResponse { id: row.id }))
}

/// `GET /api/rooms/{room_id}/messages` — list a room's messages.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let room = parse_room(&room_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    let messages = MessageRepo::list_for_room(&conn, &room)?
        .into_iter()
        .map(MessageView::from)
        .collect();
    Ok(Json(messages))
}

/// `GET /api/rooms/{room_id}/messages/{message_id}` — fetch one message.
pub async fn get_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<MessageView>, ApiError> {
    let room = parse_room(&room_id)?;
    let message = parse_message(&message_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    let row = MessageRepo::get_by_id(&conn, &message)?.ok_or(ApiError::MessageNotFound)?;
    Ok(Json(row.into()))
}

/// `PATCH /api/rooms/{room_id}/messages/{message_id}/react` — add a reaction.
pub async fn add_reaction(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<ReactionResponse>, ApiError> {
    let room = parse_room(&room_id)?;
    let message = parse_message(&message_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    let count = MessageRepo::add_reaction(&conn, &message)?.ok_or(ApiError::MessageNotFound)?;
    drop(conn);

    state.dispatcher.publish(
        &room,
        &RoomEvent::MessageReactionIncreased { id: message, count },
    );

    Ok(Json(ReactionResponse { count }))
}

/// `DELETE /api/rooms/{room_id}/messages/{message_id}/react` — remove a
/// reaction. The count never goes below zero.
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<ReactionResponse>, ApiError> {
    let room = parse_room(&room_id)?;
    let message = parse_message(&message_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    let count = MessageRepo::remove_reaction(&conn, &message)?.ok_or(ApiError::MessageNotFound)?;
    drop(conn);

    state.dispatcher.publish(
        &room,
        &RoomEvent::MessageReactionDecreased { id: message, count },
    );

    Ok(Json(ReactionResponse { count }))
}

/// `PATCH /api/rooms/{room_id}/messages/{message_id}/answer` — mark a
/// message answered.
pub async fn mark_answered(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let room = parse_room(&room_id)?;
    let message = parse_message(&message_id)?;
    let conn = state.conn()?;
    ensure_room(&conn, &room)?;

    if !MessageRepo::mark_answered(&conn, &message)? {
        return Err(ApiError::MessageNotFound);
    }
    drop(conn);
    info!(room_id = %room, message_id = %message, "message answered");

    state
        .dispatcher
        .publish(&room, &RoomEvent::MessageAnswered { id: message });

    Ok(Json(CreatedResponse {
        id: message.to_string(),
    }))
}
