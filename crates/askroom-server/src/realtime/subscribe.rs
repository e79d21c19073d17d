//! Subscription lifecycle for `GET /subscribe/{room_id}`.
//!
//! Admission runs before any registry mutation: parse the room id, confirm
//! the room exists, then accept the WebSocket upgrade. Once admitted, the
//! connection is registered and a single task services it until the client
//! goes away, a write fails, or the server shuts down. A guard deregisters
//! on every exit path.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use askroom_core::{RoomId, SubscriberId};
use askroom_store::RoomRepo;

use super::registry::RoomRegistry;
use super::subscriber::Subscriber;
use crate::errors::AdmissionError;
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};
use crate::server::AppState;

/// `GET /subscribe/{room_id}` — admit an observer and upgrade to WebSocket.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AdmissionError> {
    let room = RoomId::parse(&room_id).map_err(|_| AdmissionError::InvalidRoom)?;

    let conn = state.pool.get().map_err(|e| {
        AdmissionError::StoreUnavailable(askroom_store::StoreError::Pool(e))
    })?;
    let exists =
        RoomRepo::exists(&conn, &room).map_err(AdmissionError::StoreUnavailable)?;
    drop(conn);
    if !exists {
        return Err(AdmissionError::RoomNotFound);
    }

    let ws = ws.map_err(|_| AdmissionError::UpgradeFailed)?;
    Ok(ws.on_upgrade(move |socket| serve_subscriber(socket, state, room)))
}

/// Deregisters the connection when the serving task exits, however it exits.
struct RegistrationGuard {
    registry: Arc<RoomRegistry>,
    room: RoomId,
    id: SubscriberId,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.deregister(&self.room, self.id);
        gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
        counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    }
}

/// Service one observer connection until it terminates.
async fn serve_subscriber(socket: WebSocket, state: AppState, room: RoomId) {
    // Child of the server token: shutdown cancels every observer.
    let token = state.shutdown.token().child_token();
    let (tx, mut rx) = mpsc::channel(state.config.subscriber_buffer);
    let subscriber = Subscriber::new(tx, token.clone());
    let id = subscriber.id();

    state.registry.register(room, subscriber);
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    debug!(%room, "observer connected");

    let _guard = RegistrationGuard {
        registry: state.registry.clone(),
        room,
        id,
    };

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            () = token.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(json) => {
                        if let Err(e) = sink.send(Message::Text(json.as_str().into())).await {
                            warn!(%room, error = %e, "socket write failed");
                            token.cancel();
                            break;
                        }
                    }
                    // Channel closed: subscriber handle dropped by eviction.
                    None => break,
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                        debug!(%room, "observer disconnected");
                        break;
                    }
                    // Observers are read-only; ignore anything they send.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
