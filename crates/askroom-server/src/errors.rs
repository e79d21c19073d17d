//! Error types for the HTTP and WebSocket surfaces.
//!
//! [`AdmissionError`] covers the subscribe handshake, [`ApiError`] the CRUD
//! endpoints. Both render as `{"error": <message>}` JSON bodies. Delivery
//! failures during fan-out are not errors at this layer: they are handled
//! inside the dispatcher and never surface to a request.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use askroom_store::StoreError;

/// Why an observer was refused before registration.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The room identifier in the path is not a UUID.
    #[error("invalid room id")]
    InvalidRoom,

    /// The room identifier is well-formed but no such room exists.
    #[error("room not found")]
    RoomNotFound,

    /// The room lookup failed (pool exhausted, query error).
    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),

    /// The request was not a valid WebSocket upgrade.
    #[error("websocket upgrade failed")]
    UpgradeFailed,
}

impl AdmissionError {
    /// Metrics label for the rejection reason.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRoom => "invalid_room",
            Self::RoomNotFound => "room_not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::UpgradeFailed => "upgrade_failed",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRoom | Self::UpgradeFailed => StatusCode::BAD_REQUEST,
            Self::RoomNotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        if let Self::StoreUnavailable(ref source) = self {
            error!(error = %source, "room lookup failed during admission");
        }
        metrics::counter!(
            crate::metrics::WS_ADMISSION_REJECTED_TOTAL,
            "reason" => self.reason()
        )
        .increment(1);
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Errors returned by the CRUD endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path identifier is not a UUID.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// The addressed room does not exist.
    #[error("room not found")]
    RoomNotFound,

    /// The addressed message does not exist.
    #[error("message not found")]
    MessageNotFound,

    /// The store failed.
    #[error("internal server error")]
    Store(#[from] StoreError),

    /// Invariant violation inside the server (e.g. a stored ID that does
    /// not parse).
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound | Self::MessageNotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store(source) => error!(error = %source, "store operation failed"),
            Self::Internal(message) => error!(message = %message, "internal invariant violated"),
            _ => {}
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
