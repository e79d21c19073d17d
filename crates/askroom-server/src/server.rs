//! `AskroomServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use askroom_store::ConnectionPool;

use crate::api::{messages, rooms};
use crate::config::ServerConfig;
use crate::errors::ApiError;
use crate::health::{self, HealthResponse};
use crate::realtime::dispatcher::EventDispatcher;
use crate::realtime::registry::RoomRegistry;
use crate::realtime::subscribe::subscribe_handler;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ConnectionPool,
    /// Per-room observer registry.
    pub registry: Arc<RoomRegistry>,
    /// Event dispatcher over the registry.
    pub dispatcher: Arc<EventDispatcher>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: ServerConfig,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Check a connection out of the pool.
    pub fn conn(&self) -> Result<askroom_store::PooledConnection, ApiError> {
        self.pool
            .get()
            .map_err(|e| ApiError::Store(askroom_store::StoreError::Pool(e)))
    }
}

/// The main askroom server.
pub struct AskroomServer {
    config: ServerConfig,
    pool: ConnectionPool,
    registry: Arc<RoomRegistry>,
    dispatcher: Arc<EventDispatcher>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl AskroomServer {
    /// Create a new server over an already-migrated pool.
    pub fn new(config: ServerConfig, pool: ConnectionPool, metrics: Option<PrometheusHandle>) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let dispatcher = Arc::new(EventDispatcher::new(registry.clone()));
        Self {
            config,
            pool,
            registry,
            dispatcher,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            pool: self.pool.clone(),
            registry: self.registry.clone(),
            dispatcher: self.dispatcher.clone(),
            shutdown: self.shutdown.clone(),
            config: self.config.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/subscribe/{room_id}", get(subscribe_handler))
            .route(
                "/api/rooms",
                post(rooms::create_room).get(rooms::list_rooms),
            )
            .route(
                "/api/rooms/{room_id}/messages",
                post(messages::create_message).get(messages::list_messages),
            )
            .route(
                "/api/rooms/{room_id}/messages/{message_id}",
                get(messages::get_message),
            )
            .route(
                "/api/rooms/{room_id}/messages/{message_id}/react",
                patch(messages::add_reaction).delete(messages::remove_reaction),
            )
            .route(
                "/api/rooms/{room_id}/messages/{message_id}/answer",
                patch(messages::mark_answered),
            )
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind, serve, and return the bound address plus the serving task.
    ///
    /// The task runs until the shutdown token is cancelled, then drains the
    /// registry so every observer task exits.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind(format!("{}:{}", self.config.host, self.config.port))
                .await?;
        let addr = listener.local_addr()?;
        info!(%addr, "server listening");

        let app = self.router();
        let token = self.shutdown.token();
        let registry = self.registry.clone();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server error");
            }
            registry.drain();
            info!("server stopped");
        });

        Ok((addr, handle))
    }

    /// Get the observer registry.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Get the event dispatcher.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let resp = health::health_check(
        state.start_time,
        state.registry.connection_count(),
        state.registry.room_count(),
    );
    Json(resp)
}

/// GET /metrics — Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(StatusCode::NOT_FOUND)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
