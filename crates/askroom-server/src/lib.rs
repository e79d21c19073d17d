//! # askroom-server
//!
//! Axum HTTP + WebSocket server for the askroom service. Hosts the CRUD
//! API for rooms and messages and the real-time core: a per-room registry
//! of observer connections and the dispatcher that fans room events out to
//! them.

pub mod api;
pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod realtime;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{AppState, AskroomServer};
pub use shutdown::ShutdownCoordinator;
