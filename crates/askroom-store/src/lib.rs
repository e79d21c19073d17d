//! # askroom-store
//!
//! SQLite persistence for the askroom service: a pooled connection layer,
//! embedded schema migrations, and stateless repositories for the `rooms`
//! and `messages` tables.

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use repositories::{MessageRepo, RoomRepo};
pub use row_types::{MessageRow, RoomRow};
