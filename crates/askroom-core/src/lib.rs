//! # askroom-core
//!
//! Foundation types for the askroom service: branded identifiers and the
//! room event model broadcast to live observers.

pub mod events;
pub mod ids;

pub use events::RoomEvent;
pub use ids::{InvalidId, MessageId, RoomId, SubscriberId};
