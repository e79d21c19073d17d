//! CRUD endpoints for rooms and messages.
//!
//! Every mutation publishes a [`askroom_core::RoomEvent`] after its database
//! write succeeds; publishing is fire-and-forget and never changes the HTTP
//! response.

pub mod messages;
pub mod rooms;
