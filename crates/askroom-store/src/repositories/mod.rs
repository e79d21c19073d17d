//! Stateless repositories over the pooled `SQLite` connection.

pub mod message;
pub mod room;

pub use message::MessageRepo;
pub use room::RoomRepo;
