//! Real-time fan-out core: observer registry, event dispatcher, and the
//! subscription lifecycle for `GET /subscribe/{room_id}`.

pub mod dispatcher;
pub mod registry;
pub mod subscribe;
pub mod subscriber;

pub use dispatcher::EventDispatcher;
pub use registry::RoomRegistry;
pub use subscriber::Subscriber;
