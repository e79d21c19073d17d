//! Branded ID newtypes for type safety.
//!
//! Every entity has a distinct ID type implemented as a newtype wrapper
//! around [`uuid::Uuid`]. This prevents accidentally passing a message ID
//! where a room ID is expected, and lets request paths be validated once
//! at the edge via [`parse`](RoomId::parse).
//!
//! All new IDs are UUID v7 (time-ordered) generated via [`Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A string that failed to parse as a UUID.
#[derive(Debug, Error)]
#[error("invalid identifier: {0:?}")]
pub struct InvalidId(pub String);

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Parse from a string, rejecting anything that is not a UUID.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| InvalidId(s.to_owned()))
            }

            /// Return the inner UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a room.
    RoomId
}

branded_id! {
    /// Unique identifier for a message within a room.
    MessageId
}

branded_id! {
    /// Unique identifier for a live observer connection.
    SubscriberId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_new_is_uuid_v7() {
        let id = RoomId::new();
        assert_eq!(id.as_uuid().get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn message_id_new_is_uuid_v7() {
        let id = MessageId::new();
        assert_eq!(id.as_uuid().get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn ids_are_unique() {
        let a = RoomId::new();
        let b = RoomId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_valid_uuid() {
        let id = RoomId::parse("0193e9e4-1f2a-7b3c-8d4e-5f6a7b8c9d0e").unwrap();
        assert_eq!(id.to_string(), "0193e9e4-1f2a-7b3c-8d4e-5f6a7b8c9d0e");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = RoomId::parse("not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(MessageId::parse("").is_err());
    }

    #[test]
    fn display_roundtrip() {
        let id = MessageId::new();
        let parsed = MessageId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_is_transparent() {
        let id = RoomId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn hash_and_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let id = SubscriberId::new();
        let _ = set.insert(id);
        let _ = set.insert(id);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn default_creates_new() {
        assert_ne!(SubscriberId::default(), SubscriberId::default());
    }
}
