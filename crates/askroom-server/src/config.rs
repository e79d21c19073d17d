//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the askroom server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Per-observer outbound buffer, in messages. A full buffer counts as
    /// a failed delivery and the observer is evicted.
    pub subscriber_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            subscriber_buffer: 32,
        }
    }
}
