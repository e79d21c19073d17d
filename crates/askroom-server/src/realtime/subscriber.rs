//! Per-observer connection handle.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use askroom_core::SubscriberId;

/// Handle for one live observer connection.
///
/// Holds the outbound channel to the connection's socket task and the
/// cancellation token that tears the connection down. Cloning the handle
/// clones the channel sender and token, not the connection.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Arc<String>>,
    cancel: CancellationToken,
}

impl Subscriber {
    /// Create a new subscriber handle.
    pub fn new(tx: mpsc::Sender<Arc<String>>, cancel: CancellationToken) -> Self {
        Self {
            id: SubscriberId::new(),
            tx,
            cancel,
        }
    }

    /// This subscriber's ID.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue a serialized event for this observer.
    ///
    /// Returns `false` if the channel is full or closed. The caller decides
    /// what a failure means; this never blocks.
    pub fn send(&self, message: Arc<String>) -> bool {
        self.tx.try_send(message).is_ok()
    }

    /// Tear the connection down. Idempotent, safe to call concurrently.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether this subscriber has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
