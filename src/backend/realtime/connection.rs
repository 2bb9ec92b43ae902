/**
 * Relay Connections
 *
 * A `ConnectionHandle` is the relay's view of one live socket: who owns it (if
 * anyone) and the bounded queue feeding that socket's writer task. Handles are
 * cheap to clone; the registry keeps one clone, the socket task keeps another.
 *
 * # Delivery
 *
 * Delivery is a non-blocking `try_send`. A full or closed queue means the
 * event is lost for this connection. That is acceptable on the relay fast
 * path because the Persistent Store remains the system of record.
 */

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::shared::{ServerEvent, UserId};

/// Process-local identifier of a live connection
pub type ConnectionId = Uuid;

/// One live client session
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: Option<UserId>,
    outbound: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    /// Create a handle for a freshly accepted socket
    ///
    /// Blank identities are treated as anonymous.
    pub fn new(user_id: Option<UserId>, outbound: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: normalize_identity(user_id.as_deref()),
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Owning user, `None` for anonymous sessions
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Queue an event for this connection without waiting
    ///
    /// Returns `false` when the event was dropped.
    pub fn try_deliver(&self, event: ServerEvent) -> bool {
        match self.outbound.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    "[Relay] Outbound queue full for connection {}, dropping {}",
                    self.id,
                    event.name()
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(
                    "[Relay] Connection {} already closed, dropping {}",
                    self.id,
                    event.name()
                );
                false
            }
        }
    }
}

/// Trim a handshake identity, mapping blank values to anonymous
pub fn normalize_identity(raw: Option<&str>) -> Option<UserId> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
