/**
 * Event Broadcasting
 *
 * Fan-out helper used for presence changes and for seen/deleted events that
 * carry no counterpart. Each target gets its own clone of the event through
 * its connection queue; a slow or closed connection never blocks the others.
 *
 * # Event Types
 *
 * Broadcast is used for:
 * - `user_status` (online/offline)
 * - `message_seen` without `receiverId`
 * - `message_deleted` without `receiverId`
 *
 * Everything else is targeted at a single user's connection.
 */

use crate::backend::realtime::connection::ConnectionHandle;
use crate::shared::ServerEvent;

/// Broadcast an event to every given connection
///
/// # Returns
///
/// Number of connections that accepted the event (0 if none)
pub fn broadcast_event<'a>(
    targets: impl IntoIterator<Item = &'a ConnectionHandle>,
    event: &ServerEvent,
) -> usize {
    let delivered = targets
        .into_iter()
        .filter(|connection| connection.try_deliver(event.clone()))
        .count();

    if delivered > 0 {
        tracing::info!("[Realtime] {} broadcast to {} connections", event.name(), delivered);
    } else {
        tracing::debug!("[Realtime] No connections to receive {}", event.name());
    }
    delivered
}
