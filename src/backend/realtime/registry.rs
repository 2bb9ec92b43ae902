//! Presence Registry and Active-Chat Tracker
//!
//! `RelayState` owns every piece of in-memory relay state:
//!
//! - all live connections, anonymous ones included, for broadcasts
//! - `user_id -> connection id` presence entries, at most one per user
//! - `user_id -> peer_id` active-chat hints
//!
//! It is a plain struct with no interior locking. The `Relay` wraps it in a
//! single `RwLock` and is the only code that mutates it.

use std::collections::HashMap;

use crate::backend::realtime::connection::{ConnectionHandle, ConnectionId};
use crate::shared::UserId;

#[derive(Debug, Default)]
pub struct RelayState {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    presence: HashMap<UserId, ConnectionId>,
    active_chats: HashMap<UserId, UserId>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection
    ///
    /// Identified connections take over the user's presence entry
    /// (last-connect-wins). Returns the id of the connection that was
    /// superseded, if any.
    pub fn register(&mut self, handle: ConnectionHandle) -> Option<ConnectionId> {
        let replaced = handle
            .user_id()
            .and_then(|user| self.presence.insert(user.to_string(), handle.id()));
        self.connections.insert(handle.id(), handle);
        replaced
    }

    /// Forget a connection
    ///
    /// Presence and active-chat entries are only cleared when the registry
    /// still points at this connection; a connection superseded by a newer one
    /// for the same user leaves the newer entry alone. Returns the user that
    /// went offline, if any.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<UserId> {
        let handle = self.connections.remove(&id)?;
        let user = handle.user_id()?;

        if self.presence.get(user) != Some(&id) {
            return None;
        }
        self.presence.remove(user);
        self.active_chats.remove(user);
        Some(user.to_string())
    }

    /// Upsert or clear the conversation `user` currently has open
    pub fn set_active_chat(&mut self, user: &str, peer: Option<UserId>) -> Option<UserId> {
        match peer {
            Some(peer) => self.active_chats.insert(user.to_string(), peer),
            None => self.active_chats.remove(user),
        }
    }

    pub fn active_chat(&self, user: &str) -> Option<&str> {
        self.active_chats.get(user).map(String::as_str)
    }

    /// Current connection of an online user
    pub fn connection_for(&self, user: &str) -> Option<&ConnectionHandle> {
        self.presence
            .get(user)
            .and_then(|id| self.connections.get(id))
    }

    pub fn is_online(&self, user: &str) -> bool {
        self.presence.contains_key(user)
    }

    /// Every live connection, anonymous and superseded ones included
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionHandle> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of users with a presence entry
    pub fn online_count(&self) -> usize {
        self.presence.len()
    }

    pub fn active_chat_count(&self) -> usize {
        self.active_chats.len()
    }
}
