/**
 * Realtime Relay Events
 *
 * This module defines the events exchanged between the Client Realtime Agent
 * and the Relay over the `/socket` WebSocket. Every frame is a JSON text frame
 * with the event name and its payload side by side:
 *
 * ```json
 * {"event": "typing", "data": {"senderId": "a", "receiverId": "b", "isTyping": true}}
 * ```
 *
 * Payload field names follow the browser client (`camelCase`), except for the
 * message record itself which keeps the store's column names.
 */
use serde::{Deserialize, Serialize};

use crate::shared::messaging::{ChatMessage, MessageId};
use crate::shared::SharedError;

/// Opaque user identifier as issued by the Persistent Store
pub type UserId = String;

/// Presence status carried by `user_status`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Payload of `active_chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChat {
    pub user_id: UserId,
    /// Peer whose conversation is open, or `None` when nothing is open
    #[serde(default)]
    pub active_user_id: Option<UserId>,
}

/// Payload of `messages_seen` / `message_seen`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeenStatus {
    pub message_ids: Vec<MessageId>,
    pub seen_by: UserId,
    /// Conversation counterpart; when present the relay targets only them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<UserId>,
}

/// Payload of `delete_message` / `message_deleted`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeleted {
    pub message_id: MessageId,
    pub deleted_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<UserId>,
}

/// Payload of `typing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatus {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub is_typing: bool,
}

/// Payload of `user_status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub user_id: UserId,
    pub status: PresenceStatus,
}

/// Payload of `user_typing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserTyping {
    pub sender_id: UserId,
    pub is_typing: bool,
}

/// Events sent by a client to the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Sets or clears the sender's Active-Chat entry
    ActiveChat(ActiveChat),
    /// A message already written to the store, relayed as a fast path
    NewMessage(ChatMessage),
    MessagesSeen(SeenStatus),
    DeleteMessage(MessageDeleted),
    Typing(TypingStatus),
}

/// Events sent by the relay to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    UserStatus(UserStatus),
    MessageReceived(ChatMessage),
    MessageSeen(SeenStatus),
    MessageDeleted(MessageDeleted),
    UserTyping(UserTyping),
}

impl ClientEvent {
    /// Decode a text frame
    pub fn from_json(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as a text frame
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the event, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActiveChat(_) => "active_chat",
            Self::NewMessage(_) => "new_message",
            Self::MessagesSeen(_) => "messages_seen",
            Self::DeleteMessage(_) => "delete_message",
            Self::Typing(_) => "typing",
        }
    }
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UserStatus(_) => "user_status",
            Self::MessageReceived(_) => "message_received",
            Self::MessageSeen(_) => "message_seen",
            Self::MessageDeleted(_) => "message_deleted",
            Self::UserTyping(_) => "user_typing",
        }
    }

    /// Create a presence-change event
    pub fn user_status(user_id: impl Into<UserId>, status: PresenceStatus) -> Self {
        Self::UserStatus(UserStatus {
            user_id: user_id.into(),
            status,
        })
    }
}
