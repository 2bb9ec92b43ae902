//! Chat Message Record
//!
//! The message record as written to the Persistent Store by the sending
//! client and relayed verbatim through `new_message` / `message_received`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::event::UserId;

/// Store row id of a message
///
/// Tables keyed by `bigint` send numbers, `uuid`/`text` keys send strings.
/// The original JSON form is kept when the id is relayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

impl MessageId {
    /// An empty or whitespace-only text id
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl PartialEq<&str> for MessageId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::Text(id) if id == other)
    }
}

/// Represents a chat message
///
/// Only the routing fields are typed; every other column (timestamps, reply
/// references, attachment urls, ...) is carried through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatMessage {
    /// Store row id, absent for optimistic sends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    #[serde(default)]
    pub content: String,
    /// Display name of the sender, if the client already knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// `text` or `image`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    /// Create a new text message
    pub fn new_text(
        sender_id: impl Into<UserId>,
        receiver_id: impl Into<UserId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            content: content.into(),
            message_type: Some("text".to_string()),
            ..Self::default()
        }
    }

    /// Set the sender display name
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.message_type.as_deref() == Some("image")
    }

    /// Get a preview of the message (first `max_len` characters)
    ///
    /// Whitespace runs collapse to a single space so multi-line messages
    /// preview on one line.
    pub fn preview(&self, max_len: usize) -> String {
        let plain = self.content.split_whitespace().collect::<Vec<_>>().join(" ");
        if plain.chars().count() <= max_len {
            plain
        } else {
            let mut preview: String = plain.chars().take(max_len).collect();
            preview.push_str("...");
            preview
        }
    }
}
