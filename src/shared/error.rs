//! Shared Error Types
//!
//! Errors raised by the wire types shared between the relay and the client
//! agent.
//!
//! # Error Categories
//!
//! - `SerializationError` - a frame could not be encoded or decoded
//! - `ValidationError` - a payload decoded but carries an unusable value
//! - `IdentityError` - an event claims an identity its connection does not own
//! - `AnonymousError` - an anonymous connection sent an event that needs an owner
//!
//! # Usage
//!
//! ```rust
//! use chatwire::shared::error::SharedError;
//!
//! let error = SharedError::validation("receiverId", "must not be empty");
//! ```
use thiserror::Error;

/// Shared error types that can occur in both relay and agent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON encoding or decoding failed
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// A payload field holds an unusable value
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The offending field, as named on the wire
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// An event speaks for a user other than the connection's owner
    #[error("Identity mismatch: connection owned by '{owner}' sent an event for '{claimed}'")]
    IdentityError {
        owner: String,
        claimed: String,
    },

    /// The event needs an identified connection
    #[error("Anonymous connection may not send '{event}'")]
    AnonymousError { event: String },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new identity error
    pub fn identity(owner: impl Into<String>, claimed: impl Into<String>) -> Self {
        Self::IdentityError {
            owner: owner.into(),
            claimed: claimed.into(),
        }
    }

    /// Create a new anonymous-connection error
    pub fn anonymous(event: impl Into<String>) -> Self {
        Self::AnonymousError {
            event: event.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
