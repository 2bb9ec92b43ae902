//! Shared Module
//!
//! Types shared by the relay server and the client agent: the socket event
//! protocol, the relayed message record, client configuration and the error
//! type both sides raise when a frame cannot be understood.
//!
//! Everything here is transport-agnostic and compiles without the `ssr`
//! feature.

/// Socket event protocol
pub mod event;

/// Shared error types
pub mod error;

/// Client agent configuration
pub mod config;

/// Relayed message record
pub mod messaging;

/// Re-export commonly used types for convenience
pub use event::{ClientEvent, PresenceStatus, ServerEvent, UserId};
pub use error::SharedError;
pub use config::{AgentConfig, AgentConfigBuilder, ConfigError};
pub use messaging::{ChatMessage, MessageId};
