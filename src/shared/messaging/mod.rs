//! Messaging Module
//!
//! The message record relayed between clients. The durable copy lives in the
//! Persistent Store; the relay only forwards it.

pub mod message;

pub use message::{ChatMessage, MessageId};
