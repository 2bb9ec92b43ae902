//! Chatwire - Realtime Presence and Message-Delivery Relay
//!
//! Chatwire is the realtime layer of a one-to-one chat application. Durable
//! state (messages, profiles, friend requests) lives in a managed Persistent
//! Store that clients write to directly; this crate only moves ephemeral
//! events between connected clients and alerts users who are not looking.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between relay and agent
//!   - Socket event protocol (`ClientEvent`, `ServerEvent`)
//!   - The relayed message record
//!   - Agent configuration and error types
//!
//! - **`backend`** - The relay process (only compiled with `ssr` feature)
//!   - Axum server hosting the `/socket` WebSocket
//!   - Presence registry, active-chat tracker, routing rules
//!   - Push gateway and email code delivery
//!
//! - **`client`** - The Client Realtime Agent
//!   - One connection per session with bounded linear reconnect
//!   - Fire-and-forget emit helpers
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server-side code (enables the `backend` module), on by default
//!
//! # Usage
//!
//! ## Relay
//!
//! ```rust,no_run
//! use chatwire::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?)?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Agent
//!
//! ```rust,no_run
//! use chatwire::client::RealtimeAgent;
//! use chatwire::shared::AgentConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let agent = RealtimeAgent::from_config(AgentConfig::default())?;
//! agent.reinitialize("alice").await?;
//! agent.emit_typing("bob", true);
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! None beyond per-connection ordering. A dropped relay event is never
//! retried; the Persistent Store reconciles clients through its own change
//! feed.

/// Shared types and data structures
pub mod shared;

/// Relay server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client Realtime Agent
pub mod client;
