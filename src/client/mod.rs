//! Client Realtime Agent
//!
//! The native counterpart of the relay: opens one connection per session,
//! re-establishes it across drops with bounded linear backoff, and exposes
//! fire-and-forget emit helpers plus a stream of inbound server events.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs        - Module exports and documentation
//! ├── agent.rs      - RealtimeAgent and its supervisor task
//! ├── reconnect.rs  - ReconnectPolicy and ConnectionMachine
//! ├── transport.rs  - Connector trait and the WebSocket connector
//! └── error.rs      - AgentError
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use chatwire::client::RealtimeAgent;
//! use chatwire::shared::AgentConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::builder().server_url("http://localhost:3000").build()?;
//! let agent = RealtimeAgent::from_config(config)?;
//! let mut events = agent.subscribe();
//!
//! agent.reinitialize("alice").await?;
//! agent.emit_active_chat(Some("bob"));
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;

pub mod error;

pub mod reconnect;

pub mod transport;

pub use agent::RealtimeAgent;
pub use error::AgentError;
pub use reconnect::{ConnectionMachine, ConnectionState, ReconnectPolicy, RetryDecision};
pub use transport::{Connector, Link, WsConnector};
