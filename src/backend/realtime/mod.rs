//! Real-time Relay Module
//!
//! Presence, active-chat tracking and event forwarding between connected
//! clients over WebSockets.
//!
//! # Architecture
//!
//! - **`connection`** - One live socket as seen by the relay
//! - **`registry`** - Presence registry and active-chat tracker (`RelayState`)
//! - **`broadcast`** - Fan-out helper
//! - **`relay`** - Routing rules and notification fallback
//! - **`socket`** - The `/socket` upgrade handler and per-connection tasks
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── connection.rs - ConnectionHandle
//! ├── registry.rs   - RelayState
//! ├── broadcast.rs  - broadcast_event
//! ├── relay.rs      - Relay
//! └── socket.rs     - WebSocket handler
//! ```
//!
//! # Ordering
//!
//! Events from one connection are handled in the order they arrive. Nothing
//! orders events across connections; clients reconcile against the
//! Persistent Store.

pub mod connection;

pub mod registry;

pub mod broadcast;

pub mod relay;

pub mod socket;

pub use broadcast::broadcast_event;
pub use connection::{ConnectionHandle, ConnectionId};
pub use relay::{Relay, RouteOutcome};
pub use socket::handle_socket_upgrade;
