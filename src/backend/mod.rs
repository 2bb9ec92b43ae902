//! Backend Module
//!
//! The relay process: an Axum server hosting the realtime relay socket and
//! the notification routes the browser client calls.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Presence registry, active-chat tracker, event routing
//! - **`notify`** - Notification dispatcher (push gateway, email codes)
//! - **`profiles`** - Read-only profile lookups against the Persistent Store
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Relay and WebSocket handling
//! ├── notify/         - Push and email delivery
//! ├── profiles/       - Profile directory client
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! All relay state lives in one `RelayState` behind a `tokio::sync::RwLock`
//! owned by `Relay`. Handlers never touch it directly. Nothing is persisted;
//! a restart is equivalent to every client disconnecting and reconnecting.
//!
//! # Error Handling
//!
//! - `BackendError` for HTTP handlers, rendered as JSON
//! - socket events that fail are logged and dropped, never surfaced

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Realtime relay
pub mod realtime;

/// Notification delivery
pub mod notify;

/// Persistent Store profile lookups
pub mod profiles;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::Relay;
pub use server::create_app;
