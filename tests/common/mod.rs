//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - A relay served on an ephemeral port
//! - WebSocket client helpers
//! - Custom assertion macros

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod server;

// Re-export commonly used utilities
pub use assertions::*;
pub use fixtures::*;
#[cfg(feature = "ssr")]
pub use server::*;
