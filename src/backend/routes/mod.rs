//! Route Configuration Module
//!
//! This module configures all HTTP routes for the relay process.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, CORS and tracing layers
//! └── api_routes.rs   - Push and email endpoints
//! ```
//!
//! # Route Types
//!
//! ## Relay
//!
//! - `GET /socket?userId=<id>` - WebSocket upgrade
//!
//! ## API Routes
//!
//! - `POST /api/push/subscribe` - Push subscription registration
//! - `GET /api/push/vapid-public-key` - VAPID key
//! - `POST /api/email/send-otp` - Verification code email

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
