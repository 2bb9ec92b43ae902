//! Notification Dispatcher Module
//!
//! Alerts for users the relay cannot reach directly, and the HTTP routes that
//! feed them.
//!
//! # Module Structure
//!
//! ```text
//! notify/
//! ├── mod.rs        - Module exports and documentation
//! ├── dispatcher.rs - NotificationDispatcher trait, Notification, errors
//! ├── push.rs       - Push subscriptions and the push gateway dispatcher
//! ├── email.rs      - Email verification codes over SMTP
//! └── handlers.rs   - /api/push/* and /api/email/* handlers
//! ```
//!
//! # Failure Policy
//!
//! Dispatch failures never reach the socket that triggered them. An expired
//! push subscription is forgotten so the next alert does not retry it.

pub mod dispatcher;

pub mod push;

pub mod email;

pub mod handlers;

pub use dispatcher::{DispatchError, DispatchOutcome, Notification, NotificationDispatcher};
pub use email::EmailCodeSender;
pub use push::{PushGatewayDispatcher, PushSubscription, SubscriptionStore};
