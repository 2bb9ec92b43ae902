/**
 * Notification Dispatcher Contract
 *
 * The relay falls back to a `NotificationDispatcher` when a recipient is
 * offline or is not looking at the sender's conversation. Implementations own
 * whatever per-recipient state delivery needs (push subscriptions today).
 *
 * # Outcomes
 *
 * - `Ok(Delivered)` - handed to the push service
 * - `Ok(NoSubscription)` - nothing to deliver to, no network call made
 * - `Err(SubscriptionExpired)` - the caller should `forget_subscription`
 * - any other `Err` - logged by the caller and swallowed
 */

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A user-facing alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    /// Serialized as `message` to match the service worker payload
    #[serde(rename = "message")]
    pub body: String,
    /// Deep link opening the conversation
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    NoSubscription,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The push service reports the subscription as gone (404/410)
    #[error("push subscription expired")]
    SubscriptionExpired,

    #[error("push gateway rejected notification with status {status}")]
    Rejected { status: u16 },

    #[error("push gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Sends alerts to a single recipient
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<DispatchOutcome, DispatchError>;

    /// Drop any stored delivery target for `recipient`
    async fn forget_subscription(&self, recipient: &str);
}
