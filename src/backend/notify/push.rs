/**
 * Push Notifications
 *
 * Browser push subscriptions are registered through `POST /api/push/subscribe`
 * and kept in memory, one per user (a newer subscription replaces the older
 * one). Delivery is delegated to a push gateway that owns VAPID signing and
 * payload encryption; the relay only posts the subscription and the plain
 * payload:
 *
 * ```json
 * {"subscription": {"endpoint": "...", "keys": {...}},
 *  "payload": {"title": "Alice", "message": "hi", "url": "...?chat=a"}}
 * ```
 *
 * The gateway mirrors the push service status, so 404/410 means the browser
 * subscription is gone and must be forgotten.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::backend::notify::dispatcher::{
    DispatchError, DispatchOutcome, Notification, NotificationDispatcher,
};
use crate::shared::UserId;

/// Web Push subscription as produced by `PushManager.subscribe()`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<i64>,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// In-memory subscription table shared by the HTTP handlers and the dispatcher
#[derive(Debug, Clone, Default)]
pub struct SubscriptionStore {
    subscriptions: Arc<RwLock<HashMap<UserId, PushSubscription>>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the subscription for a user
    pub async fn upsert(&self, user_id: impl Into<UserId>, subscription: PushSubscription) {
        self.subscriptions
            .write()
            .await
            .insert(user_id.into(), subscription);
    }

    pub async fn get(&self, user_id: &str) -> Option<PushSubscription> {
        self.subscriptions.read().await.get(user_id).cloned()
    }

    pub async fn remove(&self, user_id: &str) -> Option<PushSubscription> {
        self.subscriptions.write().await.remove(user_id)
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    subscription: &'a PushSubscription,
    payload: &'a Notification,
}

/// Dispatcher posting to an external push gateway
#[derive(Debug, Clone)]
pub struct PushGatewayDispatcher {
    client: reqwest::Client,
    gateway_url: Option<String>,
    subscriptions: SubscriptionStore,
}

impl PushGatewayDispatcher {
    pub fn new(gateway_url: Option<String>) -> Self {
        Self::with_store(gateway_url, SubscriptionStore::new())
    }

    pub fn with_store(gateway_url: Option<String>, subscriptions: SubscriptionStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            subscriptions,
        }
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }
}

#[async_trait]
impl NotificationDispatcher for PushGatewayDispatcher {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(subscription) = self.subscriptions.get(recipient).await else {
            tracing::debug!("[Push] No subscription for {}, skipping", recipient);
            return Ok(DispatchOutcome::NoSubscription);
        };
        let gateway_url = self
            .gateway_url
            .as_deref()
            .ok_or(DispatchError::NotConfigured("push gateway"))?;

        let response = self
            .client
            .post(gateway_url)
            .json(&GatewayRequest {
                subscription: &subscription,
                payload: notification,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!("[Push] Notification delivered to {}", recipient);
                Ok(DispatchOutcome::Delivered)
            }
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(DispatchError::SubscriptionExpired),
            status => Err(DispatchError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn forget_subscription(&self, recipient: &str) {
        if self.subscriptions.remove(recipient).await.is_some() {
            tracing::info!("[Push] Removed expired subscription for {}", recipient);
        }
    }
}
