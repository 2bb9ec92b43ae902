/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The relay (presence, active chats, routing)
 * - The push subscription table shared with the push dispatcher
 * - The optional email code sender
 * - The loaded configuration
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow handlers to extract only what they use,
 * e.g. `State(relay): State<Relay>` in the socket handler.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::notify::email::EmailCodeSender;
use crate::backend::notify::push::{PushGatewayDispatcher, SubscriptionStore};
use crate::backend::profiles::RestProfileDirectory;
use crate::backend::realtime::relay::Relay;
use crate::backend::server::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,

    /// Push subscriptions registered through `/api/push/subscribe`
    ///
    /// The same table backs the relay's push dispatcher, so a subscription
    /// forgotten after expiry disappears here as well.
    pub subscriptions: SubscriptionStore,

    /// `None` if SMTP credentials are not configured
    pub email: Option<EmailCodeSender>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        relay: Relay,
        subscriptions: SubscriptionStore,
        email: Option<EmailCodeSender>,
        config: ServerConfig,
    ) -> Self {
        Self {
            relay,
            subscriptions,
            email,
            config: Arc::new(config),
        }
    }

    /// Wire up the production collaborators described by `config`
    ///
    /// Optional services that fail to initialize are logged and left out.
    pub fn from_config(config: ServerConfig) -> Self {
        config.log_disabled_features();

        let subscriptions = SubscriptionStore::new();
        let dispatcher =
            PushGatewayDispatcher::with_store(config.push_gateway_url.clone(), subscriptions.clone());

        let mut relay = Relay::new(Arc::new(dispatcher), config.client_url.clone());
        if let Some(supabase) = config.supabase() {
            tracing::info!("[Server] Profile lookups enabled against {}", supabase.url);
            relay = relay.with_profiles(Arc::new(RestProfileDirectory::new(&supabase)));
        }

        let email = config.smtp().and_then(|smtp| match EmailCodeSender::new(&smtp) {
            Ok(sender) => {
                tracing::info!("[Server] Email codes enabled via {}", smtp.host);
                Some(sender)
            }
            Err(e) => {
                tracing::error!("[Server] Failed to configure SMTP: {}", e);
                tracing::warn!("Email codes will be disabled.");
                None
            }
        });

        Self::new(relay, subscriptions, email, config)
    }
}

impl FromRef<AppState> for Relay {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.relay.clone()
    }
}

impl FromRef<AppState> for SubscriptionStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.subscriptions.clone()
    }
}

/// Handlers should check for `None` before sending email
impl FromRef<AppState> for Option<EmailCodeSender> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.email.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
