//! Relay server fixtures
//!
//! Spawns the real router on an ephemeral port and drives it with
//! tokio-tungstenite clients.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chatwire::backend::notify::{
    DispatchError, DispatchOutcome, Notification, NotificationDispatcher, PushGatewayDispatcher,
    SubscriptionStore,
};
use chatwire::backend::realtime::Relay;
use chatwire::backend::routes::create_router;
use chatwire::backend::server::{AppState, ServerConfig};
use chatwire::shared::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for an expected frame
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Dispatcher that records every call
///
/// Recipients in `subscribed` count as having a push subscription; those
/// also in `expired` report it as gone.
#[derive(Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<(String, Notification)>>,
    subscribed: Mutex<HashSet<String>>,
    expired: Mutex<HashSet<String>>,
    push_attempts: Mutex<usize>,
}

impl RecordingDispatcher {
    pub fn subscribe(&self, user: &str) {
        self.subscribed.lock().unwrap().insert(user.to_string());
    }

    pub fn expire(&self, user: &str) {
        self.expired.lock().unwrap().insert(user.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Notification)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.calls().into_iter().map(|(recipient, _)| recipient).collect()
    }

    pub fn push_attempts(&self) -> usize {
        *self.push_attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.calls
            .lock()
            .unwrap()
            .push((recipient.to_string(), notification.clone()));
        if !self.subscribed.lock().unwrap().contains(recipient) {
            return Ok(DispatchOutcome::NoSubscription);
        }
        *self.push_attempts.lock().unwrap() += 1;
        if self.expired.lock().unwrap().contains(recipient) {
            return Err(DispatchError::SubscriptionExpired);
        }
        Ok(DispatchOutcome::Delivered)
    }

    async fn forget_subscription(&self, recipient: &str) {
        self.subscribed.lock().unwrap().remove(recipient);
    }
}

pub struct TestRelay {
    pub addr: SocketAddr,
    pub relay: Relay,
    pub subscriptions: SubscriptionStore,
}

impl TestRelay {
    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn socket_url(&self, user: Option<&str>) -> String {
        match user {
            Some(user) => format!("ws://{}/socket?userId={}", self.addr, user),
            None => format!("ws://{}/socket", self.addr),
        }
    }
}

/// Serve the full router with the given dispatcher
pub async fn spawn_relay_with(
    dispatcher: Arc<dyn NotificationDispatcher>,
    subscriptions: SubscriptionStore,
) -> TestRelay {
    let config = ServerConfig::default();
    let relay = Relay::new(dispatcher, config.client_url.clone());
    let state = AppState::new(relay.clone(), subscriptions.clone(), None, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestRelay {
        addr,
        relay,
        subscriptions,
    }
}

/// Serve the router with a recording dispatcher
pub async fn spawn_relay() -> (TestRelay, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let server = spawn_relay_with(dispatcher.clone(), SubscriptionStore::new()).await;
    (server, dispatcher)
}

/// Serve the router with the production push dispatcher against `gateway_url`
pub async fn spawn_relay_with_gateway(gateway_url: String) -> TestRelay {
    let subscriptions = SubscriptionStore::new();
    let dispatcher = PushGatewayDispatcher::with_store(Some(gateway_url), subscriptions.clone());
    spawn_relay_with(Arc::new(dispatcher), subscriptions).await
}

/// Open a socket; identified clients wait for their own `online` broadcast
pub async fn connect_ws(server: &TestRelay, user: Option<&str>) -> WsClient {
    let (mut ws, _) = connect_async(server.socket_url(user)).await.unwrap();
    if let Some(user) = user {
        let event = next_event(&mut ws).await;
        assert_eq!(
            event,
            ServerEvent::user_status(user, chatwire::shared::PresenceStatus::Online)
        );
    }
    ws
}

pub async fn send_event(ws: &mut WsClient, event: &ClientEvent) {
    let text = event.to_json().unwrap();
    ws.send(Message::Text(text.into())).await.unwrap();
}

pub async fn send_raw(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into())).await.unwrap();
}

/// Next server event, failing the test after `RECV_TIMEOUT`
pub async fn next_event(ws: &mut WsClient) -> ServerEvent {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return ServerEvent::from_json(text.as_str()).unwrap();
                }
                Some(Ok(_)) => continue,
                other => panic!("socket ended while waiting for an event: {:?}", other),
            }
        }
    })
    .await
    .expect("timed out waiting for an event")
}

/// Assert nothing arrives for `window`
pub async fn expect_silence(ws: &mut WsClient, window: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(window, ws.next()).await {
        panic!("expected no event, got {}", text.as_str());
    }
}

/// Poll an async condition until it holds
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(RECV_TIMEOUT, async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Connect several identified clients in order and drain the presence
/// broadcasts each one saw for the clients connected after it
pub async fn connect_all(server: &TestRelay, users: &[&str]) -> Vec<WsClient> {
    let mut clients = Vec::with_capacity(users.len());
    for user in users {
        clients.push(connect_ws(server, Some(user)).await);
    }
    for (index, client) in clients.iter_mut().enumerate() {
        for later in &users[index + 1..] {
            let event = next_event(client).await;
            assert_eq!(
                event,
                ServerEvent::user_status(*later, chatwire::shared::PresenceStatus::Online)
            );
        }
    }
    clients
}
