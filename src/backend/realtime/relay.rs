/**
 * Realtime Relay
 *
 * The relay is the only owner of presence and active-chat state. Socket tasks
 * call into it for every lifecycle change and every decoded client event; it
 * forwards events to peer connections and falls back to the notification
 * dispatcher when a recipient cannot be reached directly.
 *
 * # Locking
 *
 * `RelayState` sits behind one `RwLock`. Queue sends happen under the lock
 * (they never wait), while profile lookups and dispatcher calls are awaited
 * only after the guard is dropped, so a slow push gateway never stalls other
 * connections.
 *
 * # Routing Rules
 *
 * | Client event     | Delivery                                           |
 * |------------------|----------------------------------------------------|
 * | `new_message`    | receiver's connection, plus a notification unless  |
 * |                  | the receiver is online and viewing the sender      |
 * | `typing`         | receiver's connection only                         |
 * | `messages_seen`  | `receiverId` if named, else every other connection |
 * | `delete_message` | `receiverId` if named, else every other connection |
 * | `active_chat`    | no delivery, updates the tracker                   |
 */

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::backend::notify::dispatcher::{
    DispatchError, DispatchOutcome, Notification, NotificationDispatcher,
};
use crate::backend::profiles::ProfileDirectory;
use crate::backend::realtime::broadcast::broadcast_event;
use crate::backend::realtime::connection::{ConnectionHandle, ConnectionId};
use crate::backend::realtime::registry::RelayState;
use crate::shared::event::{ActiveChat, MessageDeleted, SeenStatus, TypingStatus, UserTyping};
use crate::shared::{ChatMessage, ClientEvent, PresenceStatus, ServerEvent, SharedError, UserId};

pub const FALLBACK_TITLE: &str = "New Message";
pub const IMAGE_BODY: &str = "📷 Sent you an image";
pub const EMPTY_BODY: &str = "Sent you a message";
pub const PREVIEW_LEN: usize = 50;

/// What happened to a routed event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// At least one connection accepted the event
    pub forwarded: bool,
    /// The dispatcher accepted a notification
    pub notified: bool,
    /// Number of connections that accepted the event
    pub recipients: usize,
}

impl RouteOutcome {
    fn delivered(recipients: usize) -> Self {
        Self {
            forwarded: recipients > 0,
            notified: false,
            recipients,
        }
    }
}

#[derive(Clone)]
pub struct Relay {
    state: Arc<RwLock<RelayState>>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    profiles: Option<Arc<dyn ProfileDirectory>>,
    client_url: String,
}

impl Relay {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, client_url: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RelayState::new())),
            dispatcher,
            profiles: None,
            client_url: client_url.into(),
        }
    }

    /// Use a profile directory for notification titles
    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileDirectory>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Register a freshly accepted socket
    ///
    /// Identified connections take over any previous presence entry for the
    /// same user and an `online` status is broadcast to every connection,
    /// the new one included. Anonymous connections only receive broadcasts.
    pub async fn connect(
        &self,
        user_id: Option<UserId>,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> ConnectionHandle {
        let handle = ConnectionHandle::new(user_id, outbound);
        let mut state = self.state.write().await;
        let replaced = state.register(handle.clone());

        match handle.user_id() {
            Some(user) => {
                if let Some(previous) = replaced {
                    tracing::info!(
                        "[Relay] {} reconnected, connection {} replaces {}",
                        user,
                        handle.id(),
                        previous
                    );
                } else {
                    tracing::info!("[Relay] {} connected as {}", user, handle.id());
                }
                let event = ServerEvent::user_status(user, PresenceStatus::Online);
                broadcast_event(state.connections(), &event);
            }
            None => {
                tracing::info!("[Relay] Anonymous connection {} accepted", handle.id());
            }
        }
        handle
    }

    /// Forget a closed socket
    ///
    /// Returns `true` when the owning user went offline. Unknown and
    /// superseded connections are a no-op.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.state.write().await;
        match state.unregister(id) {
            Some(user) => {
                tracing::info!("[Relay] {} disconnected", user);
                let event = ServerEvent::user_status(user, PresenceStatus::Offline);
                broadcast_event(state.connections(), &event);
                true
            }
            None => {
                tracing::debug!("[Relay] Connection {} closed without presence change", id);
                false
            }
        }
    }

    /// Record which conversation a user has open
    ///
    /// Only an identified connection may set its owner's entry, and only
    /// while that owner is online, so every entry is cleared by a disconnect.
    pub async fn set_active_chat(
        &self,
        from: &ConnectionHandle,
        chat: ActiveChat,
    ) -> Result<(), SharedError> {
        if from.is_anonymous() {
            return Err(SharedError::anonymous("active_chat"));
        }
        let user = required("userId", &chat.user_id)?;
        check_identity(from, user)?;
        let peer = chat
            .active_user_id
            .as_deref()
            .map(str::trim)
            .filter(|peer| !peer.is_empty())
            .map(str::to_string);

        let mut state = self.state.write().await;
        if !state.is_online(user) {
            return Err(SharedError::validation("userId", "user is not connected"));
        }
        tracing::debug!("[Relay] {} is viewing {:?}", user, peer);
        state.set_active_chat(user, peer);
        Ok(())
    }

    /// Forward a message and decide whether to notify the receiver
    pub async fn route_message(&self, message: ChatMessage) -> Result<RouteOutcome, SharedError> {
        let sender = required("sender_id", &message.sender_id)?.to_string();
        let receiver = required("receiver_id", &message.receiver_id)?.to_string();

        let (forwarded, viewing_sender) = {
            let state = self.state.read().await;
            let forwarded = state
                .connection_for(&receiver)
                .map(|connection| {
                    connection.try_deliver(ServerEvent::MessageReceived(message.clone()))
                })
                .unwrap_or(false);
            let viewing_sender = state.is_online(&receiver)
                && state.active_chat(&receiver) == Some(sender.as_str());
            (forwarded, viewing_sender)
        };

        let mut outcome = RouteOutcome::delivered(usize::from(forwarded));
        if viewing_sender {
            tracing::debug!(
                "[Relay] {} is viewing {}, skipping notification",
                receiver,
                sender
            );
            return Ok(outcome);
        }

        let notification = self.build_notification(&message).await;
        outcome.notified = self.dispatch(&receiver, &notification).await;
        Ok(outcome)
    }

    /// Relay read receipts
    pub async fn route_seen_status(
        &self,
        from: &ConnectionHandle,
        seen: SeenStatus,
    ) -> Result<RouteOutcome, SharedError> {
        required("seenBy", &seen.seen_by)?;
        let target = seen.receiver_id.clone();
        let recipients = self
            .fan_out(from, target.as_deref(), ServerEvent::MessageSeen(seen))
            .await;
        Ok(RouteOutcome::delivered(recipients))
    }

    /// Relay a deletion
    pub async fn route_message_deleted(
        &self,
        from: &ConnectionHandle,
        deleted: MessageDeleted,
    ) -> Result<RouteOutcome, SharedError> {
        if deleted.message_id.is_blank() {
            return Err(SharedError::validation("messageId", "must not be empty"));
        }
        required("deletedBy", &deleted.deleted_by)?;
        let target = deleted.receiver_id.clone();
        let recipients = self
            .fan_out(from, target.as_deref(), ServerEvent::MessageDeleted(deleted))
            .await;
        Ok(RouteOutcome::delivered(recipients))
    }

    /// Forward a typing indicator to its receiver only
    pub async fn route_typing(&self, typing: TypingStatus) -> Result<bool, SharedError> {
        required("senderId", &typing.sender_id)?;
        let receiver = required("receiverId", &typing.receiver_id)?;

        let event = ServerEvent::UserTyping(UserTyping {
            sender_id: typing.sender_id.clone(),
            is_typing: typing.is_typing,
        });
        let state = self.state.read().await;
        Ok(state
            .connection_for(receiver)
            .map(|connection| connection.try_deliver(event))
            .unwrap_or(false))
    }

    /// Entry point for every decoded client frame
    ///
    /// Events claiming to speak for a user other than the connection's owner
    /// are rejected; anonymous connections are trusted as-is.
    pub async fn handle_client_event(
        &self,
        from: &ConnectionHandle,
        event: ClientEvent,
    ) -> Result<RouteOutcome, SharedError> {
        tracing::debug!("[Relay] {} from connection {}", event.name(), from.id());
        match event {
            ClientEvent::ActiveChat(chat) => {
                self.set_active_chat(from, chat).await?;
                Ok(RouteOutcome::default())
            }
            ClientEvent::NewMessage(message) => {
                check_identity(from, &message.sender_id)?;
                self.route_message(message).await
            }
            ClientEvent::MessagesSeen(seen) => {
                check_identity(from, &seen.seen_by)?;
                self.route_seen_status(from, seen).await
            }
            ClientEvent::DeleteMessage(deleted) => {
                check_identity(from, &deleted.deleted_by)?;
                self.route_message_deleted(from, deleted).await
            }
            ClientEvent::Typing(typing) => {
                check_identity(from, &typing.sender_id)?;
                let forwarded = self.route_typing(typing).await?;
                Ok(RouteOutcome::delivered(usize::from(forwarded)))
            }
        }
    }

    pub async fn is_online(&self, user: &str) -> bool {
        self.state.read().await.is_online(user)
    }

    pub async fn active_chat(&self, user: &str) -> Option<UserId> {
        self.state.read().await.active_chat(user).map(str::to_string)
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connection_count()
    }

    pub async fn online_count(&self) -> usize {
        self.state.read().await.online_count()
    }

    pub fn client_url(&self) -> &str {
        &self.client_url
    }

    /// Deliver to the named counterpart, or to every connection but the sender's
    async fn fan_out(
        &self,
        from: &ConnectionHandle,
        target: Option<&str>,
        event: ServerEvent,
    ) -> usize {
        let state = self.state.read().await;
        let target = target.map(str::trim).filter(|target| !target.is_empty());
        match target {
            Some(receiver) => state
                .connection_for(receiver)
                .filter(|connection| connection.id() != from.id())
                .map(|connection| usize::from(connection.try_deliver(event)))
                .unwrap_or(0),
            None => broadcast_event(
                state
                    .connections()
                    .filter(|connection| connection.id() != from.id()),
                &event,
            ),
        }
    }

    async fn build_notification(&self, message: &ChatMessage) -> Notification {
        let title = match message.sender_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .lookup_display_name(&message.sender_id)
                .await
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        };

        let body = if message.is_image() {
            IMAGE_BODY.to_string()
        } else {
            let preview = message.preview(PREVIEW_LEN);
            if preview.is_empty() {
                EMPTY_BODY.to_string()
            } else {
                preview
            }
        };

        Notification {
            title,
            body,
            url: format!("{}?chat={}", self.client_url, message.sender_id),
        }
    }

    async fn lookup_display_name(&self, user: &str) -> Option<String> {
        let profiles = self.profiles.as_ref()?;
        match profiles.lookup(user).await {
            Ok(profile) => profile.and_then(|profile| profile.display_name()),
            Err(e) => {
                tracing::warn!("[Relay] Profile lookup for {} failed: {}", user, e);
                None
            }
        }
    }

    /// Returns `true` when the dispatcher accepted the notification
    async fn dispatch(&self, recipient: &str, notification: &Notification) -> bool {
        match self.dispatcher.notify(recipient, notification).await {
            Ok(DispatchOutcome::Delivered) => true,
            Ok(DispatchOutcome::NoSubscription) => false,
            Err(DispatchError::SubscriptionExpired) => {
                tracing::info!(
                    "[Relay] Push subscription for {} expired, forgetting it",
                    recipient
                );
                self.dispatcher.forget_subscription(recipient).await;
                false
            }
            Err(e) => {
                tracing::error!("[Relay] Notification to {} failed: {}", recipient, e);
                false
            }
        }
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, SharedError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SharedError::validation(field, "must not be empty"));
    }
    Ok(value)
}

fn check_identity(from: &ConnectionHandle, claimed: &str) -> Result<(), SharedError> {
    match from.user_id() {
        Some(owner) if owner != claimed.trim() => Err(SharedError::identity(owner, claimed)),
        _ => Ok(()),
    }
}
