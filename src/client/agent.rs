//! # Client Realtime Agent
//!
//! Owns one relay connection per session and keeps it alive across drops.
//!
//! ## Lifecycle
//!
//! - `reinitialize(user_id)` makes the first attempt inline, then hands the
//!   connection to a supervisor task that forwards inbound events and
//!   reconnects with linear backoff
//! - once the retry budget is spent the supervisor exits and the agent stays
//!   `Disconnected` until the next `reinitialize`
//! - `teardown()` cancels the supervisor and drops the connection
//!
//! Every `reinitialize`/`teardown` bumps a generation counter; a supervisor
//! from an older generation notices and exits without touching the session.
//!
//! ## Emitting
//!
//! The `emit_*` helpers never wait. They return `false` when the agent is not
//! connected or the outbound queue is full; the event is then lost and the
//! caller's durable write path is what counts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::client::error::AgentError;
use crate::client::reconnect::{
    ConnectionMachine, ConnectionState, ReconnectPolicy, RetryDecision,
};
use crate::client::transport::{Connector, Link, WsConnector};
use crate::shared::event::{ActiveChat, MessageDeleted, SeenStatus, TypingStatus};
use crate::shared::{AgentConfig, ChatMessage, ClientEvent, MessageId, ServerEvent, UserId};

/// Inbound events buffered per subscriber
pub const EVENT_BUFFER: usize = 256;

struct Session {
    machine: ConnectionMachine,
    user_id: Option<UserId>,
    outbound: Option<mpsc::Sender<ClientEvent>>,
    supervisor: Option<JoinHandle<()>>,
    generation: u64,
}

struct Inner<C> {
    connector: C,
    session: Mutex<Session>,
    events: broadcast::Sender<ServerEvent>,
}

/// Result of one connect attempt
enum Step {
    Connected(mpsc::Receiver<ServerEvent>),
    Retry(RetryDecision),
    Stale,
}

impl<C> Inner<C> {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` on the session if `generation` is still current
    fn with_current<T>(&self, generation: u64, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut session = self.session();
        if session.generation != generation {
            return None;
        }
        Some(f(&mut session))
    }
}

pub struct RealtimeAgent<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for RealtimeAgent<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl RealtimeAgent<WsConnector> {
    /// Agent speaking WebSocket to the relay described by `config`
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let policy = ReconnectPolicy::from_config(&config);
        Ok(Self::new(WsConnector::new(config)?, policy))
    }
}

impl<C: Connector> RealtimeAgent<C> {
    pub fn new(connector: C, policy: ReconnectPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                connector,
                session: Mutex::new(Session {
                    machine: ConnectionMachine::new(policy),
                    user_id: None,
                    outbound: None,
                    supervisor: None,
                    generation: 0,
                }),
                events,
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.session().machine.state()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner.session().user_id.clone()
    }

    pub fn connected_since(&self) -> Option<DateTime<Utc>> {
        self.inner.session().machine.connected_since()
    }

    /// Receive every server event from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.events.subscribe()
    }

    /// Connect as `user_id`, replacing any stale connection
    ///
    /// A no-op when already connected as the same user. Returns the state
    /// after the first attempt: `Connected`, or `Connecting` while retries
    /// are pending.
    pub async fn reinitialize(&self, user_id: &str) -> Result<ConnectionState, AgentError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AgentError::MissingIdentity);
        }

        let generation = {
            let mut session = self.inner.session();
            if session.machine.state() == ConnectionState::Connected
                && session.user_id.as_deref() == Some(user_id)
            {
                return Ok(ConnectionState::Connected);
            }
            reset_session(&mut session);
            session.user_id = Some(user_id.to_string());
            session.machine.begin_connect();
            session.generation
        };

        tracing::info!("[Agent] Connecting as {}", user_id);
        let step = attempt(&self.inner, generation, user_id).await;
        let supervisor = tokio::spawn(supervise(
            Arc::clone(&self.inner),
            generation,
            user_id.to_string(),
            step,
        ));

        let mut session = self.inner.session();
        if session.generation == generation {
            session.supervisor = Some(supervisor);
        } else {
            supervisor.abort();
        }
        Ok(session.machine.state())
    }

    /// Cancel reconnects and close the connection
    pub fn teardown(&self) {
        let mut session = self.inner.session();
        if session.user_id.is_some() {
            tracing::info!("[Agent] Tearing down connection");
        }
        reset_session(&mut session);
        session.user_id = None;
    }

    pub fn emit_new_message(&self, message: ChatMessage) -> bool {
        self.emit(ClientEvent::NewMessage(message))
    }

    pub fn emit_messages_seen<I>(&self, message_ids: I, receiver_id: Option<&str>) -> bool
    where
        I: IntoIterator,
        I::Item: Into<MessageId>,
    {
        let Some(seen_by) = self.user_id() else {
            return false;
        };
        self.emit(ClientEvent::MessagesSeen(SeenStatus {
            message_ids: message_ids.into_iter().map(Into::into).collect(),
            seen_by,
            receiver_id: receiver_id.map(str::to_string),
        }))
    }

    pub fn emit_message_deleted(
        &self,
        message_id: impl Into<MessageId>,
        receiver_id: Option<&str>,
    ) -> bool {
        let Some(deleted_by) = self.user_id() else {
            return false;
        };
        self.emit(ClientEvent::DeleteMessage(MessageDeleted {
            message_id: message_id.into(),
            deleted_by,
            receiver_id: receiver_id.map(str::to_string),
        }))
    }

    pub fn emit_typing(&self, receiver_id: &str, is_typing: bool) -> bool {
        let Some(sender_id) = self.user_id() else {
            return false;
        };
        self.emit(ClientEvent::Typing(TypingStatus {
            sender_id,
            receiver_id: receiver_id.to_string(),
            is_typing,
        }))
    }

    /// Tell the relay which conversation is open, `None` when none is
    pub fn emit_active_chat(&self, peer_id: Option<&str>) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        self.emit(ClientEvent::ActiveChat(ActiveChat {
            user_id,
            active_user_id: peer_id.map(str::to_string),
        }))
    }

    fn emit(&self, event: ClientEvent) -> bool {
        let session = self.inner.session();
        let Some(outbound) = session.outbound.as_ref() else {
            tracing::debug!("[Agent] Not connected, dropping {}", event.name());
            return false;
        };
        match outbound.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("[Agent] Outbound queue full, dropping {}", event.name());
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!("[Agent] Connection closed, dropping {}", event.name());
                false
            }
        }
    }
}

/// Invalidate the current connection and supervisor
fn reset_session(session: &mut Session) {
    session.generation += 1;
    if let Some(supervisor) = session.supervisor.take() {
        supervisor.abort();
    }
    session.outbound = None;
    session.machine.reset();
}

async fn attempt<C: Connector>(inner: &Inner<C>, generation: u64, user_id: &str) -> Step {
    let result = inner.connector.connect(user_id).await;
    inner
        .with_current(generation, |session| match result {
            Ok(Link { outbound, inbound }) => {
                session.machine.on_connected();
                session.outbound = Some(outbound);
                Step::Connected(inbound)
            }
            Err(e) => {
                tracing::warn!("[Agent] Connect attempt failed: {}", e);
                Step::Retry(session.machine.on_connect_failed())
            }
        })
        .unwrap_or(Step::Stale)
}

async fn supervise<C: Connector>(
    inner: Arc<Inner<C>>,
    generation: u64,
    user_id: UserId,
    mut step: Step,
) {
    loop {
        let decision = match step {
            Step::Stale => return,
            Step::Retry(decision) => decision,
            Step::Connected(mut inbound) => {
                while let Some(event) = inbound.recv().await {
                    // no subscribers is fine
                    let _ = inner.events.send(event);
                }
                tracing::warn!("[Agent] Connection to relay lost");
                let lost = inner.with_current(generation, |session| {
                    session.outbound = None;
                    session.machine.on_connection_lost()
                });
                match lost {
                    Some(decision) => decision,
                    None => return,
                }
            }
        };

        match decision {
            RetryDecision::GiveUp => {
                tracing::error!("[Agent] Giving up on the relay, reinitialize to retry");
                return;
            }
            RetryDecision::RetryAfter { attempt: n, delay } => {
                tracing::info!("[Agent] Reconnecting in {:?} (attempt {})", delay, n);
                tokio::time::sleep(delay).await;
                step = attempt(&inner, generation, &user_id).await;
            }
        }
    }
}
