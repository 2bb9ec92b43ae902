//! The client agent against a live relay

#[cfg(feature = "ssr")]
mod tests {
    use std::time::Duration;

    use chatwire::client::{ConnectionState, RealtimeAgent, WsConnector};
    use chatwire::shared::event::UserTyping;
    use chatwire::shared::{AgentConfig, PresenceStatus, ServerEvent};
    use pretty_assertions::assert_eq;
    use tokio::sync::broadcast;

    use crate::common::*;
    use crate::{assert_ok, assert_presence};

    fn agent_for(url: String) -> RealtimeAgent<WsConnector> {
        let config = assert_ok!(AgentConfig::builder()
            .server_url(url)
            .max_attempts(2)
            .base_delay(Duration::from_millis(10))
            .build());
        assert_ok!(RealtimeAgent::from_config(config))
    }

    async fn recv(events: &mut broadcast::Receiver<ServerEvent>) -> ServerEvent {
        let received = tokio::time::timeout(RECV_TIMEOUT, events.recv()).await;
        assert_ok!(assert_ok!(received, "timed out waiting for agent event"))
    }

    #[tokio::test]
    async fn test_agent_connects_and_sees_own_presence() {
        let (server, _dispatcher) = spawn_relay().await;
        let agent = agent_for(server.http_url());
        let mut events = agent.subscribe();

        let state = assert_ok!(agent.reinitialize("alice").await);

        assert_eq!(state, ConnectionState::Connected);
        assert_presence!(recv(&mut events).await, "alice", PresenceStatus::Online);
        assert!(server.relay.is_online("alice").await);
        assert!(agent.connected_since().is_some());
    }

    #[tokio::test]
    async fn test_agent_exchanges_typing_with_socket_client() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut bob = connect_ws(&server, Some("bob")).await;
        let agent = agent_for(server.http_url());
        let mut events = agent.subscribe();
        assert_ok!(agent.reinitialize("alice").await);
        assert_presence!(recv(&mut events).await, "alice", PresenceStatus::Online);
        assert_presence!(next_event(&mut bob).await, "alice", PresenceStatus::Online);

        assert!(agent.emit_typing("bob", true));
        assert_eq!(
            next_event(&mut bob).await,
            ServerEvent::UserTyping(UserTyping {
                sender_id: "alice".to_string(),
                is_typing: true,
            })
        );

        send_event(&mut bob, &typing("bob", "alice", false)).await;
        assert_eq!(
            recv(&mut events).await,
            ServerEvent::UserTyping(UserTyping {
                sender_id: "bob".to_string(),
                is_typing: false,
            })
        );
    }

    #[tokio::test]
    async fn test_agent_active_chat_suppresses_notification() {
        let (server, dispatcher) = spawn_relay().await;
        let mut bob = connect_ws(&server, Some("bob")).await;
        let agent = agent_for(server.http_url());
        let mut events = agent.subscribe();
        assert_ok!(agent.reinitialize("alice").await);
        assert_presence!(next_event(&mut bob).await, "alice", PresenceStatus::Online);
        assert_presence!(recv(&mut events).await, "alice", PresenceStatus::Online);

        assert!(agent.emit_active_chat(Some("bob")));
        wait_until(|| async { server.relay.active_chat("alice").await.as_deref() == Some("bob") })
            .await;

        let message = text_message("bob", "alice", "hello");
        send_event(&mut bob, &chatwire::shared::ClientEvent::NewMessage(message.clone())).await;

        assert_eq!(recv(&mut events).await, ServerEvent::MessageReceived(message));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_takes_user_offline() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut bob = connect_ws(&server, Some("bob")).await;
        let agent = agent_for(server.http_url());
        assert_ok!(agent.reinitialize("alice").await);
        assert_presence!(next_event(&mut bob).await, "alice", PresenceStatus::Online);

        agent.teardown();

        assert_presence!(next_event(&mut bob).await, "alice", PresenceStatus::Offline);
        assert_eq!(agent.state(), ConnectionState::Disconnected);
        assert!(!agent.emit_typing("bob", true));
    }

    #[tokio::test]
    async fn test_unreachable_relay_gives_up() {
        let listener = assert_ok!(tokio::net::TcpListener::bind("127.0.0.1:0").await);
        let addr = assert_ok!(listener.local_addr());
        drop(listener);

        let agent = agent_for(format!("http://{}", addr));
        let state = assert_ok!(agent.reinitialize("alice").await);
        assert_eq!(state, ConnectionState::Connecting);

        wait_until(|| async { agent.state() == ConnectionState::Disconnected }).await;
        assert_eq!(agent.user_id().as_deref(), Some("alice"));
        assert!(!agent.emit_typing("bob", true));
    }
}
