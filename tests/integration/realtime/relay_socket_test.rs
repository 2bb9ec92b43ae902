//! Relay routing over real WebSocket connections

#[cfg(feature = "ssr")]
mod tests {
    use std::time::Duration;

    use chatwire::shared::event::{MessageDeleted, SeenStatus, UserTyping};
    use chatwire::shared::{ClientEvent, MessageId, PresenceStatus, ServerEvent};
    use pretty_assertions::assert_eq;

    use crate::assert_presence;
    use crate::common::*;

    const QUIET: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_viewing_receiver_is_not_notified() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;
        let (a, b) = clients.split_at_mut(1);
        let (a, b) = (&mut a[0], &mut b[0]);

        send_event(b, &viewing("b", Some("a"))).await;
        wait_until(|| async { server.relay.active_chat("b").await.as_deref() == Some("a") }).await;

        let message = text_message("a", "b", "hi");
        send_event(a, &ClientEvent::NewMessage(message.clone())).await;

        assert_eq!(next_event(b).await, ServerEvent::MessageReceived(message));
        tokio::time::sleep(QUIET).await;
        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_receiver_without_active_chat_is_notified() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        send_event(&mut clients[0], &new_message("a", "b", "hi")).await;
        assert!(matches!(
            next_event(&mut clients[1]).await,
            ServerEvent::MessageReceived(_)
        ));

        wait_until(|| async { dispatcher.calls().len() == 1 }).await;
        let (recipient, notification) = dispatcher.calls().remove(0);
        assert_eq!(recipient, "b");
        assert_eq!(notification.title, "New Message");
        assert_eq!(notification.body, "hi");
        assert!(notification.url.ends_with("?chat=a"));
    }

    #[tokio::test]
    async fn test_receiver_viewing_someone_else_is_notified() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        send_event(&mut clients[1], &viewing("b", Some("c"))).await;
        wait_until(|| async { server.relay.active_chat("b").await.as_deref() == Some("c") }).await;

        let message = text_message("a", "b", "hi").with_sender_name("Alice");
        send_event(&mut clients[0], &ClientEvent::NewMessage(message)).await;

        wait_until(|| async { dispatcher.calls().len() == 1 }).await;
        let (recipient, notification) = dispatcher.calls().remove(0);
        assert_eq!(recipient, "b");
        assert_eq!(notification.title, "Alice");
    }

    #[tokio::test]
    async fn test_offline_receiver_is_notified() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        let b = clients.pop().unwrap();
        drop(b);
        assert_presence!(next_event(&mut clients[0]).await, "b", PresenceStatus::Offline);

        send_event(&mut clients[0], &new_message("a", "b", "are you there?")).await;
        wait_until(|| async { dispatcher.recipients() == vec!["b".to_string()] }).await;
    }

    #[tokio::test]
    async fn test_expired_subscription_is_not_retried() {
        let (server, dispatcher) = spawn_relay().await;
        dispatcher.subscribe("b");
        dispatcher.expire("b");
        let mut a = connect_ws(&server, Some("a")).await;

        send_event(&mut a, &new_message("a", "b", "one")).await;
        send_event(&mut a, &new_message("a", "b", "two")).await;

        wait_until(|| async { dispatcher.calls().len() == 2 }).await;
        assert_eq!(dispatcher.push_attempts(), 1);
    }

    #[tokio::test]
    async fn test_typing_reaches_only_the_receiver() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b", "c"]).await;

        send_event(&mut clients[0], &typing("a", "b", true)).await;

        assert_eq!(
            next_event(&mut clients[1]).await,
            ServerEvent::UserTyping(UserTyping {
                sender_id: "a".to_string(),
                is_typing: true,
            })
        );
        expect_silence(&mut clients[2], QUIET).await;
        expect_silence(&mut clients[0], QUIET).await;
    }

    #[tokio::test]
    async fn test_typing_to_offline_user_is_dropped() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "c"]).await;

        send_event(&mut clients[0], &typing("a", "b", true)).await;

        expect_silence(&mut clients[1], QUIET).await;
        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_seen_status_targets_receiver() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b", "c"]).await;

        let seen = SeenStatus {
            message_ids: vec![MessageId::from("m1"), MessageId::Number(2)],
            seen_by: "b".to_string(),
            receiver_id: Some("a".to_string()),
        };
        send_event(&mut clients[1], &ClientEvent::MessagesSeen(seen.clone())).await;

        assert_eq!(next_event(&mut clients[0]).await, ServerEvent::MessageSeen(seen));
        expect_silence(&mut clients[2], QUIET).await;
    }

    #[tokio::test]
    async fn test_untargeted_delete_is_broadcast_to_others() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b", "c"]).await;

        let deleted = MessageDeleted {
            message_id: MessageId::from("m1"),
            deleted_by: "a".to_string(),
            receiver_id: None,
        };
        send_event(&mut clients[0], &ClientEvent::DeleteMessage(deleted.clone())).await;

        let expected = ServerEvent::MessageDeleted(deleted);
        assert_eq!(next_event(&mut clients[1]).await, expected);
        assert_eq!(next_event(&mut clients[2]).await, expected);
        expect_silence(&mut clients[0], QUIET).await;
    }

    #[tokio::test]
    async fn test_spoofed_sender_is_dropped() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        send_event(&mut clients[0], &new_message("b", "a", "not me")).await;
        send_event(&mut clients[0], &typing("b", "a", true)).await;

        expect_silence(&mut clients[0], QUIET).await;
        assert!(dispatcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_frame_keeps_connection_open() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        send_raw(&mut clients[0], "not json").await;
        send_raw(&mut clients[0], r#"{"event":"unknown","data":{}}"#).await;
        send_event(&mut clients[0], &typing("a", "b", false)).await;

        assert!(matches!(
            next_event(&mut clients[1]).await,
            ServerEvent::UserTyping(UserTyping { is_typing: false, .. })
        ));
        assert!(server.relay.is_online("a").await);
    }

    #[tokio::test]
    async fn test_anonymous_connection_observes_presence() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut observer = connect_ws(&server, None).await;
        wait_until(|| async { server.relay.connection_count().await == 1 }).await;
        assert_eq!(server.relay.online_count().await, 0);

        let a = connect_ws(&server, Some("a")).await;
        assert_presence!(next_event(&mut observer).await, "a", PresenceStatus::Online);

        drop(a);
        assert_presence!(next_event(&mut observer).await, "a", PresenceStatus::Offline);
    }

    #[tokio::test]
    async fn test_anonymous_active_chat_does_not_silence_receiver() {
        let (server, dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;
        let mut anonymous = connect_ws(&server, None).await;

        send_event(&mut anonymous, &viewing("b", Some("a"))).await;
        send_event(&mut clients[0], &new_message("a", "b", "still there?")).await;

        assert!(matches!(
            next_event(&mut clients[1]).await,
            ServerEvent::MessageReceived(_)
        ));
        wait_until(|| async { dispatcher.recipients() == vec!["b".to_string()] }).await;
        assert_eq!(server.relay.active_chat("b").await, None);
    }

    #[tokio::test]
    async fn test_reconnect_takes_over_presence() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut a = connect_ws(&server, Some("a")).await;
        let old_b = connect_ws(&server, Some("b")).await;
        assert_presence!(next_event(&mut a).await, "b", PresenceStatus::Online);

        let mut new_b = connect_ws(&server, Some("b")).await;
        assert_presence!(next_event(&mut a).await, "b", PresenceStatus::Online);
        assert_eq!(server.relay.connection_count().await, 3);

        let message = text_message("a", "b", "which one?");
        send_event(&mut a, &ClientEvent::NewMessage(message.clone())).await;
        assert_eq!(next_event(&mut new_b).await, ServerEvent::MessageReceived(message));

        // the superseded socket closing must not take b offline
        drop(old_b);
        wait_until(|| async { server.relay.connection_count().await == 2 }).await;
        assert!(server.relay.is_online("b").await);
        expect_silence(&mut a, QUIET).await;

        drop(new_b);
        assert_presence!(next_event(&mut a).await, "b", PresenceStatus::Offline);
        assert!(!server.relay.is_online("b").await);
    }

    #[tokio::test]
    async fn test_disconnect_clears_active_chat() {
        let (server, _dispatcher) = spawn_relay().await;
        let mut clients = connect_all(&server, &["a", "b"]).await;

        send_event(&mut clients[1], &viewing("b", Some("a"))).await;
        wait_until(|| async { server.relay.active_chat("b").await.is_some() }).await;

        send_event(&mut clients[1], &viewing("b", None)).await;
        wait_until(|| async { server.relay.active_chat("b").await.is_none() }).await;

        send_event(&mut clients[1], &viewing("b", Some("a"))).await;
        wait_until(|| async { server.relay.active_chat("b").await.is_some() }).await;

        let b = clients.pop().unwrap();
        drop(b);
        assert_presence!(next_event(&mut clients[0]).await, "b", PresenceStatus::Offline);
        assert_eq!(server.relay.active_chat("b").await, None);
    }
}
