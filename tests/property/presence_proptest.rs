//! Property-based tests for the presence registry
//!
//! Drives `RelayState` with random connect/disconnect sequences and checks
//! it against a simple history of which connection each user opened last.

#[cfg(feature = "ssr")]
mod tests {
    use std::collections::HashMap;

    use chatwire::backend::realtime::registry::RelayState;
    use chatwire::backend::realtime::{ConnectionHandle, ConnectionId};
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    const USERS: [&str; 3] = ["a", "b", "c"];

    #[derive(Debug, Clone)]
    enum Op {
        /// Connect as `USERS[i]`, or anonymously for `None`
        Connect(Option<usize>),
        /// Close the live connection at this index (modulo live count)
        Disconnect(usize),
        /// Open a chat with `USERS[peer]` as `USERS[user]`
        View { user: usize, peer: usize },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => prop::option::weighted(0.8, 0..USERS.len()).prop_map(Op::Connect),
            2 => any::<usize>().prop_map(Op::Disconnect),
            1 => (0..USERS.len(), 0..USERS.len()).prop_map(|(user, peer)| Op::View { user, peer }),
        ]
    }

    fn handle(user: Option<&str>) -> ConnectionHandle {
        let (tx, _rx) = mpsc::channel(1);
        ConnectionHandle::new(user.map(str::to_string), tx)
    }

    proptest! {
        #[test]
        fn prop_presence_follows_newest_connection(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let mut state = RelayState::new();
            let mut live: Vec<(ConnectionId, Option<&str>)> = Vec::new();
            let mut newest: HashMap<&str, ConnectionId> = HashMap::new();

            for op in ops {
                match op {
                    Op::Connect(user) => {
                        let user = user.map(|i| USERS[i]);
                        let connection = handle(user);
                        if let Some(user) = user {
                            newest.insert(user, connection.id());
                        }
                        live.push((connection.id(), user));
                        state.register(connection);
                    }
                    Op::Disconnect(index) => {
                        if live.is_empty() {
                            continue;
                        }
                        let (id, user) = live.remove(index % live.len());
                        let offline = state.unregister(id);
                        let was_newest = user.map_or(false, |user| newest.get(user) == Some(&id));
                        prop_assert_eq!(offline.is_some(), was_newest);
                    }
                    Op::View { user, peer } => {
                        if state.is_online(USERS[user]) {
                            state.set_active_chat(USERS[user], Some(USERS[peer].to_string()));
                        }
                    }
                }

                prop_assert_eq!(state.connection_count(), live.len());
                for user in USERS {
                    let expected = newest
                        .get(user)
                        .filter(|id| live.iter().any(|(live_id, _)| live_id == *id));
                    prop_assert_eq!(state.is_online(user), expected.is_some());
                    prop_assert_eq!(state.connection_for(user).map(|c| c.id()), expected.copied());
                    if !state.is_online(user) {
                        prop_assert_eq!(state.active_chat(user), None);
                    }
                }
            }
        }

        #[test]
        fn prop_stale_disconnect_keeps_newer_entry(reconnects in 1usize..8) {
            let mut state = RelayState::new();
            let connections: Vec<ConnectionHandle> = (0..=reconnects).map(|_| handle(Some("a"))).collect();
            for connection in &connections {
                state.register(connection.clone());
            }
            let (current, stale) = connections.split_last().unwrap();

            for connection in stale {
                prop_assert_eq!(state.unregister(connection.id()), None);
                prop_assert_eq!(state.connection_for("a").map(|c| c.id()), Some(current.id()));
            }
            prop_assert_eq!(state.unregister(current.id()), Some("a".to_string()));
            prop_assert_eq!(state.online_count(), 0);
        }
    }
}
