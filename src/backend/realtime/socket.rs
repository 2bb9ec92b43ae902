/**
 * Relay Socket Handler
 *
 * `GET /socket?userId=<id>` upgrades to a WebSocket and runs one connection
 * against the relay for its whole life.
 *
 * # Connection Tasks
 *
 * Each socket is split in two:
 *
 * - a writer task draining the connection's bounded outbound queue into the
 *   socket, one JSON text frame per `ServerEvent`
 * - the reader loop, decoding text frames into `ClientEvent`s and handing
 *   them to the relay
 *
 * A frame that cannot be decoded or routed is logged and dropped; the socket
 * stays open. When the reader ends (close frame, transport error, EOF) the
 * relay is told the connection is gone and the writer is aborted.
 */

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::backend::realtime::connection::normalize_identity;
use crate::backend::realtime::relay::Relay;
use crate::backend::server::config::ServerConfig;
use crate::shared::{ClientEvent, ServerEvent, UserId};

/// Handshake query string
#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Handle the WebSocket upgrade (GET /socket)
///
/// A missing or blank `userId` is accepted as an anonymous session.
pub async fn handle_socket_upgrade(
    ws: WebSocketUpgrade,
    State(relay): State<Relay>,
    State(config): State<Arc<ServerConfig>>,
    Query(query): Query<SocketQuery>,
) -> Response {
    let identity = normalize_identity(query.user_id.as_deref());
    let capacity = config.outbound_capacity;
    tracing::debug!("[Socket] Upgrade requested by {:?}", identity);

    ws.on_upgrade(move |socket| run_connection(socket, relay, identity, capacity))
}

/// Drive one socket until it closes
pub async fn run_connection(
    socket: WebSocket,
    relay: Relay,
    identity: Option<UserId>,
    capacity: usize,
) {
    let (outbound, mut outbound_rx) = mpsc::channel::<ServerEvent>(capacity);
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Socket] Failed to encode {}: {}", event.name(), e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let handle = relay.connect(identity, outbound).await;

    while let Some(frame) = ws_receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("[Socket] Connection {} transport error: {}", handle.id(), e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let event = match ClientEvent::from_json(text.as_str()) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(
                            "[Socket] Dropping undecodable frame from {}: {}",
                            handle.id(),
                            e
                        );
                        continue;
                    }
                };
                let name = event.name();
                if let Err(e) = relay.handle_client_event(&handle, event).await {
                    tracing::warn!("[Socket] Dropping {} from {}: {}", name, handle.id(), e);
                }
            }
            Message::Close(_) => break,
            // pings are answered by the transport
            _ => {}
        }
    }

    relay.disconnect(handle.id()).await;
    writer.abort();
    tracing::debug!("[Socket] Connection {} finished", handle.id());
}
