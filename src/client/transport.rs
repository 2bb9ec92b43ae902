/**
 * Agent Transport
 *
 * A `Connector` opens one connection to the relay and hands back a `Link`: a
 * bounded sender for outgoing client events and a receiver of decoded server
 * events. The receiver closing is how the agent learns the connection dropped.
 *
 * `WsConnector` is the production connector, speaking the relay's JSON
 * WebSocket protocol through tokio-tungstenite. Tests substitute in-memory
 * connectors.
 */

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::client::error::AgentError;
use crate::shared::{AgentConfig, ClientEvent, ServerEvent};

/// Both directions of one live connection
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::Sender<ClientEvent>,
    pub inbound: mpsc::Receiver<ServerEvent>,
}

#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection identified as `user_id`
    async fn connect(&self, user_id: &str) -> Result<Link, AgentError>;
}

/// WebSocket connector for `GET /socket?userId=<id>`
#[derive(Debug, Clone)]
pub struct WsConnector {
    config: AgentConfig,
}

impl WsConnector {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self { config })
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, user_id: &str) -> Result<Link, AgentError> {
        let url = self.config.socket_url(user_id)?;
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| AgentError::Connect(e.to_string()))?;
        tracing::info!("[Agent] Connected to {}", url);

        let capacity = self.config.outbound_capacity;
        let (outbound, mut outbound_rx) = mpsc::channel::<ClientEvent>(capacity);
        let (inbound_tx, inbound) = mpsc::channel::<ServerEvent>(capacity);
        let (mut write, mut read) = stream.split();

        tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("[Agent] Failed to encode {}: {}", event.name(), e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    tracing::debug!("[Agent] Socket write failed: {}", e);
                    return;
                }
            }
            // the agent dropped its sender, close politely
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => match ServerEvent::from_json(text.as_str()) {
                        Ok(event) => {
                            if inbound_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("[Agent] Dropping undecodable frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("[Agent] Socket error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Link { outbound, inbound })
    }
}
