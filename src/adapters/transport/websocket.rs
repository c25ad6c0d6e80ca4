//! Production transport: a WebSocket connection to the live endpoint.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::ports::{EventStream, MessageSink, Transport, TransportError};
use crate::protocol::{ClientRequest, ServerEvent};

type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials a `ws://` or `wss://` endpoint and speaks JSON text frames.
pub struct WsTransport {
    endpoint: String,
}

impl WsTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn dial(
        &self,
    ) -> Result<(Box<dyn MessageSink>, Box<dyn EventStream>), TransportError> {
        let (connection, _response) =
            connect_async(&self.endpoint)
                .await
                .map_err(|error| TransportError::Dial {
                    endpoint: self.endpoint.clone(),
                    reason: error.to_string(),
                })?;
        tracing::debug!(endpoint = %self.endpoint, "websocket connected");

        let (sink, stream) = connection.split();
        Ok((Box::new(WsSink { sink }), Box::new(WsEvents { stream })))
    }
}

struct WsSink {
    sink: SplitSink<WsConnection, Message>,
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send(&mut self, request: &ClientRequest) -> Result<(), TransportError> {
        let json = serde_json::to_string(request)
            .map_err(|error| TransportError::Encode(error.to_string()))?;
        self.sink
            .send(Message::Text(json))
            .await
            .map_err(|error| TransportError::Send(error.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

struct WsEvents {
    stream: SplitStream<WsConnection>,
}

#[async_trait]
impl EventStream for WsEvents {
    async fn next(&mut self) -> Option<ServerEvent> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => return Some(event),
                    Err(error) => {
                        // Unknown payloads deserialize into the fallback
                        // variant, so this only fires on malformed JSON.
                        tracing::debug!(%error, "discarding malformed frame");
                    }
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(error) => {
                    tracing::debug!(%error, "websocket read error, treating as closed");
                    return None;
                }
            }
        }
        None
    }
}
