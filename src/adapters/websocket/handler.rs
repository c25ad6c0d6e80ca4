//! WebSocket upgrade handler for dashboard connections.
//!
//! Lifecycle per connection:
//! 1. Upgrade to WebSocket and join the hub
//! 2. Forward hub broadcasts and per-client replies to the socket
//! 3. Route incoming requests through the event router
//! 4. Leave the hub on disconnect

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::application::{EventRouter, RouterReply};
use crate::protocol::{ClientRequest, ServerEvent};

use super::hub::{ClientId, Hub};

/// State shared by every WebSocket connection.
#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<Hub>,
    pub router: Arc<EventRouter>,
}

impl WsState {
    pub fn new(hub: Arc<Hub>, router: Arc<EventRouter>) -> Self {
        Self { hub, router }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /live`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs for the lifetime of one connection.
async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();

    let client_id = ClientId::new();
    let mut hub_rx = state.hub.join(client_id).await;
    tracing::info!(client = %client_id, "client connected");

    // Per-client replies bypass the broadcast channel.
    let (unicast_tx, mut unicast_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                reply = unicast_rx.recv() => match reply {
                    Some(event) => event,
                    None => break,
                },
                broadcasted = hub_rx.recv() => match broadcasted {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(client = %client_id, missed, "client lagging, events dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };
            if let Err(error) = send_event(&mut sender, &event).await {
                tracing::debug!(client = %client_id, %error, "send failed, closing");
                break;
            }
        }
    });

    let router = Arc::clone(&state.router);
    let hub = Arc::clone(&state.hub);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientRequest>(&text) {
                    Ok(request) => {
                        tracing::debug!(client = %client_id, request = request.name(), "request");
                        match router.handle(request).await {
                            RouterReply::None => {}
                            RouterReply::Unicast(event) => {
                                if unicast_tx.send(event).is_err() {
                                    break;
                                }
                            }
                            RouterReply::Broadcast(event) => hub.broadcast(event),
                        }
                    }
                    Err(error) => {
                        tracing::debug!(client = %client_id, %error, "unparseable frame, ignoring");
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::warn!(client = %client_id, "binary frames not supported");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!(client = %client_id, "client sent close frame");
                    break;
                }
                Err(error) => {
                    tracing::debug!(client = %client_id, %error, "receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.leave(&client_id).await;
    tracing::info!(client = %client_id, "client disconnected");
}

async fn send_event(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event)
        .map_err(|e| axum::Error::new(format!("serialize event: {e}")))?;
    sender.send(Message::Text(json)).await
}

/// Router for the live WebSocket endpoint.
pub fn ws_router() -> axum::Router<WsState> {
    use axum::routing::get;

    axum::Router::new().route("/live", get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_state_shares_the_hub() {
        let hub = Arc::new(Hub::default());
        let router = Arc::new(EventRouter::default());
        let state = WsState::new(Arc::clone(&hub), router);
        assert!(Arc::ptr_eq(&state.hub, &hub));
    }

    #[test]
    fn ws_router_builds() {
        let _router = ws_router();
    }
}
