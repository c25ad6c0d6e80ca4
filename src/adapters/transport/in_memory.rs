//! Loopback transport: client channel wired straight into the server
//! core, no network. Backs the integration tests; the failure knobs
//! simulate a refused dial and a server-side drop.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::adapters::websocket::Hub;
use crate::application::{EventRouter, RouterReply};
use crate::ports::{EventStream, MessageSink, Transport, TransportError};
use crate::protocol::{ClientRequest, ServerEvent};

/// The in-process server core a loopback connection talks to.
pub struct LoopbackServer {
    pub hub: Arc<Hub>,
    pub router: Arc<EventRouter>,
}

impl LoopbackServer {
    pub fn new(hub: Arc<Hub>, router: Arc<EventRouter>) -> Self {
        Self { hub, router }
    }
}

impl Default for LoopbackServer {
    fn default() -> Self {
        Self::new(Arc::new(Hub::default()), Arc::new(EventRouter::default()))
    }
}

/// Transport over a [`LoopbackServer`].
///
/// Clones share the failure knobs, so a test can hold one handle while
/// the channel dials through another.
#[derive(Clone)]
pub struct LoopbackTransport {
    server: Arc<LoopbackServer>,
    refuse: Arc<AtomicBool>,
    kick: broadcast::Sender<()>,
    connections: Arc<AtomicUsize>,
}

impl LoopbackTransport {
    pub fn new(server: Arc<LoopbackServer>) -> Self {
        let (kick, _) = broadcast::channel(8);
        Self {
            server,
            refuse: Arc::new(AtomicBool::new(false)),
            kick,
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// While set, dials fail as if the server refused the connection.
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Drops every live connection, as an unexpected server-side close.
    pub fn kick_all(&self) {
        let _ = self.kick.send(());
    }

    /// Number of currently live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn dial(
        &self,
    ) -> Result<(Box<dyn MessageSink>, Box<dyn EventStream>), TransportError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Dial {
                endpoint: "loopback".to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (unicast_tx, unicast_rx) = mpsc::unbounded_channel();
        let broadcasts = self.server.hub.sender().subscribe();

        self.connections.fetch_add(1, Ordering::SeqCst);
        let guard = ConnectionGuard {
            connections: Arc::clone(&self.connections),
        };

        Ok((
            Box::new(LoopbackSink {
                router: Arc::clone(&self.server.router),
                hub: Arc::clone(&self.server.hub),
                unicast_tx,
                closed: false,
            }),
            Box::new(LoopbackStream {
                unicast_rx,
                broadcasts,
                kick: self.kick.subscribe(),
                _guard: guard,
            }),
        ))
    }
}

struct ConnectionGuard {
    connections: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections.fetch_sub(1, Ordering::SeqCst);
    }
}

struct LoopbackSink {
    router: Arc<EventRouter>,
    hub: Arc<Hub>,
    unicast_tx: mpsc::UnboundedSender<ServerEvent>,
    closed: bool,
}

#[async_trait]
impl MessageSink for LoopbackSink {
    async fn send(&mut self, request: &ClientRequest) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed("sink closed".to_string()));
        }
        match self.router.handle(request.clone()).await {
            RouterReply::None => {}
            RouterReply::Unicast(event) => {
                if self.unicast_tx.send(event).is_err() {
                    return Err(TransportError::Closed("stream dropped".to_string()));
                }
            }
            RouterReply::Broadcast(event) => self.hub.broadcast(event),
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

struct LoopbackStream {
    unicast_rx: mpsc::UnboundedReceiver<ServerEvent>,
    broadcasts: broadcast::Receiver<ServerEvent>,
    kick: broadcast::Receiver<()>,
    _guard: ConnectionGuard,
}

#[async_trait]
impl EventStream for LoopbackStream {
    async fn next(&mut self) -> Option<ServerEvent> {
        loop {
            tokio::select! {
                reply = self.unicast_rx.recv() => return reply,
                broadcasted = self.broadcasts.recv() => match broadcasted {
                    Ok(event) => return Some(event),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
                _ = self.kick.recv() => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_dial_reports_a_dial_error() {
        let transport = LoopbackTransport::new(Arc::new(LoopbackServer::default()));
        transport.set_refuse(true);
        match transport.dial().await {
            Err(TransportError::Dial { reason, .. }) => {
                assert!(reason.contains("refused"));
            }
            other => panic!("expected dial error, got {:?}", other.is_ok()),
        }
        assert_eq!(transport.connection_count(), 0);
    }

    #[tokio::test]
    async fn request_flows_to_the_router_and_back() {
        let transport = LoopbackTransport::new(Arc::new(LoopbackServer::default()));
        let (mut sink, mut stream) = transport.dial().await.unwrap();

        sink.send(&ClientRequest::RequestAlarmHistory).await.unwrap();
        match stream.next().await {
            Some(ServerEvent::AlarmHistory { alarms }) => assert!(alarms.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn kick_ends_the_stream() {
        let transport = LoopbackTransport::new(Arc::new(LoopbackServer::default()));
        let (_sink, mut stream) = transport.dial().await.unwrap();
        assert_eq!(transport.connection_count(), 1);

        transport.kick_all();
        assert!(stream.next().await.is_none());

        drop(stream);
        assert_eq!(transport.connection_count(), 0);
    }

    #[tokio::test]
    async fn closed_sink_rejects_sends() {
        let transport = LoopbackTransport::new(Arc::new(LoopbackServer::default()));
        let (mut sink, _stream) = transport.dial().await.unwrap();
        sink.close().await;
        assert!(sink.send(&ClientRequest::RequestAlarmHistory).await.is_err());
    }
}
