//! Transport port - dialing seam for the client channel.
//!
//! The channel's reconnection state machine is transport-agnostic; it talks
//! to the server through this pair of traits. The websocket adapter is the
//! production implementation, the loopback adapter backs the tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{ClientRequest, ServerEvent};

/// Failures raised by a transport. None is fatal to the process; the
/// channel records the message, surfaces it as connection status and
/// schedules a retry.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The endpoint could not be reached or refused the handshake.
    #[error("failed to reach {endpoint}: {reason}")]
    Dial { endpoint: String, reason: String },

    /// The connection closed while a send was in flight.
    #[error("connection closed: {0}")]
    Closed(String),

    /// A request could not be encoded for the wire.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The underlying transport rejected a send.
    #[error("failed to send request: {0}")]
    Send(String),
}

/// Dials the server, yielding the two halves of one logical connection.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn dial(&self)
        -> Result<(Box<dyn MessageSink>, Box<dyn EventStream>), TransportError>;
}

/// Outbound half: carries client requests to the server.
#[async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, request: &ClientRequest) -> Result<(), TransportError>;

    /// Graceful teardown of the local side.
    async fn close(&mut self);
}

/// Inbound half: yields server events until the connection closes.
#[async_trait]
pub trait EventStream: Send {
    /// Next event, or `None` once the connection is gone.
    async fn next(&mut self) -> Option<ServerEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_transport_object_safe(_: &dyn Transport) {}

    #[test]
    fn errors_render_their_context() {
        let err = TransportError::Dial {
            endpoint: "ws://localhost:8081/live".to_string(),
            reason: "connection refused".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("ws://localhost:8081/live"));
        assert!(text.contains("connection refused"));
    }
}
