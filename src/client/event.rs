//! Events observable on the client channel.

use crate::protocol::ServerEvent;

/// Everything a subscription can observe: server messages plus the
/// channel's own lifecycle under the conventional names `connect`,
/// `connect_error` and `disconnect`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The channel reached the connected state.
    Connected,
    /// A connection attempt failed.
    ConnectError { message: String },
    /// The channel left the connected state.
    Disconnected,
    /// A message arrived from the server.
    Message(ServerEvent),
}

impl ChannelEvent {
    /// Subscription key for this event.
    pub fn name(&self) -> &str {
        match self {
            ChannelEvent::Connected => "connect",
            ChannelEvent::ConnectError { .. } => "connect_error",
            ChannelEvent::Disconnected => "disconnect",
            ChannelEvent::Message(event) => event.name(),
        }
    }
}
