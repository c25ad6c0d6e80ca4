//! Client transport adapters: the WebSocket dialer and the in-memory
//! loopback used by tests.

mod in_memory;
mod websocket;

pub use in_memory::{LoopbackServer, LoopbackTransport};
pub use websocket::WsTransport;
