//! Infrastructure adapters behind the ports.

pub mod transport;
pub mod websocket;
