//! Server-side WebSocket adapter: connection hub and upgrade handler.

mod handler;
mod hub;

pub use handler::{ws_handler, ws_router, WsState};
pub use hub::{ClientId, Hub};
