//! GridPulse - live power-grid telemetry distribution.
//!
//! The server side simulates grid telemetry and fans it out to dashboard
//! clients over WebSocket; the client side is an auto-reconnecting
//! channel with an outbound queue, a subscription registry and the view
//! models the dashboard widgets read from.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
pub mod protocol;
