//! Ports - interfaces between the channel core and the outside world.
//!
//! Following hexagonal architecture, ports define the contracts adapters
//! implement. The only port here is the transport seam: everything else in
//! the crate is either pure domain state or an adapter.

mod transport;

pub use transport::{EventStream, MessageSink, Transport, TransportError};
