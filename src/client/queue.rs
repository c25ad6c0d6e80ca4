//! Outbound queue: emits attempted before the channel is connected.
//!
//! Strict FIFO; entries are drained once per transition into the connected
//! state and sent before any later emit. An explicit disconnect clears the
//! queue, since it is scoped to the connection attempt, not durable.

use std::collections::VecDeque;

use crate::protocol::ClientRequest;

#[derive(Debug, Default)]
pub struct OutboundQueue {
    entries: VecDeque<ClientRequest>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the tail. No coalescing: duplicate requests stay
    /// duplicated.
    pub fn enqueue(&mut self, request: ClientRequest) {
        self.entries.push_back(request);
    }

    /// Removes and returns every entry, head first.
    pub fn drain(&mut self) -> Vec<ClientRequest> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
