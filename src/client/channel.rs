//! Client channel: one auto-reconnecting logical connection to the server.
//!
//! All connection work happens on a single spawned driver task. The driver
//! owns the transport halves, the outbound queue and the backoff sleeps,
//! which makes the reconnection invariants structural: there is exactly one
//! place a timer can be armed, so two can never stack, and queued emits are
//! flushed before the driver reads another command, so nothing overtakes
//! them.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::ChannelConfig;
use crate::ports::{EventStream, MessageSink, Transport};
use crate::protocol::ClientRequest;

use super::event::ChannelEvent;
use super::queue::OutboundQueue;
use super::registry::{Subscription, SubscriptionRegistry};

/// Connection state as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// A connection attempt failed; the message is kept for display.
    Error {
        message: String,
    },
}

impl ConnectionState {
    /// The three-valued status string the dashboard renders. A connection
    /// still being attempted reads as disconnected.
    pub fn status(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Error { .. } => "error",
            ConnectionState::Disconnected | ConnectionState::Connecting => "disconnected",
        }
    }
}

enum Command {
    Emit(ClientRequest),
    Disconnect,
}

struct DriverSlot {
    commands: Option<mpsc::UnboundedSender<Command>>,
    task: Option<JoinHandle<()>>,
}

/// Handle to the channel. Cheap to clone; all clones share the driver,
/// registry and state.
#[derive(Clone)]
pub struct ClientChannel {
    transport: Arc<dyn Transport>,
    config: ChannelConfig,
    registry: SubscriptionRegistry,
    state_tx: watch::Sender<ConnectionState>,
    slot: Arc<Mutex<DriverSlot>>,
}

impl ClientChannel {
    pub fn new(transport: Arc<dyn Transport>, config: ChannelConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            config,
            registry: SubscriptionRegistry::new(),
            state_tx,
            slot: Arc::new(Mutex::new(DriverSlot {
                commands: None,
                task: None,
            })),
        }
    }

    /// Starts connecting if no connection attempt is live. Idempotent: a
    /// second call while connecting or connected does nothing. Never waits
    /// for the handshake; track completion via [`Self::watch_state`] or a
    /// `connect` subscription.
    pub fn connect(&self) {
        let mut slot = self.slot.lock().expect("channel driver slot poisoned");
        let driver_live = slot
            .task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false);
        if driver_live {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Driver {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            registry: self.registry.clone(),
            state: self.state_tx.clone(),
            commands: rx,
            queue: OutboundQueue::new(),
        };
        slot.commands = Some(tx);
        slot.task = Some(tokio::spawn(driver.run()));
    }

    /// Explicit teardown: closes the connection, cancels any pending
    /// reconnection and discards queued outbound entries.
    pub fn disconnect(&self) {
        let mut slot = self.slot.lock().expect("channel driver slot poisoned");
        if let Some(commands) = slot.commands.take() {
            let _ = commands.send(Command::Disconnect);
        }
        slot.task.take();
    }

    /// Sends a request now if connected; otherwise queues it and makes
    /// sure a connection attempt is in flight.
    pub fn emit(&self, request: ClientRequest) {
        self.connect();
        let slot = self.slot.lock().expect("channel driver slot poisoned");
        if let Some(commands) = &slot.commands {
            let _ = commands.send(Command::Emit(request));
        }
    }

    /// Registers a handler for an event name (a server event or one of
    /// the lifecycle names `connect`, `connect_error`, `disconnect`).
    pub fn on(
        &self,
        event: &str,
        handler: impl Fn(&ChannelEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.registry.subscribe(event, handler)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Watch for state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// The status string the dashboard renders.
    pub fn status(&self) -> &'static str {
        self.state_tx.borrow().status()
    }
}

/// Exit instruction a connected session hands back to the driver loop.
enum SessionEnd {
    /// Caller asked for teardown; stop without reconnecting.
    LocalDisconnect,
    /// The server side went away; reconnect after the resume backoff.
    RemoteClosed,
}

struct Driver {
    transport: Arc<dyn Transport>,
    config: ChannelConfig,
    registry: SubscriptionRegistry,
    state: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedReceiver<Command>,
    queue: OutboundQueue,
}

impl Driver {
    async fn run(mut self) {
        loop {
            self.state.send_replace(ConnectionState::Connecting);

            match self.transport.dial().await {
                Ok((mut sink, stream)) => {
                    self.state.send_replace(ConnectionState::Connected);
                    self.registry.dispatch(&ChannelEvent::Connected);

                    // Queued-before-connect entries go out first, in
                    // order, before another command is read.
                    for request in self.queue.drain() {
                        if let Err(error) = sink.send(&request).await {
                            tracing::warn!(%error, "flush failed on fresh connection");
                        }
                    }

                    match self.session(&mut sink, stream).await {
                        SessionEnd::LocalDisconnect => {
                            sink.close().await;
                            self.settle_disconnected();
                            return;
                        }
                        SessionEnd::RemoteClosed => {
                            self.state.send_replace(ConnectionState::Disconnected);
                            self.registry.dispatch(&ChannelEvent::Disconnected);
                            if !self.backoff(self.config.resume_backoff()).await {
                                self.settle_disconnected();
                                return;
                            }
                        }
                    }
                }
                Err(error) => {
                    let message = error.to_string();
                    tracing::warn!(error = %message, "connection attempt failed");
                    self.state.send_replace(ConnectionState::Error {
                        message: message.clone(),
                    });
                    self.registry
                        .dispatch(&ChannelEvent::ConnectError { message });
                    if !self.backoff(self.config.connect_backoff()).await {
                        self.settle_disconnected();
                        return;
                    }
                }
            }
        }
    }

    /// Runs one connected session until either side ends it.
    async fn session(
        &mut self,
        sink: &mut Box<dyn MessageSink>,
        mut stream: Box<dyn EventStream>,
    ) -> SessionEnd {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Emit(request)) => {
                        if let Err(error) = sink.send(&request).await {
                            tracing::warn!(%error, "send failed on live connection");
                            return SessionEnd::RemoteClosed;
                        }
                    }
                    Some(Command::Disconnect) | None => return SessionEnd::LocalDisconnect,
                },
                event = stream.next() => match event {
                    Some(event) => self.registry.dispatch(&ChannelEvent::Message(event)),
                    None => return SessionEnd::RemoteClosed,
                },
            }
        }
    }

    /// Waits out a fixed backoff delay. Emits arriving meanwhile are
    /// queued; returns false if the caller disconnected, in which case no
    /// reconnection happens.
    async fn backoff(&mut self, delay: std::time::Duration) -> bool {
        let wake = tokio::time::sleep(delay);
        tokio::pin!(wake);
        loop {
            tokio::select! {
                _ = &mut wake => return true,
                command = self.commands.recv() => match command {
                    Some(Command::Emit(request)) => self.queue.enqueue(request),
                    Some(Command::Disconnect) | None => return false,
                },
            }
        }
    }

    /// Final teardown: queue is connection-scoped, so it empties here.
    fn settle_disconnected(&mut self) {
        self.queue.clear();
        self.state.send_replace(ConnectionState::Disconnected);
        self.registry.dispatch(&ChannelEvent::Disconnected);
    }
}
