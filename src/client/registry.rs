//! Subscription registry: fan-out of channel events to independent widgets.
//!
//! Each widget registers its own handlers and gets back a [`Subscription`]
//! guard bound to exactly that (event, handler) entry, so tearing one
//! widget down never disturbs another listening on the same event.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::event::ChannelEvent;

type Handler = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

#[derive(Clone)]
struct Entry {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct RegistryInner {
    handlers: Mutex<HashMap<String, Vec<Entry>>>,
    next_id: AtomicU64,
}

/// Registry of (event name -> handler list), shared by every widget on a
/// channel. Cloning is cheap and refers to the same handler table.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event name.
    ///
    /// Handlers run in registration order. The same closure registered
    /// twice is invoked twice per event; no de-duplication happens.
    pub fn subscribe(
        &self,
        event: &str,
        handler: impl Fn(&ChannelEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            id,
            handler: Arc::new(handler),
        };
        self.inner
            .handlers
            .lock()
            .expect("subscription registry lock poisoned")
            .entry(event.to_string())
            .or_default()
            .push(entry);

        Subscription {
            inner: Arc::clone(&self.inner),
            event: event.to_string(),
            id,
        }
    }

    /// Invokes every handler registered for the event's name, in
    /// registration order. A panicking handler is isolated: it is logged
    /// and the remaining handlers still run.
    pub fn dispatch(&self, event: &ChannelEvent) {
        let handlers: Vec<Entry> = {
            let table = self
                .inner
                .handlers
                .lock()
                .expect("subscription registry lock poisoned");
            table.get(event.name()).cloned().unwrap_or_default()
        };

        for entry in handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| (entry.handler)(event)));
            if outcome.is_err() {
                tracing::error!(
                    event = event.name(),
                    "subscriber panicked; remaining handlers still run"
                );
            }
        }
    }

    /// Number of handlers currently registered for an event name.
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .handlers
            .lock()
            .expect("subscription registry lock poisoned")
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Guard for one registered handler. Dropping it (or calling
/// [`Subscription::unsubscribe`]) removes exactly that handler.
pub struct Subscription {
    inner: Arc<RegistryInner>,
    event: String,
    id: u64,
}

impl Subscription {
    /// Removes the handler now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut table = match self.inner.handlers.lock() {
            Ok(table) => table,
            Err(_) => return,
        };
        if let Some(entries) = table.get_mut(&self.event) {
            entries.retain(|entry| entry.id != self.id);
            if entries.is_empty() {
                table.remove(&self.event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ServerEvent;
    use std::sync::atomic::AtomicUsize;

    fn history_event() -> ChannelEvent {
        ChannelEvent::Message(ServerEvent::AlarmHistory { alarms: vec![] })
    }

    #[test]
    fn dispatch_reaches_every_handler_for_the_event() {
        let registry = SubscriptionRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _a = {
            let count = count.clone();
            registry.subscribe("alarm_history", move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _b = {
            let count = count.clone();
            registry.subscribe("alarm_history", move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        registry.dispatch(&history_event());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let registry = SubscriptionRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let _a = {
            let order = order.clone();
            registry.subscribe("connect", move |_| order.lock().unwrap().push("first"))
        };
        let _b = {
            let order = order.clone();
            registry.subscribe("connect", move |_| order.lock().unwrap().push("second"))
        };

        registry.dispatch(&ChannelEvent::Connected);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribing_one_handler_leaves_siblings_alive() {
        let registry = SubscriptionRegistry::new();
        let a_count = Arc::new(AtomicUsize::new(0));
        let b_count = Arc::new(AtomicUsize::new(0));

        let sub_a = {
            let count = a_count.clone();
            registry.subscribe("alarm_history", move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _sub_b = {
            let count = b_count.clone();
            registry.subscribe("alarm_history", move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        sub_a.unsubscribe();
        registry.dispatch(&history_event());

        assert_eq!(a_count.load(Ordering::SeqCst), 0);
        assert_eq!(b_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_guard_unsubscribes() {
        let registry = SubscriptionRegistry::new();
        {
            let _sub = registry.subscribe("disconnect", |_| {});
            assert_eq!(registry.handler_count("disconnect"), 1);
        }
        assert_eq!(registry.handler_count("disconnect"), 0);
    }

    #[test]
    fn panicking_handler_does_not_starve_the_rest() {
        let registry = SubscriptionRegistry::new();
        let reached = Arc::new(AtomicUsize::new(0));

        let _bad = registry.subscribe("connect", |_| panic!("widget bug"));
        let _good = {
            let reached = reached.clone();
            registry.subscribe("connect", move |_| {
                reached.fetch_add(1, Ordering::SeqCst);
            })
        };

        registry.dispatch(&ChannelEvent::Connected);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn same_closure_registered_twice_fires_twice() {
        let registry = SubscriptionRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler = {
            let count = count.clone();
            move |_: &ChannelEvent| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };

        let _a = registry.subscribe("connect", handler.clone());
        let _b = registry.subscribe("connect", handler);

        registry.dispatch(&ChannelEvent::Connected);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dispatch_without_subscribers_is_a_noop() {
        let registry = SubscriptionRegistry::new();
        registry.dispatch(&ChannelEvent::Disconnected);
    }
}
