//! Module lifecycle events
//!
//! A minimal synchronous bus for "module about to be removed"
//! notifications. Handlers are registered with an explicit [`Subscription`]
//! handle and stay registered exactly as long as the handle lives, so a
//! subscriber scopes its handler to its own lifetime by owning the handle.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::trace;

use crate::module::ModuleId;

type RemovalHandler = Arc<dyn Fn(&ModuleId) + Send + Sync>;

#[derive(Default)]
struct BusState {
    next_id: u64,
    before_module_removed: Vec<(u64, RemovalHandler)>,
}

/// In-process bus for module lifecycle notifications.
///
/// Delivery is synchronous on the notifying thread, in subscription order.
#[derive(Clone, Default)]
pub struct LifecycleBus {
    state: Arc<RwLock<BusState>>,
}

impl LifecycleBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for "module about to be removed" events.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn on_before_module_removed(
        &self,
        handler: impl Fn(&ModuleId) + Send + Sync + 'static,
    ) -> Subscription {
        let mut state = self.state.write();
        let id = state.next_id;
        state.next_id += 1;
        state.before_module_removed.push((id, Arc::new(handler)));
        Subscription {
            state: Arc::downgrade(&self.state),
            id,
        }
    }

    /// Deliver a before-removed event to every live subscriber.
    pub fn notify_before_module_removed(&self, module: &ModuleId) {
        // Handlers run outside the lock so they may touch the bus themselves.
        let handlers: Vec<RemovalHandler> = {
            let state = self.state.read();
            state
                .before_module_removed
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };

        trace!(module = %module, count = handlers.len(), "Dispatching before-module-removed");
        for handler in handlers {
            handler(module);
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.state.read().before_module_removed.len()
    }
}

impl fmt::Debug for LifecycleBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle tying a registered handler to its owner's lifetime.
pub struct Subscription {
    state: Weak<RwLock<BusState>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state
                .write()
                .before_module_removed
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscriber_receives_each_event() {
        let bus = LifecycleBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let _subscription = bus.on_before_module_removed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.notify_before_module_removed(&ModuleId::new("m1"));
        bus.notify_before_module_removed(&ModuleId::new("m2"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropping_subscription_unregisters_handler() {
        let bus = LifecycleBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let subscription = bus.on_before_module_removed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(bus.subscriber_count(), 0);
        bus.notify_before_module_removed(&ModuleId::new("m1"));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_notify_without_subscribers_is_a_noop() {
        let bus = LifecycleBus::new();
        bus.notify_before_module_removed(&ModuleId::new("m1"));
    }

    #[test]
    fn test_handler_may_unsubscribe_during_delivery() {
        let bus = LifecycleBus::new();
        let other = bus.on_before_module_removed(|_| {});
        let slot: Arc<RwLock<Option<Subscription>>> = Arc::new(RwLock::new(Some(other)));

        let shared = Arc::clone(&slot);
        let _subscription = bus.on_before_module_removed(move |_| {
            shared.write().take();
        });

        bus.notify_before_module_removed(&ModuleId::new("m1"));
        assert_eq!(bus.subscriber_count(), 1);
    }
}
