use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use crate::types::constants::WILDCARD;
use crate::types::Envelope;

/// A subscriber callback. Invoked synchronously on the dispatching task.
pub type EventHandler = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Key a handler is registered under: a specific event type or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Type(String),
    Wildcard,
}

impl From<&str> for EventKey {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Self::Wildcard
        } else {
            Self::Type(s.to_string())
        }
    }
}

impl From<String> for EventKey {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

type Registry = HashMap<EventKey, Vec<(u64, EventHandler)>>;

struct DispatcherInner {
    registry: Registry,
    next_id: u64,
}

/// Typed pub/sub registry: handlers keyed by event type plus a wildcard key.
///
/// Dispatch snapshots the handler sets before invoking anything, so
/// subscribing or unsubscribing from inside a handler never affects the
/// dispatch pass already in flight. A panicking handler is caught and logged;
/// its siblings still run.
pub struct EventDispatcher {
    inner: Arc<Mutex<DispatcherInner>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DispatcherInner {
                registry: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Registers `handler` under `key` and returns an idempotent
    /// unsubscribe capability.
    pub fn subscribe(&self, key: impl Into<EventKey>, handler: EventHandler) -> Subscription {
        let key = key.into();
        let mut inner = self.inner.lock().expect("dispatcher lock poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .registry
            .entry(key.clone())
            .or_default()
            .push((id, handler));

        Subscription {
            inner: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    /// Invokes every handler registered for the envelope's type, then every
    /// wildcard handler, each in registration order.
    pub fn dispatch(&self, envelope: &Envelope) {
        let (typed, wildcard) = {
            let inner = self.inner.lock().expect("dispatcher lock poisoned");
            let snapshot = |key: &EventKey| -> Vec<EventHandler> {
                inner
                    .registry
                    .get(key)
                    .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
                    .unwrap_or_default()
            };
            (
                snapshot(&EventKey::Type(envelope.kind.clone())),
                snapshot(&EventKey::Wildcard),
            )
        };

        for handler in typed.iter().chain(wildcard.iter()) {
            if catch_unwind(AssertUnwindSafe(|| handler(envelope))).is_err() {
                tracing::error!(
                    event_type = %envelope.kind,
                    "event handler panicked; remaining handlers unaffected"
                );
            }
        }
    }

    /// Number of handlers currently registered under `key`.
    #[cfg(test)]
    fn handler_count(&self, key: impl Into<EventKey>) -> usize {
        let inner = self.inner.lock().expect("dispatcher lock poisoned");
        inner
            .registry
            .get(&key.into())
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability returned by [`EventDispatcher::subscribe`]; calling
/// [`unsubscribe`](Subscription::unsubscribe) twice is a no-op.
pub struct Subscription {
    inner: Weak<Mutex<DispatcherInner>>,
    key: EventKey,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock().expect("dispatcher lock poisoned");
        if let Some(handlers) = inner.registry.get_mut(&self.key) {
            handlers.retain(|(id, _)| *id != self.id);
            // Drop the key once the last handler under it is removed
            if handlers.is_empty() {
                inner.registry.remove(&self.key);
            }
        }
    }
}
