use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time snapshot of the connection, owned exclusively by the client.
///
/// Observers always receive clones, never the live copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub reconnecting: bool,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub error_count: u64,
}

/// Observer callback, invoked synchronously with a status clone.
pub type StatusHandler = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

struct BroadcasterInner {
    status: ConnectionStatus,
    observers: Vec<(u64, StatusHandler)>,
    next_id: u64,
}

/// Holds the authoritative [`ConnectionStatus`] and notifies registered
/// observers, in registration order, on every material change.
pub struct StatusBroadcaster {
    inner: Arc<Mutex<BroadcasterInner>>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BroadcasterInner {
                status: ConnectionStatus::default(),
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Registers an observer; returns an idempotent unsubscribe capability.
    pub fn on_change(&self, handler: StatusHandler) -> StatusSubscription {
        let mut inner = self.inner.lock().expect("status lock poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.observers.push((id, handler));
        StatusSubscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Returns a clone of the current status.
    pub fn snapshot(&self) -> ConnectionStatus {
        self.inner.lock().expect("status lock poisoned").status.clone()
    }

    /// Applies `mutate` to the status and notifies every observer with the
    /// resulting snapshot. The lock is released before observers run.
    pub fn update(&self, mutate: impl FnOnce(&mut ConnectionStatus)) {
        let (snapshot, observers) = {
            let mut inner = self.inner.lock().expect("status lock poisoned");
            mutate(&mut inner.status);
            let observers: Vec<StatusHandler> = inner
                .observers
                .iter()
                .map(|(_, handler)| Arc::clone(handler))
                .collect();
            (inner.status.clone(), observers)
        };

        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(snapshot.clone()))).is_err() {
                tracing::error!("status observer panicked; remaining observers unaffected");
            }
        }
    }

    /// Marks the connection open.
    pub fn mark_connected(&self) {
        self.update(|status| {
            status.connected = true;
            status.reconnecting = false;
        });
    }

    /// Marks the connection closed, optionally entering the reconnecting state.
    pub fn mark_disconnected(&self, reconnecting: bool) {
        self.update(|status| {
            status.connected = false;
            status.reconnecting = reconnecting;
        });
    }

    /// Records receipt of an inbound keepalive frame.
    pub fn record_heartbeat(&self, at: DateTime<Utc>) {
        self.update(|status| status.last_heartbeat = Some(at));
    }

    /// Records a transport-level error.
    pub fn record_error(&self) {
        self.update(|status| status.error_count += 1);
    }

    /// Resets to the baseline after a manual disconnect.
    pub fn reset(&self) {
        self.update(|status| *status = ConnectionStatus::default());
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability returned by [`StatusBroadcaster::on_change`]; calling
/// [`unsubscribe`](StatusSubscription::unsubscribe) twice is a no-op.
pub struct StatusSubscription {
    inner: Weak<Mutex<BroadcasterInner>>,
    id: u64,
}

impl StatusSubscription {
    pub fn unsubscribe(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock().expect("status lock poisoned");
        inner.observers.retain(|(id, _)| *id != self.id);
    }
}
