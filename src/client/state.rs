use crate::infrastructure::{ReconnectPolicy, TaskManager};

/// Consolidated mutable state for [`FeedClient`].
/// Using a single struct reduces lock contention.
///
/// [`FeedClient`]: super::FeedClient
pub struct ClientState {
    /// Background task slots (read, heartbeat, reconnect)
    pub tasks: TaskManager,

    /// Reconnection state machine
    pub reconnect: ReconnectPolicy,

    /// Whether the last disconnect was manual (suppresses auto-reconnect)
    pub was_manual_disconnect: bool,
}

impl ClientState {
    pub fn new(reconnect: ReconnectPolicy) -> Self {
        Self {
            tasks: TaskManager::new(),
            reconnect,
            was_manual_disconnect: false,
        }
    }
}
