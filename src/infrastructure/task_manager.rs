use tokio::task::JoinHandle;

/// Tracks the client's background tasks with one named slot per role.
///
/// Storing a new handle in a slot aborts the previous occupant, so at most
/// one reader, one heartbeat, and one reconnect task ever run per client.
#[derive(Default)]
pub struct TaskManager {
    read: Option<JoinHandle<()>>,
    heartbeat: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_read(&mut self, handle: JoinHandle<()>) {
        Self::replace(&mut self.read, Some(handle));
    }

    pub fn set_heartbeat(&mut self, handle: JoinHandle<()>) {
        Self::replace(&mut self.heartbeat, Some(handle));
    }

    pub fn set_reconnect(&mut self, handle: JoinHandle<()>) {
        Self::replace(&mut self.reconnect, Some(handle));
    }

    pub fn abort_heartbeat(&mut self) {
        Self::replace(&mut self.heartbeat, None);
    }

    pub fn abort_reconnect(&mut self) {
        Self::replace(&mut self.reconnect, None);
    }

    /// Aborts every tracked task without waiting.
    pub fn abort_all(&mut self) {
        Self::replace(&mut self.read, None);
        Self::replace(&mut self.heartbeat, None);
        Self::replace(&mut self.reconnect, None);
    }

    fn replace(slot: &mut Option<JoinHandle<()>>, handle: Option<JoinHandle<()>>) {
        if let Some(previous) = std::mem::replace(slot, handle) {
            previous.abort();
        }
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}
