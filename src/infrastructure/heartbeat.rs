use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::ConnectionManager;
use crate::types::Envelope;

/// Periodic outbound keepalive.
///
/// Started only after a successful open and aborted on disconnect, unexpected
/// close, or give-up, so no heartbeat is ever sent on a closed transport.
/// Liveness loss is not detected here: the transport's own close/error
/// signalling drives recovery, and inbound heartbeat frames refresh the
/// status timestamp for observability only.
pub struct HeartbeatMonitor {
    interval: Duration,
    connection: Weak<ConnectionManager>,
}

impl HeartbeatMonitor {
    pub fn new(connection: Weak<ConnectionManager>, interval: Duration) -> Self {
        Self {
            interval,
            connection,
        }
    }

    /// Spawns the heartbeat task. The first beat fires one full interval
    /// after the open, not immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let connection = match self.connection.upgrade() {
                    Some(connection) => connection,
                    // Client dropped, exit heartbeat task
                    None => break,
                };

                if !connection.is_open().await {
                    continue;
                }

                match connection.send_envelope(&Envelope::heartbeat()).await {
                    Ok(()) => tracing::debug!("sent heartbeat"),
                    Err(e) => tracing::error!("failed to send heartbeat: {e}"),
                }
            }
        })
    }
}
