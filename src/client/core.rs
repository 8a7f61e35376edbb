use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::{
    ClientState, ConnectionManager, ConnectionState, ConnectionStatus, FeedClientBuilder,
    FeedClientOptions, StatusBroadcaster, StatusSubscription,
};
use crate::infrastructure::{HeartbeatMonitor, ReconnectDecision};
use crate::messaging::{EventDispatcher, EventKey, Subscription};
use crate::transport::{TransportConnector, TransportFrame, TransportStream};
use crate::types::{Envelope, FeedError, Result};

/// Resilient realtime feed client for the trading dashboard.
///
/// `FeedClient` keeps a live event feed (price ticks, signals, session
/// status) alive across an unreliable network: it reconnects automatically
/// within a configured attempt budget, sends periodic keepalives, and fans
/// typed envelopes out to independent subscribers.
///
/// Instances are independently owned; construct one at the application
/// boundary and pass the handle down. Cloning is cheap and shares the same
/// underlying connection.
///
/// # Example
///
/// ```no_run
/// use tradefeed::{FeedClient, FeedClientOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FeedClient::new("wss://dashboard.example/ws", FeedClientOptions::default())?;
///
/// let prices = client.subscribe("price_update", |envelope| {
///     println!("tick: {}", envelope.data);
/// });
///
/// client.connect().await?;
/// // ...
/// client.disconnect().await;
/// prices.unsubscribe();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FeedClient {
    pub(crate) url: Url,
    pub(crate) options: FeedClientOptions,
    pub(crate) connector: Arc<dyn TransportConnector>,

    pub(crate) connection: Arc<ConnectionManager>,
    pub(crate) dispatcher: Arc<EventDispatcher>,
    pub(crate) status: Arc<StatusBroadcaster>,

    /// Serializes concurrent `connect()` calls
    pub(crate) connect_gate: Arc<Mutex<()>>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,
}

impl FeedClient {
    /// Creates a new client. Fails if the endpoint URL is malformed.
    ///
    /// No connection is made until [`connect()`](Self::connect) is called.
    pub fn new(endpoint: impl AsRef<str>, options: FeedClientOptions) -> Result<Self> {
        FeedClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    /// Opens the transport and completes once the connection is established.
    ///
    /// A no-op success when already open. Concurrent calls are serialized:
    /// a call arriving while an open is in flight waits for it and then
    /// either returns immediately (the open succeeded) or performs its own
    /// attempt, so success is never reported before an open has completed.
    /// On success the heartbeat monitor starts, the reconnect counter
    /// resets, and every status observer sees
    /// `{connected: true, reconnecting: false}`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Connection`] if the transport reports failure
    /// before the connection opens. This is the only failure kind that ever
    /// propagates to a caller.
    pub async fn connect(&self) -> Result<()> {
        let _gate = self.connect_gate.lock().await;
        if self.connection.is_open().await {
            return Ok(());
        }
        self.connection.set_state(ConnectionState::Connecting).await;
        tracing::info!("connecting to {}", self.url);

        let (sink, stream) = match self.connector.connect(&self.url).await {
            Ok(halves) => halves,
            Err(e) => {
                self.connection.set_state(ConnectionState::Closed).await;
                return Err(FeedError::Connection(e.to_string()));
            }
        };

        self.connection.open(sink).await;

        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = false;
            state.reconnect.on_open();

            let reader = self.clone();
            state.tasks.set_read(tokio::spawn(reader.read_loop(stream)));

            let heartbeat = HeartbeatMonitor::new(
                Arc::downgrade(&self.connection),
                self.options.heartbeat_interval,
            );
            state.tasks.set_heartbeat(heartbeat.spawn());
        }

        self.status.mark_connected();
        tracing::info!("connected to feed");
        Ok(())
    }

    /// Manual, intentional close.
    ///
    /// Cancels any pending reconnect and heartbeat timers, closes the
    /// transport if open, and resets status to the baseline. Automatic
    /// reconnection stays suppressed until the next [`connect()`](Self::connect).
    pub async fn disconnect(&self) {
        tracing::info!("disconnecting from feed");
        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = true;
            state.tasks.abort_all();
            state.reconnect.reset();
        }

        self.connection.close().await;
        self.status.reset();
    }

    /// Transmits an envelope if the transport is currently open; otherwise a
    /// warning-logged no-op. Never returns an error to the caller.
    pub async fn send(&self, envelope: Envelope) {
        if let Err(e) = self.connection.send_envelope(&envelope).await {
            tracing::warn!("dropping outbound {} message: {e}", envelope.kind);
        }
    }

    /// Registers `handler` for a specific event type, or every type when
    /// `key` is `"*"`. Returns an idempotent unsubscribe capability.
    pub fn subscribe(
        &self,
        key: impl Into<EventKey>,
        handler: impl Fn(&Envelope) + Send + Sync + 'static,
    ) -> Subscription {
        self.dispatcher.subscribe(key, Arc::new(handler))
    }

    /// Registers a status observer, invoked with a status clone on every
    /// material change. Returns an idempotent unsubscribe capability.
    pub fn on_status_change(
        &self,
        handler: impl Fn(ConnectionStatus) + Send + Sync + 'static,
    ) -> StatusSubscription {
        self.status.on_change(Arc::new(handler))
    }

    /// Point-in-time status snapshot.
    pub fn status(&self) -> ConnectionStatus {
        self.status.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.status.snapshot().connected
    }

    pub fn is_reconnecting(&self) -> bool {
        self.status.snapshot().reconnecting
    }

    /// Read task body: decode inbound frames and route them until the
    /// transport closes or fails.
    async fn read_loop(self, mut stream: Box<dyn TransportStream>) {
        tracing::debug!("read task started");
        loop {
            match stream.next_frame().await {
                Some(TransportFrame::Text(text)) => self.handle_frame(&text),
                Some(TransportFrame::Closed(reason)) => {
                    match reason {
                        Some(reason) => tracing::warn!("server closed connection: {reason}"),
                        None => tracing::warn!("server closed connection"),
                    }
                    break;
                }
                Some(TransportFrame::Error(e)) => {
                    tracing::error!("transport read error: {e}");
                    self.status.record_error();
                    break;
                }
                None => {
                    tracing::warn!("transport stream ended");
                    break;
                }
            }
        }
        self.handle_unexpected_close().await;
    }

    /// Decodes one inbound text frame.
    ///
    /// Undecodable frames are dropped without affecting the connection.
    /// Heartbeat envelopes refresh the status timestamp and are never
    /// forwarded to subscribers.
    fn handle_frame(&self, text: &str) {
        match Envelope::decode(text) {
            Ok(envelope) if envelope.is_heartbeat() => {
                tracing::debug!("heartbeat received");
                self.status.record_heartbeat(Utc::now());
            }
            Ok(envelope) => self.dispatcher.dispatch(&envelope),
            Err(e) => tracing::warn!("dropping undecodable frame: {e}"),
        }
    }

    /// Runs after the read loop exits: stop the heartbeat and, unless the
    /// close was manual, hand control to the reconnect policy.
    async fn handle_unexpected_close(&self) {
        self.connection.drop_sink().await;

        let decision = {
            let mut state = self.state.write().await;
            state.tasks.abort_heartbeat();
            if state.was_manual_disconnect {
                // disconnect() already published the baseline status
                return;
            }
            state.reconnect.next_attempt()
        };

        match decision {
            ReconnectDecision::Retry { attempt, delay } => {
                // One notification covers close + attempt-scheduled, so
                // observers never see a transient give-up shaped snapshot.
                self.status.mark_disconnected(true);
                self.spawn_reconnect_loop(attempt, delay).await;
            }
            ReconnectDecision::GiveUp => {
                tracing::warn!("reconnect ceiling reached, giving up until next connect()");
                self.status.mark_disconnected(false);
            }
        }
    }

    /// `connect()` erased behind a box for the reconnect task. The task
    /// lives inside the connect future's call graph, so awaiting the opaque
    /// future there directly would give it a self-referential type.
    fn connect_boxed(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.connect())
    }

    /// Spawns the single reconnect task: wait, retry, and either resume on
    /// success or give up when the attempt budget is spent.
    async fn spawn_reconnect_loop(&self, first_attempt: u32, delay: std::time::Duration) {
        let client = self.clone();
        let handle = tokio::spawn(async move {
            let mut attempt = first_attempt;
            loop {
                tokio::time::sleep(delay).await;
                tracing::info!(attempt, "attempting to reconnect");

                match client.connect_boxed().await {
                    Ok(()) => {
                        tracing::info!("reconnected");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("reconnection attempt {attempt} failed: {e}");
                        client.status.record_error();

                        let decision = {
                            let mut state = client.state.write().await;
                            state.reconnect.next_attempt()
                        };
                        match decision {
                            ReconnectDecision::Retry { attempt: next, .. } => attempt = next,
                            ReconnectDecision::GiveUp => {
                                tracing::warn!(
                                    "reconnect ceiling reached, giving up until next connect()"
                                );
                                client.status.mark_disconnected(false);
                                break;
                            }
                        }
                    }
                }
            }
        });

        // set_reconnect aborts any prior pending attempt, so at most one
        // reconnect timer is ever outstanding.
        self.state.write().await.tasks.set_reconnect(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check: the connect future must be spawnable, which forces
    // rustc to resolve the auto traits across the connect → read task →
    // reconnect task cycle.
    #[allow(dead_code)]
    fn connect_future_is_send(client: &FeedClient) {
        fn assert_send<T: Send>(_: T) {}
        assert_send(client.connect());
        assert_send(client.connect_boxed());
    }
}
