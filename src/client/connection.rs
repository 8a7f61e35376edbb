use tokio::sync::RwLock;

use crate::transport::TransportSink;
use crate::types::{Envelope, Result};

/// Transport-level connection states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Closing,
}

/// Owns the transport write half and the connection state.
///
/// The read half lives in the read task; this side only sends and closes.
pub struct ConnectionManager {
    sink: RwLock<Option<Box<dyn TransportSink>>>,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            sink: RwLock::new(None),
            state: RwLock::new(ConnectionState::Closed),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    pub async fn is_open(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    /// Installs the write half of a freshly opened transport and marks the
    /// connection open.
    pub async fn open(&self, sink: Box<dyn TransportSink>) {
        *self.sink.write().await = Some(sink);
        self.set_state(ConnectionState::Open).await;
    }

    /// Serializes and transmits an envelope. Fails with
    /// [`FeedError::NotConnected`] when the transport is not open.
    ///
    /// [`FeedError::NotConnected`]: crate::types::FeedError::NotConnected
    pub async fn send_envelope(&self, envelope: &Envelope) -> Result<()> {
        if !self.is_open().await {
            return Err(crate::types::FeedError::NotConnected);
        }

        let json = serde_json::to_string(envelope)?;
        let mut sink = self.sink.write().await;
        match sink.as_mut() {
            Some(sink) => sink.send(json).await,
            None => Err(crate::types::FeedError::NotConnected),
        }
    }

    /// Closes the transport if open and drops the write half.
    pub async fn close(&self) {
        self.set_state(ConnectionState::Closing).await;

        let mut sink = self.sink.write().await;
        if let Some(sink) = sink.as_mut() {
            if let Err(e) = sink.close().await {
                tracing::debug!("transport close failed: {e}");
            }
        }
        *sink = None;
        drop(sink);

        self.set_state(ConnectionState::Closed).await;
    }

    /// Drops the write half without a close handshake (peer already gone).
    pub async fn drop_sink(&self) {
        *self.sink.write().await = None;
        self.set_state(ConnectionState::Closed).await;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
