use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::{ClientState, ConnectionManager, FeedClient, StatusBroadcaster};
use crate::infrastructure::ReconnectPolicy;
use crate::messaging::EventDispatcher;
use crate::transport::{TransportConnector, WsConnector};
use crate::types::constants::{
    DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL,
    ENV_FEED_URL,
};
use crate::types::{FeedError, Result};

/// Immutable per-client configuration. Set once at construction.
#[derive(Debug, Clone)]
pub struct FeedClientOptions {
    /// Delay between reconnection attempts
    pub reconnect_interval: Duration,
    /// Automatic reconnection attempt ceiling
    pub max_reconnect_attempts: u32,
    /// Outbound keepalive interval
    pub heartbeat_interval: Duration,
}

impl Default for FeedClientOptions {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_millis(DEFAULT_RECONNECT_INTERVAL),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_INTERVAL),
        }
    }
}

/// Reads the feed endpoint URL from `TRADEFEED_WS_URL`, the way the dashboard
/// supplies it at deploy time.
pub fn endpoint_from_env() -> Result<String> {
    std::env::var(ENV_FEED_URL)
        .map_err(|_| FeedError::Connection(format!("{ENV_FEED_URL} is not set")))
}

/// Builder for [`FeedClient`] that handles initialization.
pub struct FeedClientBuilder {
    url: Url,
    options: FeedClientOptions,
    connector: Arc<dyn TransportConnector>,
}

impl FeedClientBuilder {
    /// Create a new builder. Fails if the endpoint URL is malformed.
    pub fn new(endpoint: impl AsRef<str>, options: FeedClientOptions) -> Result<Self> {
        let url = Url::parse(endpoint.as_ref())?;
        Ok(Self {
            url,
            options,
            connector: Arc::new(WsConnector),
        })
    }

    /// Swap the transport implementation (tests inject an in-memory one).
    pub fn with_connector(mut self, connector: Arc<dyn TransportConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// Build an independently owned client instance.
    pub fn build(self) -> FeedClient {
        let reconnect = ReconnectPolicy::new(
            self.options.reconnect_interval,
            self.options.max_reconnect_attempts,
        );

        FeedClient {
            url: self.url,
            options: self.options,
            connector: self.connector,
            connection: Arc::new(ConnectionManager::new()),
            dispatcher: Arc::new(EventDispatcher::new()),
            status: Arc::new(StatusBroadcaster::new()),
            connect_gate: Arc::new(Mutex::new(())),
            state: Arc::new(RwLock::new(ClientState::new(reconnect))),
        }
    }
}
