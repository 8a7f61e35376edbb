//! # tradefeed
//!
//! Resilient realtime feed client for the trading dashboard: connection
//! lifecycle, bounded automatic reconnection, outbound heartbeats, and a
//! typed pub/sub registry that isolates failing subscribers.
//!
//! ## Example
//!
//! ```no_run
//! use tradefeed::{FeedClient, FeedClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FeedClient::new(
//!         "wss://dashboard.example/ws",
//!         FeedClientOptions::default(),
//!     )?;
//!
//!     let _prices = client.subscribe("price_update", |envelope| {
//!         println!("tick: {}", envelope.data);
//!     });
//!     let _status = client.on_status_change(|status| {
//!         println!("connected: {}", status.connected);
//!     });
//!
//!     client.connect().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod transport;
pub mod types;

pub use client::{
    endpoint_from_env, ConnectionStatus, FeedClient, FeedClientBuilder, FeedClientOptions,
    StatusSubscription,
};
pub use messaging::{EventDispatcher, EventKey, Subscription};
pub use types::{Envelope, FeedError, ProtocolError};
