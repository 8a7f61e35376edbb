mod builder;
mod connection;
mod core;
mod state;
mod status;

pub use builder::{endpoint_from_env, FeedClientBuilder, FeedClientOptions};
pub use connection::{ConnectionManager, ConnectionState};
pub use core::FeedClient;
pub use state::ClientState;
pub use status::{ConnectionStatus, StatusBroadcaster, StatusHandler, StatusSubscription};
