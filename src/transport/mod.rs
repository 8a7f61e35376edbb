// Transport abstraction - the client core is written against these traits so
// tests can run on an in-memory transport instead of a live socket.
pub mod websocket;

use async_trait::async_trait;
use url::Url;

use crate::types::Result;

pub use websocket::WsConnector;

/// An inbound event observed on the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFrame {
    /// A complete UTF-8 text frame
    Text(String),
    /// The peer closed the connection (reason, if it sent one)
    Closed(Option<String>),
    /// The transport failed mid-stream
    Error(String),
}

/// Write half of an established transport.
///
/// `Sync` is required: the sink sits behind the connection manager's lock
/// and is reached from the heartbeat and reconnect tasks concurrently.
#[async_trait]
pub trait TransportSink: Send + Sync {
    async fn send(&mut self, frame: String) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}

/// Read half of an established transport.
///
/// Returns `None` once the stream is exhausted; a well-behaved transport
/// yields `TransportFrame::Closed` or `TransportFrame::Error` first.
#[async_trait]
pub trait TransportStream: Send {
    async fn next_frame(&mut self) -> Option<TransportFrame>;
}

/// Capability to open a transport connection.
///
/// `connect` resolves once the connection is open, or fails if the transport
/// reports failure before an open is observed.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self, url: &Url)
        -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>)>;
}
