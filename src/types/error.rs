use thiserror::Error;

/// Errors that can occur when using the feed client.
#[derive(Error, Debug)]
pub enum FeedError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The transport reported failure before the connection opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization error on an outbound message
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,
}

/// An inbound frame that could not be decoded into an [`Envelope`].
///
/// Kept separate from [`FeedError`] because protocol errors never propagate:
/// the frame is logged and dropped, and the connection stays up.
///
/// [`Envelope`]: crate::types::Envelope
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The frame was not valid JSON or did not match the envelope shape
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame decoded but carried an empty event type
    #[error("envelope has an empty event type")]
    EmptyType,
}

/// Convenience type alias for `Result<T, FeedError>`.
pub type Result<T> = std::result::Result<T, FeedError>;
