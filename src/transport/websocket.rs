use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use super::{TransportConnector, TransportFrame, TransportSink, TransportStream};
use crate::types::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production connector backed by tokio-tungstenite.
pub struct WsConnector;

#[async_trait]
impl TransportConnector for WsConnector {
    async fn connect(
        &self,
        url: &Url,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>)> {
        tracing::debug!("opening WebSocket connection to {url}");
        let (ws_stream, _response) = connect_async(url.as_str()).await?;
        let (write_half, read_half) = ws_stream.split();
        Ok((
            Box::new(WsSink { inner: write_half }),
            Box::new(WsReader { inner: read_half }),
        ))
    }
}

struct WsSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl TransportSink for WsSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        self.inner.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }
}

struct WsReader {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for WsReader {
    async fn next_frame(&mut self) -> Option<TransportFrame> {
        // Control and binary frames are not part of the envelope protocol;
        // skip them and keep reading.
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(TransportFrame::Text(text.to_string())),
                Ok(Message::Close(frame)) => {
                    return Some(TransportFrame::Closed(
                        frame.map(|f| f.reason.to_string()),
                    ));
                }
                Ok(Message::Ping(data)) => {
                    tracing::debug!("received ping ({} bytes)", data.len());
                }
                Ok(Message::Pong(data)) => {
                    tracing::debug!("received pong ({} bytes)", data.len());
                }
                Ok(Message::Binary(data)) => {
                    tracing::warn!("ignoring unexpected binary frame ({} bytes)", data.len());
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => return Some(TransportFrame::Error(e.to_string())),
            }
        }
    }
}
