//! In-memory transport for exercising the client without a live socket.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use tradefeed::transport::{TransportConnector, TransportFrame, TransportSink, TransportStream};
use tradefeed::types::{FeedError, Result};
use tradefeed::Envelope;

/// Opt-in log output for debugging test runs (`RUST_LOG=tradefeed=debug`).
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted outcome for one `connect` call.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Accept,
    Reject,
}

struct ConnectorInner {
    script: VecDeque<Outcome>,
    default_outcome: Outcome,
    links: Vec<Arc<LinkInner>>,
    connect_attempts: usize,
    connect_delay: Duration,
}

/// Transport connector whose connect outcomes are scripted by the test.
pub struct MockConnector {
    inner: Mutex<ConnectorInner>,
}

impl MockConnector {
    /// Connector accepting every connect unless scripted otherwise.
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(ConnectorInner {
                script: VecDeque::new(),
                default_outcome: Outcome::Accept,
                links: Vec::new(),
                connect_attempts: 0,
                connect_delay: Duration::ZERO,
            }),
        })
    }

    /// Queue `n` rejections ahead of the default outcome.
    pub fn reject_next(&self, n: usize) {
        let mut inner = self.inner.lock().unwrap();
        for _ in 0..n {
            inner.script.push_back(Outcome::Reject);
        }
    }

    /// Make every unscripted connect fail from now on.
    pub fn reject_all(&self) {
        self.inner.lock().unwrap().default_outcome = Outcome::Reject;
    }

    /// Make every unscripted connect succeed from now on.
    pub fn accept_all(&self) {
        self.inner.lock().unwrap().default_outcome = Outcome::Accept;
    }

    /// Make every connect take `delay` before resolving.
    #[allow(dead_code)]
    pub fn set_connect_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().connect_delay = delay;
    }

    /// Total connect calls observed (accepted or rejected).
    pub fn connect_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.connect_attempts
    }

    /// Handle to the most recently accepted connection.
    pub fn latest_link(&self) -> MockLink {
        let inner = self.inner.lock().unwrap();
        MockLink {
            inner: Arc::clone(inner.links.last().expect("no accepted connection yet")),
        }
    }
}

struct LinkInner {
    sent: Mutex<Vec<String>>,
    inbound_tx: mpsc::UnboundedSender<TransportFrame>,
    closed_by_client: AtomicBool,
}

/// Test-side handle to one accepted connection.
pub struct MockLink {
    inner: Arc<LinkInner>,
}

impl MockLink {
    /// Deliver a raw text frame to the client.
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.inner.inbound_tx.send(TransportFrame::Text(text.into()));
    }

    /// Deliver a well-formed envelope to the client.
    pub fn push_envelope(&self, envelope: &Envelope) {
        self.push_text(serde_json::to_string(envelope).unwrap());
    }

    /// Close the connection from the server side.
    pub fn force_close(&self) {
        let _ = self.inner.inbound_tx.send(TransportFrame::Closed(None));
    }

    /// Fail the connection mid-stream.
    pub fn fail(&self, reason: &str) {
        let _ = self
            .inner
            .inbound_tx
            .send(TransportFrame::Error(reason.to_string()));
    }

    /// Frames the client transmitted on this connection.
    pub fn sent(&self) -> Vec<String> {
        self.inner.sent.lock().unwrap().clone()
    }

    /// Whether the client performed a close handshake.
    pub fn closed_by_client(&self) -> bool {
        self.inner.closed_by_client.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(
        &self,
        _url: &Url,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>)> {
        let delay = {
            let mut inner = self.inner.lock().unwrap();
            inner.connect_attempts += 1;
            inner.connect_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().unwrap();
        let outcome = inner
            .script
            .pop_front()
            .unwrap_or(inner.default_outcome);

        if outcome == Outcome::Reject {
            return Err(FeedError::Connection("mock transport refused".into()));
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let link = Arc::new(LinkInner {
            sent: Mutex::new(Vec::new()),
            inbound_tx,
            closed_by_client: AtomicBool::new(false),
        });
        inner.links.push(Arc::clone(&link));

        Ok((
            Box::new(MockSink { link }),
            Box::new(MockStream { inbound_rx }),
        ))
    }
}

struct MockSink {
    link: Arc<LinkInner>,
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        self.link.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.link.closed_by_client.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockStream {
    inbound_rx: mpsc::UnboundedReceiver<TransportFrame>,
}

#[async_trait]
impl TransportStream for MockStream {
    async fn next_frame(&mut self) -> Option<TransportFrame> {
        self.inbound_rx.recv().await
    }
}
