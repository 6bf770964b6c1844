//! Mock [`Transport`] implementations for testing.
//!
//! - [`ChannelTransport`] - Channel-backed transport with an external
//!   control handle. The test plays the server: it pushes frames in and
//!   inspects what the client sent and how it closed.
//!
//! - [`FailingTransport`] - `open()` always fails. Best for: reconnect
//!   counting and the attempt cap.
//!
//! Factories come paired with an observer so a test can reach every
//! transport the client created, one per connection attempt.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::port::outbound::transport::{Transport, TransportFactory, TransportFrame};

// ---------------------------------------------------------------------------
// ChannelTransport
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Shared {
    open_count: AtomicU32,
    sent: Mutex<Vec<String>>,
    close_code: Mutex<Option<u16>>,
}

/// A transport controlled externally via a [`ChannelTransportHandle`].
///
/// `None` pushed through the handle ends the stream without a close frame.
pub struct ChannelTransport {
    frame_rx: mpsc::UnboundedReceiver<Option<TransportFrame>>,
    shared: Arc<Shared>,
}

/// Control handle for a [`ChannelTransport`].
#[derive(Clone)]
pub struct ChannelTransportHandle {
    frame_tx: mpsc::UnboundedSender<Option<TransportFrame>>,
    shared: Arc<Shared>,
}

impl ChannelTransportHandle {
    /// Deliver a text frame to the client.
    pub async fn push(&self, text: &str) {
        self.frame(TransportFrame::Text(text.to_string())).await;
    }

    /// Deliver a JSON message to the client.
    pub async fn push_json(&self, value: Value) {
        self.frame(TransportFrame::Text(value.to_string())).await;
    }

    /// Accept the client's authentication.
    pub async fn authenticate(&self) {
        self.push(r#"{"event":"authenticated"}"#).await;
    }

    /// Deliver a raw transport frame.
    pub async fn frame(&self, frame: TransportFrame) {
        let _ = self.frame_tx.send(Some(frame));
        tokio::task::yield_now().await;
    }

    /// Close from the server side with `code`.
    pub async fn close(&self, code: u16) {
        self.frame(TransportFrame::Closed {
            code,
            reason: String::new(),
        })
        .await;
    }

    /// End the stream without a close frame.
    pub async fn drop_connection(&self) {
        let _ = self.frame_tx.send(None);
        tokio::task::yield_now().await;
    }

    /// Raw text frames the client sent, in order.
    pub fn sent_text(&self) -> Vec<String> {
        self.shared.sent.lock().unwrap().clone()
    }

    /// Sent frames parsed as JSON. Frames that are not JSON become `Null`.
    pub fn sent(&self) -> Vec<Value> {
        self.sent_text()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap_or(Value::Null))
            .collect()
    }

    /// The `event` field of every sent frame.
    pub fn sent_events(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|v| v["event"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Close code the client used, if it closed.
    pub fn close_code(&self) -> Option<u16> {
        *self.shared.close_code.lock().unwrap()
    }

    pub fn open_count(&self) -> u32 {
        self.shared.open_count.load(Ordering::SeqCst)
    }
}

/// Create a [`ChannelTransport`] and its control [`ChannelTransportHandle`].
pub fn channel_transport() -> (ChannelTransport, ChannelTransportHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared::default());
    (
        ChannelTransport {
            frame_rx: rx,
            shared: shared.clone(),
        },
        ChannelTransportHandle {
            frame_tx: tx,
            shared,
        },
    )
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn open(&mut self) -> Result<()> {
        self.shared.open_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.shared.close_code.lock().unwrap().is_some() {
            return Err(Error::Connection("transport is closed".into()));
        }
        self.shared.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<TransportFrame> {
        self.frame_rx.recv().await.flatten()
    }

    async fn close(&mut self, code: u16, _reason: &str) -> Result<()> {
        *self.shared.close_code.lock().unwrap() = Some(code);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording factory
// ---------------------------------------------------------------------------

/// Observer for transports created by [`recording_factory`].
#[derive(Clone, Default)]
pub struct TransportRecorder {
    handles: Arc<Mutex<Vec<ChannelTransportHandle>>>,
}

impl TransportRecorder {
    /// How many transports the client has asked for.
    pub fn created(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    pub fn handle(&self, index: usize) -> Option<ChannelTransportHandle> {
        self.handles.lock().unwrap().get(index).cloned()
    }

    /// Wait until the `index`-th transport exists.
    ///
    /// # Panics
    ///
    /// Panics if it does not appear within two seconds.
    pub async fn wait_for(&self, index: usize) -> ChannelTransportHandle {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(handle) = self.handle(index) {
                return handle;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "transport #{index} was never created"
            );
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

/// A factory producing a fresh [`ChannelTransport`] per attempt.
pub fn recording_factory() -> (TransportFactory, TransportRecorder) {
    let recorder = TransportRecorder::default();
    let handles = recorder.handles.clone();
    let factory: TransportFactory = Arc::new(move || {
        let (transport, handle) = channel_transport();
        handles.lock().unwrap().push(handle);
        Box::new(transport)
    });
    (factory, recorder)
}

// ---------------------------------------------------------------------------
// FailingTransport
// ---------------------------------------------------------------------------

/// A transport whose `open()` always fails with a connection error.
pub struct FailingTransport {
    open_count: Arc<AtomicU32>,
}

impl FailingTransport {
    pub fn new(open_count: Arc<AtomicU32>) -> Self {
        Self { open_count }
    }
}

#[async_trait]
impl Transport for FailingTransport {
    async fn open(&mut self) -> Result<()> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        Err(Error::Connection("connection refused".into()))
    }

    async fn send_text(&mut self, _text: String) -> Result<()> {
        Err(Error::Connection("transport is not open".into()))
    }

    async fn next_frame(&mut self) -> Option<TransportFrame> {
        None
    }

    async fn close(&mut self, _code: u16, _reason: &str) -> Result<()> {
        Ok(())
    }
}

/// A factory whose transports never open. The counter is shared across all
/// transports it creates.
pub fn failing_factory() -> (TransportFactory, Arc<AtomicU32>) {
    let opened = Arc::new(AtomicU32::new(0));
    let counter = opened.clone();
    let factory: TransportFactory =
        Arc::new(move || Box::new(FailingTransport::new(counter.clone())));
    (factory, opened)
}
