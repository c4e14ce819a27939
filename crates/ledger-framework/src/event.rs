//! # Ledger Events
//!
//! Contracts announce what they did through an [`EventSink`]. Inside an invocation the
//! sink is the [`Transaction`](crate::Transaction), which holds events back until the
//! commit lands. The host then hands them to its own long-lived sink.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// A tagged notification with a serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub tag: String,
    pub detail: Vec<u8>,
}

impl LedgerEvent {
    pub fn new(tag: impl Into<String>, detail: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: tag.into(),
            detail: detail.into(),
        }
    }

    /// The detail bytes as text, lossily.
    pub fn detail_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.detail)
    }
}

/// Fire-and-forget event publication.
pub trait EventSink: Send + Sync {
    fn publish(&self, tag: &str, detail: Vec<u8>);
}

/// Fans events out to any number of async subscribers.
///
/// Publishing never blocks. With no subscriber the event is dropped; a slow subscriber
/// that falls more than `capacity` events behind sees `RecvError::Lagged`.
#[derive(Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<LedgerEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, tag: &str, detail: Vec<u8>) {
        let receivers = self.sender.send(LedgerEvent::new(tag, detail)).unwrap_or(0);
        debug!(tag, receivers, "Event broadcast");
    }
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, tag: &str, detail: Vec<u8>) {
        info!(tag, detail = %String::from_utf8_lossy(&detail), "Event");
    }
}

/// Delivers each event to several sinks in order.
#[derive(Clone, Default)]
pub struct Fanout {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for Fanout {
    fn publish(&self, tag: &str, detail: Vec<u8>) {
        for sink in &self.sinks {
            sink.publish(tag, detail.clone());
        }
    }
}
