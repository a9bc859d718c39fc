//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "MQTT transport adapter and bus traits."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::Result;

/// Outward-facing side of the bus as seen by the bridge.
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Subscribe to a topic. Subscribing to the same topic again is not an
    /// error; brokers treat it as a refresh.
    async fn subscribe(&self, topic: &str) -> Result<()>;

    /// Publish a payload on a topic.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

/// Callback surface the transport driver delivers events into.
///
/// Implementations must tolerate `on_connected` firing more than once; the
/// driver invokes it after every (re)connection. Neither callback may
/// propagate an error into the driver loop.
#[async_trait]
pub trait BusConsumer: Send + Sync {
    /// The broker connection was (re-)established.
    async fn on_connected(&self);

    /// A message arrived on a subscribed topic.
    async fn on_message(&self, topic: &str, payload: &[u8]);
}

/// A message recorded by [`InMemoryBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Destination topic.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

#[derive(Default)]
struct BusState {
    subscriptions: Vec<String>,
    published: Vec<PublishedMessage>,
}

/// Recording bus, primarily for tests and single-process integration.
///
/// Every subscribe and publish is captured and can be inspected afterwards;
/// nothing ever fails.
#[derive(Default)]
pub struct InMemoryBus {
    state: Mutex<BusState>,
}

impl InMemoryBus {
    /// Create an empty recording bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Topics subscribed so far, in call order (duplicates preserved).
    pub fn subscriptions(&self) -> Vec<String> {
        self.state.lock().subscriptions.clone()
    }

    /// Everything published so far, in call order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.lock().published.clone()
    }

    /// Payloads published on one specific topic, in call order.
    pub fn published_on(&self, topic: &str) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .published
            .iter()
            .filter(|message| message.topic == topic)
            .map(|message| message.payload.clone())
            .collect()
    }
}

#[async_trait]
impl BusPublisher for InMemoryBus {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.state.lock().subscriptions.push(topic.to_owned());
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.state.lock().published.push(PublishedMessage {
            topic: topic.to_owned(),
            payload,
        });
        Ok(())
    }
}
