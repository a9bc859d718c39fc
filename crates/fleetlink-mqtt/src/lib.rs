//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "MQTT transport adapter and bus traits."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! Pub/sub transport boundary of the bridge.
//!
//! [`BusPublisher`] is what the bridge calls outward (subscribe, publish);
//! [`BusConsumer`] is the callback surface the transport driver delivers
//! inward. The production implementation wraps `rumqttc`; [`InMemoryBus`]
//! records traffic for tests and single-process integration.

pub mod bus;
pub mod link;

/// Shared result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised by the MQTT transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A subscribe or publish could not be handed to the client.
    #[error("mqtt request could not be queued: {0}")]
    Client(#[from] rumqttc::ClientError),
    /// The broker connection failed.
    #[error("mqtt connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
}

pub use bus::{BusConsumer, BusPublisher, InMemoryBus, PublishedMessage};
pub use link::{open, MqttDriver, MqttLink, MqttSettings, KEEPALIVE};
