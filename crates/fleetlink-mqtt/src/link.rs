//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "MQTT transport adapter and bus traits."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tracing::{debug, info, warn};

use crate::bus::{BusConsumer, BusPublisher};
use crate::{Result, TransportError};

/// Broker keepalive interval. Fixed by the fleet protocol contract.
pub const KEEPALIVE: Duration = Duration::from_secs(60);

/// Pause before polling again after a connection error.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Request channel capacity of the underlying client.
const CHANNEL_CAPACITY: usize = 32;

/// Connection parameters for the broker link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker TCP port.
    pub port: u16,
    /// Client identifier presented to the broker. One bridge process per
    /// vehicle, so deriving it from the vehicle id keeps sessions unique.
    pub client_id: String,
}

/// Open a broker link. The returned [`MqttLink`] is the publishing half;
/// the [`EventLoop`] must be handed to an [`MqttDriver`] to make progress.
pub fn open(settings: MqttSettings) -> (MqttLink, EventLoop) {
    info!(
        host = %settings.host,
        port = settings.port,
        client_id = %settings.client_id,
        "mqtt link configured"
    );
    let mut options = MqttOptions::new(settings.client_id, settings.host, settings.port);
    options.set_keep_alive(KEEPALIVE);
    let (client, eventloop) = AsyncClient::new(options, CHANNEL_CAPACITY);
    (MqttLink { client }, eventloop)
}

/// Publishing half of the broker connection.
///
/// All traffic uses QoS 0: requests are idempotent from the bridge's point
/// of view and callers resend if they need a retry.
#[derive(Clone)]
pub struct MqttLink {
    client: AsyncClient,
}

#[async_trait]
impl BusPublisher for MqttLink {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.client.subscribe(topic, QoS::AtMostOnce).await?;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await?;
        Ok(())
    }
}

/// Drives the broker event loop and feeds a [`BusConsumer`].
///
/// Consumer callbacks are awaited before the next poll, so message handling
/// is serialized in arrival order.
pub struct MqttDriver {
    eventloop: EventLoop,
    consumer: Arc<dyn BusConsumer>,
}

impl MqttDriver {
    /// Pair an event loop with the consumer receiving its events.
    pub fn new(eventloop: EventLoop, consumer: Arc<dyn BusConsumer>) -> Self {
        Self { eventloop, consumer }
    }

    /// Run the network loop until a fatal error.
    ///
    /// A failure before the first successful connection is fatal and
    /// returned to the caller; once connected, connection errors are logged
    /// and retried after a short backoff, forever. The loop never exits on
    /// its own after that point, mirroring the keep-serving contract of the
    /// bridge.
    pub async fn run(mut self) -> Result<()> {
        let mut connected = false;
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected = true;
                    info!("connected to mqtt broker");
                    self.consumer.on_connected().await;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.consumer
                        .on_message(&publish.topic, &publish.payload)
                        .await;
                }
                Ok(event) => {
                    debug!(?event, "mqtt event");
                }
                Err(err) if !connected => {
                    return Err(TransportError::Connection(err));
                }
                Err(err) => {
                    warn!(error = %err, "mqtt connection lost; retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keepalive_matches_protocol_contract() {
        assert_eq!(KEEPALIVE, Duration::from_secs(60));
    }

    #[test]
    fn open_returns_usable_halves() {
        let (link, _eventloop) = open(MqttSettings {
            host: "localhost".into(),
            port: 1883,
            client_id: "fleetlink-ABC123".into(),
        });
        // Publishing half must be clonable for shared ownership.
        let _clone = link.clone();
    }
}
