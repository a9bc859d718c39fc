//! ---
//! flk_section: "02-messaging-ipc-data-model"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Request/response bridging core."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use std::sync::Arc;

use async_trait::async_trait;
use fleetlink_mqtt::{BusConsumer, BusPublisher};
use fleetlink_orchestrator::{ManifestOutcome, OrchestratorApi};
use tracing::{debug, error, info, trace, warn};

use crate::{protocol, BridgeError, BridgeMetrics, RequestKind, Result, TopicSet};

const PREVIEW_LIMIT: usize = 256;

/// What became of a successfully processed request.
enum Disposition {
    /// A response body was published.
    Replied,
    /// The request completed but produced nothing to report.
    Suppressed,
}

/// Routes vehicle-namespace requests to the orchestrator and publishes the
/// answers back to the broker.
///
/// The bridge is transport-agnostic: it subscribes and publishes through the
/// injected [`BusPublisher`] and reaches the orchestrator through the injected
/// [`OrchestratorApi`]. A failed request is logged, counted, and dropped; it
/// never produces a response and never tears down the session.
pub struct MessageBridge {
    topics: TopicSet,
    orchestrator: Arc<dyn OrchestratorApi>,
    bus: Arc<dyn BusPublisher>,
    metrics: BridgeMetrics,
}

impl MessageBridge {
    /// Assemble a bridge from its collaborators.
    pub fn new(
        topics: TopicSet,
        orchestrator: Arc<dyn OrchestratorApi>,
        bus: Arc<dyn BusPublisher>,
        metrics: BridgeMetrics,
    ) -> Self {
        Self {
            topics,
            orchestrator,
            bus,
            metrics,
        }
    }

    async fn dispatch(&self, kind: RequestKind, payload: &[u8]) -> Result<Disposition> {
        match kind {
            RequestKind::ApplyManifest => {
                let manifest = protocol::manifest_text(payload)?;
                let outcome = self.orchestrator.apply_manifest(manifest).await?;
                self.publish_manifest_outcome(kind, outcome).await
            }
            RequestKind::DeleteManifest => {
                let manifest = protocol::manifest_text(payload)?;
                let outcome = self.orchestrator.delete_manifest(manifest).await?;
                self.publish_manifest_outcome(kind, outcome).await
            }
            RequestKind::State => self.answer_state(payload).await,
        }
    }

    async fn publish_manifest_outcome(
        &self,
        kind: RequestKind,
        outcome: Option<ManifestOutcome>,
    ) -> Result<Disposition> {
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                debug!(
                    request = kind.as_str(),
                    "manifest required no changes; response suppressed"
                );
                return Ok(Disposition::Suppressed);
            }
        };
        if outcome.is_empty() {
            debug!(
                request = kind.as_str(),
                "manifest outcome empty; response suppressed"
            );
            return Ok(Disposition::Suppressed);
        }

        let body = protocol::manifest_reply(&outcome)?;
        let topic = self.topics.response_topic(kind);
        self.bus.publish(topic, body).await?;
        info!(
            topic,
            added = outcome.added.len(),
            deleted = outcome.deleted.len(),
            "manifest response published"
        );
        Ok(Disposition::Replied)
    }

    async fn answer_state(&self, payload: &[u8]) -> Result<Disposition> {
        let selectors = protocol::selectors(payload)?;
        let state = self.orchestrator.get_state(&selectors).await?;
        let body = protocol::state_reply(&state)?;
        let topic = self.topics.response_topic(RequestKind::State);
        self.bus.publish(topic, body).await?;
        info!(
            topic,
            selectors = selectors.len(),
            "state response published"
        );
        Ok(Disposition::Replied)
    }
}

#[async_trait]
impl BusConsumer for MessageBridge {
    async fn on_connected(&self) {
        // Runs again after every broker reconnect; subscriptions are
        // idempotent on the broker side.
        for topic in self.topics.request_topics() {
            match self.bus.subscribe(topic).await {
                Ok(()) => info!(topic, "subscribed"),
                Err(err) => error!(topic, error = %err, "subscription failed"),
            }
        }
    }

    async fn on_message(&self, topic: &str, payload: &[u8]) {
        debug!(topic, bytes = payload.len(), "received message");
        let kind = match self.topics.classify(topic) {
            Some(kind) => kind,
            None => {
                trace!(topic, "ignoring message outside the request set");
                return;
            }
        };

        self.metrics.observe_request(kind);
        match self.dispatch(kind, payload).await {
            Ok(Disposition::Replied) => self.metrics.observe_reply(kind),
            Ok(Disposition::Suppressed) => self.metrics.observe_suppressed(kind),
            Err(err) => {
                self.metrics.observe_dropped(kind, err.class());
                match &err {
                    BridgeError::ManifestEncoding(_) | BridgeError::SelectorDecode(_) => warn!(
                        topic,
                        request = kind.as_str(),
                        error = %err,
                        payload = %payload_preview(payload),
                        "undecodable request dropped"
                    ),
                    _ => error!(
                        topic,
                        request = kind.as_str(),
                        error = %err,
                        "request dropped after dispatch failure"
                    ),
                }
            }
        }
    }
}

/// Render a payload for log output, lossily and bounded in length.
fn payload_preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() <= PREVIEW_LIMIT {
        text.into_owned()
    } else {
        let mut preview: String = text.chars().take(PREVIEW_LIMIT).collect();
        preview.push_str("...");
        preview
    }
}
