//! ---
//! flk_section: "02-messaging-ipc-data-model"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Request/response bridging core."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! The decision-making core of fleetlink.
//!
//! [`MessageBridge`] owns the request topic set, decodes inbound payloads,
//! calls the orchestrator, and publishes normalized responses. Everything
//! around it (broker link, orchestrator channel, configuration) is injected,
//! so the whole request path is testable with in-memory fakes.
#![warn(missing_docs)]

pub mod bridge;
pub mod metrics;
pub mod protocol;
pub mod topics;

use fleetlink_mqtt::TransportError;
use fleetlink_orchestrator::OrchestratorError;

/// Shared result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure of a single request. Every variant is caught in the message
/// callback, logged, and dropped; none of them stops the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A manifest payload was not valid UTF-8 text.
    #[error("manifest payload is not valid UTF-8: {0}")]
    ManifestEncoding(#[from] std::str::Utf8Error),
    /// A state request payload was not a JSON array of selector strings.
    #[error("state selector payload is not a JSON string array: {0}")]
    SelectorDecode(#[source] serde_json::Error),
    /// A response body could not be serialized.
    #[error("response body could not be encoded: {0}")]
    ResponseEncode(#[source] serde_json::Error),
    /// The orchestrator rejected or failed the call.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    /// The response could not be handed to the transport.
    #[error("response publish failed: {0}")]
    Publish(#[from] TransportError),
}

impl BridgeError {
    /// Coarse failure class used as a metrics label and log field.
    pub fn class(&self) -> &'static str {
        match self {
            BridgeError::ManifestEncoding(_) | BridgeError::SelectorDecode(_) => "decode",
            BridgeError::ResponseEncode(_) => "encode",
            BridgeError::Orchestrator(_) => "orchestration",
            BridgeError::Publish(_) => "transport",
        }
    }
}

pub use bridge::MessageBridge;
pub use metrics::BridgeMetrics;
pub use topics::{RequestKind, TopicSet};
