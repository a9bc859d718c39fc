//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Workload orchestrator control-plane client."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
//! Client side of the workload orchestrator's control plane.
//!
//! The bridge consumes the orchestrator through the [`OrchestratorApi`]
//! trait so tests can substitute a fake; [`GrpcOrchestrator`] is the
//! production implementation speaking gRPC to the control plane.
#![warn(missing_docs)]

pub mod api;
pub mod grpc;

/// Shared result type for orchestrator calls.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors surfaced by the orchestrator control-plane client.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The control plane could not be reached when the client was built.
    #[error("failed to reach the orchestrator control plane: {0}")]
    Connect(#[from] tonic::transport::Error),
    /// The orchestrator rejected or failed a call.
    #[error("orchestrator {operation} failed: {message}")]
    Call {
        /// Which operation was attempted.
        operation: &'static str,
        /// Failure detail reported by the control plane.
        message: String,
    },
}

impl OrchestratorError {
    pub(crate) fn call(operation: &'static str, status: tonic::Status) -> Self {
        Self::Call {
            operation,
            message: format!("{}: {}", status.code(), status.message()),
        }
    }
}

pub use api::{ManifestOutcome, OrchestratorApi, WorkloadRef};
pub use grpc::GrpcOrchestrator;
