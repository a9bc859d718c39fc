//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Workload orchestrator control-plane client."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use async_trait::async_trait;
use prost_types::value::Kind;
use prost_types::Struct;
use tonic::transport::Channel;
use tonic::Request;

use crate::api::{ManifestOutcome, OrchestratorApi, WorkloadRef};
use crate::{OrchestratorError, Result};

#[allow(missing_docs)]
pub mod proto {
    tonic::include_proto!("fleetlink");
}

use proto::control_plane_client::ControlPlaneClient;

/// gRPC implementation of the orchestrator control plane.
///
/// The channel is established eagerly in [`GrpcOrchestrator::connect`] so a
/// missing orchestrator is caught at startup rather than on the first
/// request. The underlying client is cheap to clone; each call clones it to
/// satisfy tonic's `&mut self` calling convention.
#[derive(Debug, Clone)]
pub struct GrpcOrchestrator {
    client: ControlPlaneClient<Channel>,
}

impl GrpcOrchestrator {
    /// Connect to the control plane at `endpoint`, e.g. `http://127.0.0.1:25551`.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let client = ControlPlaneClient::connect(endpoint.to_string()).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OrchestratorApi for GrpcOrchestrator {
    async fn apply_manifest(&self, manifest: &str) -> Result<Option<ManifestOutcome>> {
        let mut client = self.client.clone();
        let reply = client
            .apply_manifest(Request::new(proto::ManifestRequest {
                manifest: manifest.to_owned(),
            }))
            .await
            .map_err(|status| OrchestratorError::call("apply manifest", status))?
            .into_inner();
        Ok(reply.outcome.map(ManifestOutcome::from))
    }

    async fn delete_manifest(&self, manifest: &str) -> Result<Option<ManifestOutcome>> {
        let mut client = self.client.clone();
        let reply = client
            .delete_manifest(Request::new(proto::ManifestRequest {
                manifest: manifest.to_owned(),
            }))
            .await
            .map_err(|status| OrchestratorError::call("delete manifest", status))?
            .into_inner();
        Ok(reply.outcome.map(ManifestOutcome::from))
    }

    async fn get_state(&self, selectors: &[String]) -> Result<serde_json::Value> {
        let mut client = self.client.clone();
        let reply = client
            .get_state(Request::new(proto::StateRequest {
                field_selectors: selectors.to_vec(),
            }))
            .await
            .map_err(|status| OrchestratorError::call("get state", status))?
            .into_inner();
        // An absent snapshot is indistinguishable from an empty one for the
        // caller, so both come back as an empty object.
        Ok(reply
            .state
            .map(struct_to_json)
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())))
    }
}

impl From<proto::WorkloadRef> for WorkloadRef {
    fn from(value: proto::WorkloadRef) -> Self {
        Self {
            name: value.name,
            agent: value.agent,
            id: value.id,
        }
    }
}

impl From<proto::ManifestOutcome> for ManifestOutcome {
    fn from(value: proto::ManifestOutcome) -> Self {
        Self {
            added: value.added.into_iter().map(WorkloadRef::from).collect(),
            deleted: value.deleted.into_iter().map(WorkloadRef::from).collect(),
        }
    }
}

fn struct_to_json(value: Struct) -> serde_json::Value {
    let map = value
        .fields
        .into_iter()
        .map(|(key, value)| (key, prost_to_json_value(value)))
        .collect();
    serde_json::Value::Object(map)
}

fn prost_to_json_value(value: prost_types::Value) -> serde_json::Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(prost_to_json_value).collect(),
        ),
        Some(Kind::StructValue(nested)) => struct_to_json(nested),
    }
}
