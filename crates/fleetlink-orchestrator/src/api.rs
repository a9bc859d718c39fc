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
use serde::{Deserialize, Serialize};

use crate::Result;

/// Reference to a single workload touched by a manifest operation.
///
/// Serialized field order is part of the response wire format, so `name`
/// stays first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRef {
    /// Workload name as given in the manifest.
    pub name: String,
    /// Agent the workload is scheduled on.
    pub agent: String,
    /// Instance id assigned by the orchestrator.
    pub id: String,
}

/// Workload changes reported for an apply or delete operation.
///
/// Both lists preserve the orchestrator's ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestOutcome {
    /// Workloads the operation created.
    pub added: Vec<WorkloadRef>,
    /// Workloads the operation removed.
    pub deleted: Vec<WorkloadRef>,
}

impl ManifestOutcome {
    /// True when the operation touched no workloads at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Control-plane operations the bridge depends on.
///
/// One long-lived handle is constructed at process start and shared for the
/// process lifetime. `apply_manifest` and `delete_manifest` return `None`
/// when the orchestrator reports that the manifest required no changes;
/// callers use that to suppress the response publication.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Apply a workload manifest. `None` means nothing needed to change.
    async fn apply_manifest(&self, manifest: &str) -> Result<Option<ManifestOutcome>>;

    /// Delete the workloads described by a manifest. `None` means nothing
    /// needed to change.
    async fn delete_manifest(&self, manifest: &str) -> Result<Option<ManifestOutcome>>;

    /// Read the orchestrator state filtered by the given field selectors.
    /// An empty selector list requests the complete state.
    async fn get_state(&self, selectors: &[String]) -> Result<serde_json::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_outcome_is_detected() {
        assert!(ManifestOutcome::default().is_empty());
        let outcome = ManifestOutcome {
            added: vec![WorkloadRef {
                name: "sensor-agent".into(),
                agent: "agent_A".into(),
                id: "0b9f".into(),
            }],
            deleted: Vec::new(),
        };
        assert!(!outcome.is_empty());
    }

    #[test]
    fn workload_ref_serializes_name_first() {
        let workload = WorkloadRef {
            name: "sensor-agent".into(),
            agent: "agent_A".into(),
            id: "0b9f".into(),
        };
        let json = serde_json::to_string(&workload).expect("serialize");
        assert_eq!(
            json,
            r#"{"name":"sensor-agent","agent":"agent_A","id":"0b9f"}"#
        );
    }
}
