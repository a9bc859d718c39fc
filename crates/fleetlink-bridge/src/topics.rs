//! ---
//! flk_section: "02-messaging-ipc-data-model"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Request/response bridging core."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use fleetlink_common::VehicleNamespace;

/// The three request operations the bridge serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Apply a workload manifest.
    ApplyManifest,
    /// Delete the workloads named by a manifest.
    DeleteManifest,
    /// Query the orchestrator state.
    State,
}

impl RequestKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::ApplyManifest => "manifest-apply",
            RequestKind::DeleteManifest => "manifest-delete",
            RequestKind::State => "state",
        }
    }
}

/// The namespace-qualified topic table.
///
/// Built once from the vehicle namespace; the request-to-response mapping is
/// static and total. Matching is exact, never prefix- or wildcard-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    apply_request: String,
    apply_response: String,
    delete_request: String,
    delete_response: String,
    state_request: String,
    state_response: String,
}

impl TopicSet {
    /// Derive the topic table for one vehicle namespace.
    pub fn new(namespace: &VehicleNamespace) -> Self {
        let ns = namespace.as_str();
        Self {
            apply_request: format!("{ns}/manifest/apply/req"),
            apply_response: format!("{ns}/manifest/apply/resp"),
            delete_request: format!("{ns}/manifest/delete/req"),
            delete_response: format!("{ns}/manifest/delete/resp"),
            state_request: format!("{ns}/state/req"),
            state_response: format!("{ns}/state/resp"),
        }
    }

    /// Map an inbound topic to its request kind, if it is one of ours.
    pub fn classify(&self, topic: &str) -> Option<RequestKind> {
        if topic == self.apply_request {
            Some(RequestKind::ApplyManifest)
        } else if topic == self.delete_request {
            Some(RequestKind::DeleteManifest)
        } else if topic == self.state_request {
            Some(RequestKind::State)
        } else {
            None
        }
    }

    /// The topics the bridge subscribes to on every (re)connect.
    pub fn request_topics(&self) -> [&str; 3] {
        [
            self.apply_request.as_str(),
            self.delete_request.as_str(),
            self.state_request.as_str(),
        ]
    }

    /// The response topic paired with a request kind.
    pub fn response_topic(&self, kind: RequestKind) -> &str {
        match kind {
            RequestKind::ApplyManifest => &self.apply_response,
            RequestKind::DeleteManifest => &self.delete_response,
            RequestKind::State => &self.state_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetlink_common::VehicleId;

    use super::*;

    fn topic_set() -> TopicSet {
        let vehicle = VehicleId::new("ABC123").expect("valid id");
        TopicSet::new(&VehicleNamespace::new(&vehicle))
    }

    #[test]
    fn derives_namespace_qualified_topics() {
        let topics = topic_set();
        assert_eq!(
            topics.request_topics(),
            [
                "vehicle/ABC123/manifest/apply/req",
                "vehicle/ABC123/manifest/delete/req",
                "vehicle/ABC123/state/req",
            ]
        );
        assert_eq!(
            topics.response_topic(RequestKind::ApplyManifest),
            "vehicle/ABC123/manifest/apply/resp"
        );
        assert_eq!(
            topics.response_topic(RequestKind::DeleteManifest),
            "vehicle/ABC123/manifest/delete/resp"
        );
        assert_eq!(
            topics.response_topic(RequestKind::State),
            "vehicle/ABC123/state/resp"
        );
    }

    #[test]
    fn classifies_request_topics_exactly() {
        let topics = topic_set();
        assert_eq!(
            topics.classify("vehicle/ABC123/manifest/apply/req"),
            Some(RequestKind::ApplyManifest)
        );
        assert_eq!(
            topics.classify("vehicle/ABC123/manifest/delete/req"),
            Some(RequestKind::DeleteManifest)
        );
        assert_eq!(
            topics.classify("vehicle/ABC123/state/req"),
            Some(RequestKind::State)
        );
    }

    #[test]
    fn rejects_near_misses() {
        let topics = topic_set();
        // Responses, prefixes, suffixes, and other vehicles never match.
        assert_eq!(topics.classify("vehicle/ABC123/state/resp"), None);
        assert_eq!(topics.classify("vehicle/ABC123/state/req/extra"), None);
        assert_eq!(topics.classify("vehicle/ABC123/state"), None);
        assert_eq!(topics.classify("vehicle/XYZ999/state/req"), None);
        assert_eq!(topics.classify(""), None);
    }
}
