//! ---
//! flk_section: "03-persistence-logging"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Bridge traffic counters."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use prometheus::{IntCounterVec, Opts, Registry};

use crate::RequestKind;

/// Prometheus metric handles for bridge traffic.
///
/// Every inbound request ends in exactly one of three counters: replied,
/// suppressed, or dropped.
#[derive(Clone)]
pub struct BridgeMetrics {
    requests: IntCounterVec,
    replies: IntCounterVec,
    suppressed: IntCounterVec,
    dropped: IntCounterVec,
}

impl BridgeMetrics {
    /// Register bridge metrics with the provided registry.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests = IntCounterVec::new(
            Opts::new(
                "fleetlink_requests_total",
                "Requests received on the vehicle namespace",
            ),
            &["request"],
        )?;
        let replies = IntCounterVec::new(
            Opts::new(
                "fleetlink_replies_total",
                "Responses published back to the broker",
            ),
            &["request"],
        )?;
        let suppressed = IntCounterVec::new(
            Opts::new(
                "fleetlink_suppressed_total",
                "Requests that completed without an outcome to report",
            ),
            &["request"],
        )?;
        let dropped = IntCounterVec::new(
            Opts::new(
                "fleetlink_dropped_total",
                "Requests discarded after a processing failure",
            ),
            &["request", "class"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(replies.clone()))?;
        registry.register(Box::new(suppressed.clone()))?;
        registry.register(Box::new(dropped.clone()))?;

        Ok(Self {
            requests,
            replies,
            suppressed,
            dropped,
        })
    }

    /// Record an inbound request.
    pub fn observe_request(&self, kind: RequestKind) {
        self.requests.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record a published response.
    pub fn observe_reply(&self, kind: RequestKind) {
        self.replies.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record a request that finished without a response.
    pub fn observe_suppressed(&self, kind: RequestKind) {
        self.suppressed.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record a dropped request by failure class.
    pub fn observe_dropped(&self, kind: RequestKind, class: &str) {
        self.dropped
            .with_label_values(&[kind.as_str(), class])
            .inc();
    }

    /// Current request count for one request kind.
    pub fn request_count(&self, kind: RequestKind) -> u64 {
        self.requests.with_label_values(&[kind.as_str()]).get()
    }

    /// Current reply count for one request kind.
    pub fn reply_count(&self, kind: RequestKind) -> u64 {
        self.replies.with_label_values(&[kind.as_str()]).get()
    }

    /// Current suppressed count for one request kind.
    pub fn suppressed_count(&self, kind: RequestKind) -> u64 {
        self.suppressed.with_label_values(&[kind.as_str()]).get()
    }

    /// Current dropped count for one request kind and failure class.
    pub fn dropped_count(&self, kind: RequestKind, class: &str) -> u64 {
        self.dropped
            .with_label_values(&[kind.as_str(), class])
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_record_per_request_counts() {
        let registry = Registry::new();
        let metrics = BridgeMetrics::register(&registry).expect("register metrics");
        metrics.observe_request(RequestKind::State);
        metrics.observe_request(RequestKind::State);
        metrics.observe_reply(RequestKind::State);
        metrics.observe_suppressed(RequestKind::ApplyManifest);
        metrics.observe_dropped(RequestKind::DeleteManifest, "decode");

        assert_eq!(metrics.request_count(RequestKind::State), 2);
        assert_eq!(metrics.reply_count(RequestKind::State), 1);
        assert_eq!(metrics.suppressed_count(RequestKind::ApplyManifest), 1);
        assert_eq!(
            metrics.dropped_count(RequestKind::DeleteManifest, "decode"),
            1
        );
        assert_eq!(metrics.dropped_count(RequestKind::State, "decode"), 0);

        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "fleetlink_requests_total"));
        assert!(families
            .iter()
            .any(|f| f.get_name() == "fleetlink_dropped_total"));
    }
}
