//! ---
//! flk_section: "02-messaging-ipc-data-model"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Request/response bridging core."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use fleetlink_orchestrator::{ManifestOutcome, WorkloadRef};
use serde::Serialize;

use crate::{BridgeError, Result};

/// Decode a manifest request payload.
///
/// Manifests travel on the wire as raw YAML text and are handed to the
/// orchestrator verbatim; the bridge only requires that the bytes are UTF-8.
pub fn manifest_text(payload: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(payload)?)
}

/// Decode a state request payload into its field selector list.
///
/// The payload is a JSON array of selector strings. An empty array is valid
/// and means "the whole state document".
pub fn selectors(payload: &[u8]) -> Result<Vec<String>> {
    serde_json::from_slice(payload).map_err(BridgeError::SelectorDecode)
}

#[derive(Serialize)]
struct ManifestReplyBody<'a> {
    added_workloads: &'a [WorkloadRef],
    deleted_workloads: &'a [WorkloadRef],
}

/// Encode a manifest response body.
///
/// The caller has already established that the outcome is non-empty; an
/// outcome without changes is suppressed upstream and never serialized.
pub fn manifest_reply(outcome: &ManifestOutcome) -> Result<Vec<u8>> {
    let body = ManifestReplyBody {
        added_workloads: &outcome.added,
        deleted_workloads: &outcome.deleted,
    };
    serde_json::to_vec(&body).map_err(BridgeError::ResponseEncode)
}

/// Encode a state response body.
pub fn state_reply(state: &serde_json::Value) -> Result<Vec<u8>> {
    serde_json::to_vec(state).map_err(BridgeError::ResponseEncode)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn manifest_text_accepts_utf8() {
        let payload = b"apiVersion: v0.1\nworkloads:\n  - name: sensor-agent\n";
        assert_eq!(
            manifest_text(payload).expect("utf-8 payload"),
            "apiVersion: v0.1\nworkloads:\n  - name: sensor-agent\n"
        );
    }

    #[test]
    fn manifest_text_rejects_invalid_utf8() {
        let err = manifest_text(&[0xff, 0xfe, 0x00]).expect_err("invalid utf-8");
        assert!(matches!(err, BridgeError::ManifestEncoding(_)));
    }

    #[test]
    fn selectors_decode_json_arrays() {
        let payload = br#"["runtimeState.workloads", "desiredState"]"#;
        assert_eq!(
            selectors(payload).expect("selector list"),
            vec![
                "runtimeState.workloads".to_string(),
                "desiredState".to_string()
            ]
        );
        assert!(selectors(b"[]").expect("empty list").is_empty());
    }

    #[test]
    fn selectors_reject_malformed_json() {
        let err = selectors(b"not json").expect_err("malformed payload");
        assert!(matches!(err, BridgeError::SelectorDecode(_)));
        let err = selectors(br#"{"selector": true}"#).expect_err("wrong shape");
        assert!(matches!(err, BridgeError::SelectorDecode(_)));
    }

    #[test]
    fn manifest_reply_lists_added_before_deleted() {
        let outcome = ManifestOutcome {
            added: vec![WorkloadRef {
                name: "sensor-agent".into(),
                agent: "agent_A".into(),
                id: "0b9f".into(),
            }],
            deleted: Vec::new(),
        };
        let body = manifest_reply(&outcome).expect("encoded reply");
        let text = String::from_utf8(body).expect("utf-8 body");
        assert!(text.starts_with(r#"{"added_workloads""#), "body: {text}");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&text).expect("valid json"),
            json!({
                "added_workloads": [
                    {"name": "sensor-agent", "agent": "agent_A", "id": "0b9f"}
                ],
                "deleted_workloads": []
            })
        );
    }

    #[test]
    fn state_reply_passes_document_through() {
        let state = json!({"runtimeState": {"workloads": ["sensor-agent"]}});
        let body = state_reply(&state).expect("encoded reply");
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).expect("valid json"),
            state
        );
    }
}
