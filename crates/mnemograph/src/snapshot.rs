//! Snapshot envelopes and request sequencing
//!
//! A snapshot arrives either as `{"nodes": [...]}` or wrapped as
//! `{"knowledge_graph": {"nodes": [...]}}`. Fetches may complete out of order,
//! so every result carries the [`RequestId`] it was issued under and only the
//! newest one is applied.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{MnemographError, Result};
use crate::graph::{self, Graph};

/// Parse a snapshot envelope into a validated graph
pub fn parse_snapshot(payload: &Value) -> Result<Graph> {
    let nodes = extract_nodes(payload)?;
    let graph = graph::parse_graph(nodes)?;
    tracing::debug!(nodes = graph.node_count(), "Snapshot parsed");
    Ok(graph)
}

/// Parse a snapshot from its JSON text
pub fn parse_snapshot_str(text: &str) -> Result<Graph> {
    let payload: Value = serde_json::from_str(text)?;
    parse_snapshot(&payload)
}

fn extract_nodes(payload: &Value) -> Result<&Value> {
    let obj = payload
        .as_object()
        .ok_or_else(|| MnemographError::Snapshot("snapshot is not a JSON object".to_string()))?;

    if let Some(nodes) = obj.get("nodes") {
        return Ok(nodes);
    }

    obj.get("knowledge_graph")
        .and_then(|kg| kg.get("nodes"))
        .ok_or_else(|| {
            MnemographError::Snapshot(
                "snapshot has neither `nodes` nor `knowledge_graph.nodes`".to_string(),
            )
        })
}

/// Identifier of one snapshot request or push delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decides which snapshot deliveries may replace the current graph
#[derive(Debug, Clone, Default)]
pub struct SnapshotSequencer {
    issued: u64,
    applied: Option<RequestId>,
}

impl SnapshotSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id for a new fetch; older in-flight fetches become stale
    pub fn begin_request(&mut self) -> RequestId {
        self.issued += 1;
        RequestId(self.issued)
    }

    /// Whether a result for `id` would be applied right now
    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.issued && self.applied.is_none_or(|applied| id > applied)
    }

    /// Record `id` as applied if it is current. Returns `false` for stale
    /// results, which the caller must drop.
    pub fn accept(&mut self, id: RequestId) -> bool {
        if !self.is_current(id) {
            tracing::debug!(request = %id, latest = self.issued, "Discarding stale snapshot");
            return false;
        }
        self.applied = Some(id);
        true
    }

    /// A push delivery takes a fresh id at arrival and is applied immediately
    pub fn observe_push(&mut self) -> RequestId {
        let id = self.begin_request();
        self.applied = Some(id);
        id
    }

    pub fn last_applied(&self) -> Option<RequestId> {
        self.applied
    }

    pub fn latest_issued(&self) -> Option<RequestId> {
        (self.issued > 0).then_some(RequestId(self.issued))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_and_wrapped_envelopes() {
        let plain = json!({"nodes": [{}, {}, {}, {}]});
        let wrapped = json!({"knowledge_graph": {"nodes": [{}]}});
        assert!(parse_snapshot(&plain).is_ok());
        assert!(parse_snapshot(&wrapped).is_ok());
    }

    #[test]
    fn test_missing_nodes_is_snapshot_error() {
        let err = parse_snapshot(&json!({"graph": []})).unwrap_err();
        assert!(matches!(err, MnemographError::Snapshot(_)));

        let err = parse_snapshot(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MnemographError::Snapshot(_)));
    }

    #[test]
    fn test_invalid_json_text_is_serialization_error() {
        let err = parse_snapshot_str("{nodes:").unwrap_err();
        assert!(matches!(err, MnemographError::Serialization(_)));
    }

    #[test]
    fn test_only_latest_request_is_accepted() {
        let mut seq = SnapshotSequencer::new();
        let first = seq.begin_request();
        let second = seq.begin_request();

        assert!(!seq.accept(first));
        assert!(seq.accept(second));
        assert_eq!(seq.last_applied(), Some(second));
        // the same result delivered twice is applied once
        assert!(!seq.accept(second));
    }

    #[test]
    fn test_push_invalidates_in_flight_fetch() {
        let mut seq = SnapshotSequencer::new();
        let fetch = seq.begin_request();
        let push = seq.observe_push();

        assert!(push > fetch);
        assert!(!seq.accept(fetch));
        assert_eq!(seq.last_applied(), Some(push));
    }
}
