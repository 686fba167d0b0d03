//! Integration tests for snapshot parsing, validation and sources

use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

use mnemograph::MnemographError;
use mnemograph::graph::{LAYER_COUNT, NodeKey, ParsedNode};
use mnemograph::snapshot::{RequestId, SnapshotSequencer, parse_snapshot, parse_snapshot_str};
use mnemograph::source::{
    FetchOutcome, FileSnapshotSource, MemorySnapshotSource, SnapshotSource, spawn_fetch,
};
use mnemograph::testing::{layer_json, node_json, sample_snapshot, snapshot_json};

const NOW: f64 = 1_700_000_000.0;

// ===== Envelopes =====

#[test]
fn test_wrapped_envelope_matches_plain() {
    let plain = sample_snapshot(NOW);
    let wrapped = json!({ "knowledge_graph": { "nodes": plain["nodes"].clone() } });

    assert_eq!(parse_snapshot(&plain).unwrap(), parse_snapshot(&wrapped).unwrap());
}

#[test]
fn test_short_snapshot_is_padded() {
    let payload = snapshot_json(vec![layer_json(&[("hello", node_json(0.01, 2.5, NOW))])]);
    let graph = parse_snapshot(&payload).unwrap();

    assert_eq!(graph.layers().len(), LAYER_COUNT);
    assert_eq!(graph.node_count(), 1);
    assert!(graph.layer(3).unwrap().is_empty());
}

#[test]
fn test_too_many_layers_is_rejected() {
    let payload = snapshot_json(vec![json!({}); 5]);
    let err = parse_snapshot(&payload).unwrap_err();
    assert!(matches!(err, MnemographError::Snapshot(_)));
}

#[test]
fn test_nodes_must_be_an_array() {
    let err = parse_snapshot(&json!({"nodes": {"0": {}}})).unwrap_err();
    assert!(matches!(err, MnemographError::Snapshot(_)));
}

// ===== Validation =====

#[test]
fn test_bad_nodes_do_not_poison_the_layer() {
    let payload = snapshot_json(vec![layer_json(&[
        ("good", node_json(0.01, 2.5, NOW)),
        ("no_ease", json!({"decay_factor": 0.01, "time_last": NOW})),
        ("negative", node_json(-1.0, 2.5, NOW)),
        ("text", json!("not a node")),
    ])]);
    let graph = parse_snapshot(&payload).unwrap();

    assert_eq!(graph.node_count(), 1);
    assert!(graph.node(&NodeKey::new(0, "good")).is_some());

    let layer = graph.layer(0).unwrap();
    assert_eq!(layer.len(), 4);
    assert!(matches!(layer["no_ease"], ParsedNode::Invalid(_)));

    let stats = &graph.layer_stats()[0];
    assert_eq!(stats.valid_nodes, 1);
    assert_eq!(stats.invalid_nodes, 3);
}

#[test]
fn test_non_object_layers_become_empty() {
    let payload = snapshot_json(vec![json!([1, 2]), json!(null), layer_json(&[("x", node_json(0.01, 2.5, NOW))])]);
    let graph = parse_snapshot(&payload).unwrap();

    assert!(graph.layer(0).unwrap().is_empty());
    assert!(graph.layer(1).unwrap().is_empty());
    assert!(graph.node(&NodeKey::new(2, "x")).is_some());
}

#[test]
fn test_edges_survive_validation() {
    let graph = parse_snapshot(&sample_snapshot(NOW)).unwrap();
    let cats = graph.node(&NodeKey::new(1, "cats")).unwrap();

    let targets: Vec<String> = cats.next.iter().map(|e| e.target.to_string()).collect();
    assert_eq!(targets, vec!["2-cat", "2-s"]);
    assert_eq!(cats.next[1].weight, 0.5);
    assert_eq!(cats.history.len(), 2);
    assert!(cats.history[0].timestamp < cats.history[1].timestamp);
}

#[test]
fn test_snapshot_text_round_trip() {
    let text = serde_json::to_string(&sample_snapshot(NOW)).unwrap();
    let graph = parse_snapshot_str(&text).unwrap();
    assert_eq!(graph.node_count(), 9);
}

// ===== Sequencing =====

#[test]
fn test_out_of_order_results() {
    let mut seq = SnapshotSequencer::new();
    let a = seq.begin_request();
    let b = seq.begin_request();
    let c = seq.begin_request();

    // c resolves first, then the older ones trickle in
    assert!(seq.accept(c));
    assert!(!seq.accept(a));
    assert!(!seq.accept(b));
    assert_eq!(seq.last_applied(), Some(c));
    assert_eq!(seq.latest_issued(), Some(RequestId(3)));
}

// ===== Sources =====

#[tokio::test]
async fn test_file_source_feeds_parser() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_vec(&sample_snapshot(NOW)).unwrap()).unwrap();

    let source = FileSnapshotSource::new(&path);
    let graph = parse_snapshot(&source.fetch().await.unwrap()).unwrap();
    assert_eq!(graph.node_count(), 9);
}

#[tokio::test]
async fn test_file_source_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = FileSnapshotSource::new(&path).fetch().await.unwrap_err();
    assert!(matches!(err, MnemographError::Serialization(_)));
}

#[tokio::test]
async fn test_concurrent_fetches_only_latest_applies() {
    let source: Arc<dyn SnapshotSource> = Arc::new(MemorySnapshotSource::new(sample_snapshot(NOW)));
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut seq = SnapshotSequencer::new();

    let ids: Vec<RequestId> = (0..3).map(|_| seq.begin_request()).collect();
    for id in &ids {
        spawn_fetch(source.clone(), *id, tx.clone());
    }
    drop(tx);

    let mut applied = Vec::new();
    while let Some(outcome) = rx.recv().await {
        assert!(outcome.payload.is_ok());
        if seq.accept(outcome.request) {
            applied.push(outcome.request);
        }
    }
    assert_eq!(applied, vec![ids[2]]);
}
