//! Test utilities for mnemograph - graph builders and snapshot fixtures
//!
//! Builders produce already-validated [`Graph`] values so layout, scene and
//! view tests don't have to go through JSON. The `*_json` helpers produce raw
//! payloads for tests that exercise validation and snapshot handling.

use serde_json::{Map, Value, json};

use crate::graph::{Edge, Graph, HistoryEntry, InvalidNode, LAYER_COUNT, Layer, Node, NodeKey, ParsedNode};

/// Decay used by builder nodes unless overridden
pub const DEFAULT_DECAY: f64 = 0.01;
/// Ease used by builder nodes unless overridden
pub const DEFAULT_EASE: f64 = 2.5;

/// Fluent builder for a single [`Node`]
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(decay_factor: f64, ease_factor: f64, time_last: f64) -> Self {
        Self {
            node: Node::new(decay_factor, ease_factor, time_last),
        }
    }

    pub fn time_next(mut self, time_next: f64) -> Self {
        self.node.time_next = time_next;
        self
    }

    pub fn review_interval(mut self, seconds: f64) -> Self {
        self.node.review_interval = seconds;
        self
    }

    /// Append a history entry; keep calls in ascending timestamp order
    pub fn review(mut self, timestamp: f64, ease_factor: f64, time_last: f64) -> Self {
        self.node.history.push(HistoryEntry {
            timestamp,
            ease_factor: Some(ease_factor),
            time_last: Some(time_last),
        });
        self
    }

    /// Append a history entry with no recorded decay parameters
    pub fn bare_review(mut self, timestamp: f64) -> Self {
        self.node.history.push(HistoryEntry {
            timestamp,
            ease_factor: None,
            time_last: None,
        });
        self
    }

    pub fn edge(mut self, layer: usize, label: &str, weight: f64) -> Self {
        self.node.next.push(Edge {
            target: NodeKey::new(layer, label),
            weight,
        });
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

/// Fluent builder for a [`Graph`]
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    layers: [Layer; LAYER_COUNT],
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with default parameters, reviewed at time 0
    pub fn node(self, layer: usize, label: &str) -> Self {
        self.with_node(layer, label, Node::new(DEFAULT_DECAY, DEFAULT_EASE, 0.0))
    }

    pub fn with_node(mut self, layer: usize, label: &str, node: Node) -> Self {
        if let Some(slot) = self.layers.get_mut(layer) {
            slot.insert(label.to_string(), ParsedNode::Valid(node));
        }
        self
    }

    pub fn invalid(mut self, layer: usize, label: &str, reason: &str) -> Self {
        if let Some(slot) = self.layers.get_mut(layer) {
            slot.insert(
                label.to_string(),
                ParsedNode::Invalid(InvalidNode {
                    reason: reason.to_string(),
                }),
            );
        }
        self
    }

    /// Add `count` default nodes labelled `{prefix}000`, `{prefix}001`, ...
    pub fn many(mut self, layer: usize, prefix: &str, count: usize) -> Self {
        for i in 0..count {
            self = self.node(layer, &format!("{prefix}{i:03}"));
        }
        self
    }

    pub fn build(self) -> Graph {
        Graph::new(self.layers)
    }
}

/// Raw node object with the required fields
pub fn node_json(decay_factor: f64, ease_factor: f64, time_last: f64) -> Value {
    json!({
        "decay_factor": decay_factor,
        "ease_factor": ease_factor,
        "time_last": time_last,
        "time_next": time_last,
        "review_interval": 0,
        "history": {},
        "next": []
    })
}

/// Wrap layer objects into a `{"nodes": [...]}` envelope
pub fn snapshot_json(layers: Vec<Value>) -> Value {
    json!({ "nodes": layers })
}

/// Build one layer object from `(label, node)` pairs
pub fn layer_json(entries: &[(&str, Value)]) -> Value {
    let map: Map<String, Value> = entries
        .iter()
        .map(|(label, node)| (label.to_string(), node.clone()))
        .collect();
    Value::Object(map)
}

/// A small vocabulary graph: one sentence, two words, three morphemes and a
/// few letters, with edges between adjacent layers and a review history on
/// every word.
pub fn sample_snapshot(now: f64) -> Value {
    let day = 86_400.0;
    let reviewed = now - day;

    json!({
        "nodes": [
            {
                "the cats": {
                    "decay_factor": 0.00002,
                    "ease_factor": 2.5,
                    "time_last": reviewed,
                    "time_next": now + day,
                    "review_interval": 2.0 * day,
                    "history": {
                        (reviewed - day).to_string(): {"ease_factor": 2.36, "time_last": reviewed - day},
                        reviewed.to_string(): {"ease_factor": 2.5, "time_last": reviewed}
                    },
                    "next": [[["the", 1], 1], [["cats", 1], 1]]
                }
            },
            {
                "the": {
                    "decay_factor": 0.00001,
                    "ease_factor": 2.8,
                    "time_last": reviewed,
                    "time_next": now + 3.0 * day,
                    "review_interval": 4.0 * day,
                    "history": {
                        reviewed.to_string(): {"ease_factor": 2.8, "time_last": reviewed}
                    },
                    "next": [[["the", 2], 1]]
                },
                "cats": {
                    "decay_factor": 0.0002,
                    "ease_factor": 1.3,
                    "time_last": reviewed,
                    "time_next": now - 3_600.0,
                    "review_interval": day,
                    "history": {
                        (reviewed - 2.0 * day).to_string(): {"ease_factor": 1.5, "time_last": reviewed - 2.0 * day},
                        reviewed.to_string(): {"ease_factor": 1.3, "time_last": reviewed}
                    },
                    "next": [[["cat", 2], 1], [["s", 2], 0.5]]
                }
            },
            {
                "the": node_json(0.00001, 2.5, reviewed),
                "cat": node_json(0.00003, 2.5, reviewed),
                "s": node_json(0.00001, 2.5, reviewed)
            },
            {
                "c": node_json(0.00001, 2.5, reviewed),
                "a": node_json(0.00001, 2.5, reviewed),
                "t": node_json(0.00001, 2.5, reviewed)
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_snapshot;

    #[test]
    fn test_graph_builder_ignores_out_of_range_layer() {
        let graph = GraphBuilder::new().node(0, "a").node(9, "b").build();
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_sample_snapshot_is_fully_valid() {
        let graph = parse_snapshot(&sample_snapshot(1_700_000_000.0)).unwrap();
        assert_eq!(graph.node_count(), 9);
        assert!(graph.layer_stats().iter().all(|s| s.invalid_nodes == 0 && s.skipped_edges == 0));
    }
}
