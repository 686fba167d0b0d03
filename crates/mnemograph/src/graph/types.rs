//! Graph types for mnemograph
//!
//! A graph is a fixed stack of four layers. Every entry in a layer has already
//! been through validation, so it is either a usable [`Node`] or an
//! [`InvalidNode`] carrying the reason it was rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MnemographError, Result};
use crate::retention;

/// Number of layers in every graph (input, unit, sub-unit, atomic)
pub const LAYER_COUNT: usize = 4;

/// Naming scheme for the four layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    /// Sentences broken into words, morphemes and letters
    #[default]
    Vocabulary,
    /// Articles broken into sections, concepts and details
    Article,
}

impl GraphMode {
    pub fn layer_titles(&self) -> [&'static str; LAYER_COUNT] {
        match self {
            GraphMode::Vocabulary => ["Input", "Word", "Morpheme", "Letter"],
            GraphMode::Article => ["Article", "Section", "Concept", "Detail"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphMode::Vocabulary => "vocabulary",
            GraphMode::Article => "article",
        }
    }
}

/// Identifies a node by the layer it lives in and its label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeKey {
    pub layer: usize,
    pub label: String,
}

impl NodeKey {
    pub fn new(layer: usize, label: impl Into<String>) -> Self {
        Self {
            layer,
            label: label.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.layer, self.label)
    }
}

/// Decay parameters recorded at one past review
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// When the review happened (unix seconds)
    pub timestamp: f64,
    /// Ease factor in effect from this review on
    pub ease_factor: Option<f64>,
    /// Decay reference time in effect from this review on
    pub time_last: Option<f64>,
}

/// Directed weighted edge to a node in any layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub target: NodeKey,
    pub weight: f64,
}

/// A validated memory item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Rate constant of the forgetting curve (> 0)
    pub decay_factor: f64,
    /// Difficulty divisor (> 0); higher ease slows decay
    pub ease_factor: f64,
    /// Reference time of the current decay (unix seconds)
    pub time_last: f64,
    /// Scheduled next review, never earlier than `time_last`
    pub time_next: f64,
    /// Seconds between `time_last` and the next review
    pub review_interval: f64,
    /// Past reviews, ascending by timestamp
    pub history: Vec<HistoryEntry>,
    /// Outgoing edges
    pub next: Vec<Edge>,
    /// Edge descriptors dropped during validation
    #[serde(skip)]
    pub skipped_edges: usize,
}

impl Node {
    /// Create a node reviewed at `time_last` with no history or edges
    pub fn new(decay_factor: f64, ease_factor: f64, time_last: f64) -> Self {
        Self {
            decay_factor,
            ease_factor,
            time_last,
            time_next: time_last,
            review_interval: 0.0,
            history: Vec::new(),
            next: Vec::new(),
            skipped_edges: 0,
        }
    }

    /// Current retention of this node
    pub fn retention(&self, now: f64) -> f64 {
        retention::retention(self.decay_factor, self.ease_factor, self.time_last, now)
    }

    /// Time of the most recent review, falling back to `time_last`
    pub fn last_review(&self) -> f64 {
        self.history
            .last()
            .map(|entry| entry.timestamp)
            .unwrap_or(self.time_last)
    }
}

/// A layer entry that failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidNode {
    pub reason: String,
}

/// Result of validating one raw layer entry
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNode {
    Valid(Node),
    Invalid(InvalidNode),
}

impl ParsedNode {
    pub fn as_valid(&self) -> Option<&Node> {
        match self {
            ParsedNode::Valid(node) => Some(node),
            ParsedNode::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedNode::Valid(_))
    }
}

/// One depth level, keyed (and iterated) by label
pub type Layer = BTreeMap<String, ParsedNode>;

/// Per-layer validation counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerStats {
    pub layer: usize,
    pub valid_nodes: usize,
    pub invalid_nodes: usize,
    pub edges: usize,
    pub skipped_edges: usize,
}

/// A complete graph snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    layers: [Layer; LAYER_COUNT],
}

impl Graph {
    /// The graph with four empty layers
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(layers: [Layer; LAYER_COUNT]) -> Self {
        Self { layers }
    }

    /// Build a graph from up to four layers; missing layers are empty
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        if layers.len() > LAYER_COUNT {
            return Err(MnemographError::Snapshot(format!(
                "expected at most {LAYER_COUNT} layers, got {}",
                layers.len()
            )));
        }

        let mut graph = Self::empty();
        for (slot, layer) in graph.layers.iter_mut().zip(layers) {
            *slot = layer;
        }
        Ok(graph)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Look up a valid node
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.layers
            .get(key.layer)
            .and_then(|layer| layer.get(&key.label))
            .and_then(ParsedNode::as_valid)
    }

    /// All valid nodes in layer order, then label order
    pub fn valid_nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> + '_ {
        self.layers.iter().enumerate().flat_map(|(index, layer)| {
            layer.iter().filter_map(move |(label, parsed)| {
                parsed
                    .as_valid()
                    .map(|node| (NodeKey::new(index, label.clone()), node))
            })
        })
    }

    pub fn node_count(&self) -> usize {
        self.valid_nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_empty())
    }

    pub fn layer_stats(&self) -> Vec<LayerStats> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let mut stats = LayerStats {
                    layer: index,
                    ..LayerStats::default()
                };
                for parsed in layer.values() {
                    match parsed {
                        ParsedNode::Valid(node) => {
                            stats.valid_nodes += 1;
                            stats.edges += node.next.len();
                            stats.skipped_edges += node.skipped_edges;
                        }
                        ParsedNode::Invalid(_) => stats.invalid_nodes += 1,
                    }
                }
                stats
            })
            .collect()
    }
}
