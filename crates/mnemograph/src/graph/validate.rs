//! Single validation pass from raw JSON to [`Graph`]
//!
//! Nothing downstream of this module inspects JSON. Malformed entries are
//! narrowed here: a bad node becomes [`ParsedNode::Invalid`], a bad edge is
//! counted and dropped, a bad layer becomes empty.

use serde_json::{Map, Value};

use crate::error::{MnemographError, Result};
use crate::graph::types::{
    Edge, Graph, HistoryEntry, InvalidNode, Layer, Node, NodeKey, ParsedNode,
};

/// Parse the `nodes` array of a snapshot
pub fn parse_graph(nodes: &Value) -> Result<Graph> {
    let raw_layers = nodes
        .as_array()
        .ok_or_else(|| MnemographError::Snapshot("`nodes` is not an array".to_string()))?;

    let layers = raw_layers
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_layer(index, raw))
        .collect();

    Graph::from_layers(layers)
}

/// Parse one layer object; anything other than an object is an empty layer
pub fn parse_layer(index: usize, value: &Value) -> Layer {
    let Some(entries) = value.as_object() else {
        tracing::warn!(layer = index, "Layer is not an object, treating as empty");
        return Layer::new();
    };

    entries
        .iter()
        .map(|(label, raw)| {
            let parsed = parse_node(raw);
            if let ParsedNode::Invalid(ref invalid) = parsed {
                tracing::warn!(
                    layer = index,
                    label = %label,
                    reason = %invalid.reason,
                    "Skipping malformed node"
                );
            }
            (label.clone(), parsed)
        })
        .collect()
}

/// Validate a single node object
pub fn parse_node(value: &Value) -> ParsedNode {
    match try_parse_node(value) {
        Ok(node) => ParsedNode::Valid(node),
        Err(reason) => ParsedNode::Invalid(InvalidNode { reason }),
    }
}

fn try_parse_node(value: &Value) -> std::result::Result<Node, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "node is not an object".to_string())?;

    let decay_factor = required_number(obj, "decay_factor")?;
    let ease_factor = required_number(obj, "ease_factor")?;
    let time_last = required_number(obj, "time_last")?;

    if decay_factor <= 0.0 {
        return Err(format!("decay_factor must be positive, got {decay_factor}"));
    }
    if ease_factor <= 0.0 {
        return Err(format!("ease_factor must be positive, got {ease_factor}"));
    }

    let time_next = optional_number(obj, "time_next")
        .unwrap_or(time_last)
        .max(time_last);
    let review_interval = optional_number(obj, "review_interval").unwrap_or(0.0);
    let history = parse_history(obj.get("history"));

    let mut next = Vec::new();
    let mut skipped_edges = 0;
    if let Some(raw_edges) = obj.get("next").and_then(Value::as_array) {
        for raw in raw_edges {
            match parse_edge(raw) {
                Some(edge) => next.push(edge),
                None => skipped_edges += 1,
            }
        }
    }
    if skipped_edges > 0 {
        tracing::debug!(skipped_edges, "Dropped malformed edge descriptors");
    }

    Ok(Node {
        decay_factor,
        ease_factor,
        time_last,
        time_next,
        review_interval,
        history,
        next,
        skipped_edges,
    })
}

/// Parse `[[targetLabel, targetDepth], weight]`, returning `None` for any
/// other shape
pub fn parse_edge(value: &Value) -> Option<Edge> {
    let outer = value.as_array().filter(|items| items.len() >= 2)?;
    let target = outer[0].as_array().filter(|items| items.len() >= 2)?;

    let label = target[0].as_str()?;
    let layer = as_index(&target[1])?;
    let weight = outer[1].as_f64().filter(|w| w.is_finite())?;

    Some(Edge {
        target: NodeKey::new(layer, label),
        weight,
    })
}

/// Parse the `{timestamp: {ease_factor, time_last}}` history map, sorted
/// ascending. Keys that are not finite numbers are dropped.
pub fn parse_history(value: Option<&Value>) -> Vec<HistoryEntry> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut history: Vec<HistoryEntry> = entries
        .iter()
        .filter_map(|(key, snapshot)| {
            let timestamp = key.trim().parse::<f64>().ok().filter(|t| t.is_finite())?;
            let snapshot = snapshot.as_object();
            Some(HistoryEntry {
                timestamp,
                ease_factor: snapshot
                    .and_then(|s| optional_number(s, "ease_factor"))
                    .filter(|e| *e > 0.0),
                time_last: snapshot.and_then(|s| optional_number(s, "time_last")),
            })
        })
        .collect();

    history.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    history
}

fn required_number(obj: &Map<String, Value>, field: &str) -> std::result::Result<f64, String> {
    optional_number(obj, field).ok_or_else(|| format!("missing numeric {field}"))
}

fn optional_number(obj: &Map<String, Value>, field: &str) -> Option<f64> {
    obj.get(field)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn as_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }
    value
        .as_f64()
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as usize)
}
