//! Per-frame scene composition
//!
//! Combines the validated graph, the position map, the current time and the
//! viewport transform into plain drawable primitives. A scene is rebuilt for
//! every frame and never mutated.

use serde::Serialize;

use crate::config::Config;
use crate::error::{MnemographError, Result};
use crate::graph::{Graph, NodeKey};
use crate::layout::{Position, PositionMap};
use crate::retention::{self, Rgb};
use crate::viewport::{ScreenPoint, Transform};

/// Edge stroke width at scale 1
const EDGE_STROKE: f64 = 2.0;

/// Visual parameters of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub node_size: f64,
    pub review_threshold: f64,
    pub grid_spacing: f64,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SceneStyle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            node_size: config.layout.node_size,
            review_threshold: config.retention.review_threshold,
            grid_spacing: config.viewport.grid_spacing,
        }
    }
}

/// A node as drawn in one frame (graph space)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSprite {
    pub key: NodeKey,
    pub center: Position,
    pub retention: f64,
    pub color: Rgb,
    /// Node is due or overdue for review
    pub decay_ring: bool,
}

/// A line between two positioned nodes (graph space)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub from: NodeKey,
    pub to: NodeKey,
    pub start: Position,
    pub end: Position,
    pub weight: f64,
    /// Divided by the scale so lines keep a constant on-screen width
    pub stroke_width: f64,
}

/// Background grid, expressed in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridBackground {
    pub offset_x: f64,
    pub offset_y: f64,
    pub spacing: f64,
}

/// Everything needed to draw one frame of the graph canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSegment>,
    pub grid: GridBackground,
    pub transform: Transform,
}

impl Scene {
    pub fn compose(
        graph: &Graph,
        positions: &PositionMap,
        transform: Transform,
        now: f64,
        style: &SceneStyle,
    ) -> Self {
        let nodes = graph
            .valid_nodes()
            .filter_map(|(key, node)| {
                let center = *positions.get(&key)?;
                let retention = node.retention(now);
                Some(NodeSprite {
                    key,
                    center,
                    retention,
                    color: retention::color(retention),
                    decay_ring: retention::below_threshold(retention, style.review_threshold),
                })
            })
            .collect();

        let edges = match edge_segments(graph, positions, EDGE_STROKE / transform.scale) {
            Ok(edges) => edges,
            Err(e) => {
                tracing::warn!("Edge rendering failed, drawing no edges this frame: {e}");
                Vec::new()
            }
        };

        Self {
            nodes,
            edges,
            grid: GridBackground {
                offset_x: transform.translate_x,
                offset_y: transform.translate_y,
                spacing: style.grid_spacing * transform.scale,
            },
            transform,
        }
    }

    pub fn node(&self, key: &NodeKey) -> Option<&NodeSprite> {
        self.nodes.iter().find(|sprite| &sprite.key == key)
    }
}

/// Line segments for every edge whose endpoints both have positions.
///
/// Edges to unknown or unpositioned nodes are skipped. Non-finite endpoint
/// coordinates fail the whole pass.
pub fn edge_segments(
    graph: &Graph,
    positions: &PositionMap,
    stroke_width: f64,
) -> Result<Vec<EdgeSegment>> {
    let mut segments = Vec::new();

    for (from, node) in graph.valid_nodes() {
        let Some(start) = positions.get(&from) else {
            continue;
        };

        for edge in &node.next {
            let Some(end) = positions.get(&edge.target) else {
                continue;
            };
            if !start.is_finite() || !end.is_finite() {
                return Err(MnemographError::Render(format!(
                    "non-finite endpoint on edge {from} -> {}",
                    edge.target
                )));
            }

            segments.push(EdgeSegment {
                from: from.clone(),
                to: edge.target.clone(),
                start: *start,
                end: *end,
                weight: edge.weight,
                stroke_width,
            });
        }
    }

    tracing::trace!(edges = segments.len(), "Edge segments built");
    Ok(segments)
}

/// First node (layer order, then label order) under a screen point
pub fn hit_test(
    positions: &PositionMap,
    transform: &Transform,
    at: ScreenPoint,
    node_size: f64,
) -> Option<NodeKey> {
    let point = transform.to_graph(at);
    let radius = node_size / 2.0;
    positions
        .iter()
        .find(|(_, center)| center.distance(&point) <= radius)
        .map(|(key, _)| key.clone())
}
