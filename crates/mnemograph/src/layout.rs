//! Row-packing layout engine
//!
//! Places every valid node of a [`Graph`] on a 2-D canvas:
//!   1. Group non-empty layers by depth
//!   2. For each candidate "max nodes per row" `k`, measure the bounding box
//!   3. Score each candidate by how close its aspect ratio is to the target,
//!      strongly preferring wide layouts, with a capped bonus for width
//!   4. Re-walk the layers with the winning `k`, centering every row
//!
//! The search is an exhaustive scan over a bounded range of `k`. Output is
//! deterministic: identical input yields an identical position map.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::config::LayoutConfig;
use crate::graph::{Graph, NodeKey};

/// Node center in graph space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Positions keyed by `(layer, label)`
pub type PositionMap = BTreeMap<NodeKey, Position>;

/// Bounding size of a candidate layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutSize {
    pub width: f64,
    pub height: f64,
}

impl LayoutSize {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// The winning row-packing candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PackingChoice {
    pub max_nodes_per_row: usize,
    pub size: LayoutSize,
    pub score: f64,
}

/// Result of a full layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub positions: PositionMap,
    /// `None` when the graph had no nodes to place
    pub packing: Option<PackingChoice>,
}

/// One layer's contribution to a depth block
#[derive(Debug, Clone)]
struct LayerSlice<'a> {
    layer: usize,
    labels: Vec<&'a str>,
}

impl LayerSlice<'_> {
    fn nodes_per_row(&self, max_nodes_per_row: usize) -> usize {
        max_nodes_per_row.min(self.labels.len()).max(1)
    }

    fn row_count(&self, max_nodes_per_row: usize) -> usize {
        self.labels.len().div_ceil(self.nodes_per_row(max_nodes_per_row))
    }
}

#[derive(Debug, Clone)]
struct DepthGroup<'a> {
    layers: Vec<LayerSlice<'a>>,
}

/// Computes node positions for a graph and canvas size
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out every valid node of `graph`
    pub fn layout(&self, graph: &Graph, canvas_width: f64, canvas_height: f64) -> Layout {
        let groups = group_by_depth(graph);
        if groups.is_empty() {
            tracing::debug!("Layout skipped: graph has no nodes");
            return Layout::default();
        }

        let Some(packing) = self.choose_packing(&groups, canvas_width) else {
            return Layout::default();
        };

        let positions = self.place(&groups, packing.max_nodes_per_row, canvas_width);
        tracing::debug!(
            nodes = positions.len(),
            max_nodes_per_row = packing.max_nodes_per_row,
            width = packing.size.width,
            height = packing.size.height,
            canvas_width,
            canvas_height,
            "Layout recomputed"
        );

        Layout {
            positions,
            packing: Some(packing),
        }
    }

    /// Candidate values of "max nodes per row" for a canvas width
    pub fn search_range(&self, canvas_width: f64) -> RangeInclusive<usize> {
        let cfg = &self.config;
        let pitch = cfg.node_size + cfg.horizontal_gap;
        let fitted = if pitch > 0.0 && canvas_width.is_finite() && canvas_width > 0.0 {
            (cfg.search_width_factor * canvas_width / pitch).floor() as usize
        } else {
            0
        };
        let lower = cfg.min_nodes_per_row.max(1);
        let upper = cfg.min_search_upper.max(fitted).max(lower);
        lower..=upper
    }

    /// Score a candidate size; higher is better
    pub fn score(&self, size: LayoutSize) -> f64 {
        let cfg = &self.config;
        let ratio = size.aspect_ratio();
        let closeness = 1.0 / (1.0 + (ratio - cfg.target_aspect_ratio).abs());
        let shape = if ratio >= cfg.target_aspect_ratio {
            closeness
        } else {
            cfg.tall_penalty * closeness
        };
        let width_bonus = (size.width / cfg.width_bonus_reference).min(cfg.width_bonus_cap);
        shape * width_bonus
    }

    fn choose_packing(&self, groups: &[DepthGroup<'_>], canvas_width: f64) -> Option<PackingChoice> {
        let mut best: Option<PackingChoice> = None;

        for k in self.search_range(canvas_width) {
            let size = self.measure(groups, k);
            let score = self.score(size);
            // strict comparison keeps the smallest k on ties
            if best.is_none_or(|b| score > b.score) {
                best = Some(PackingChoice {
                    max_nodes_per_row: k,
                    size,
                    score,
                });
            }
        }

        best
    }

    fn measure(&self, groups: &[DepthGroup<'_>], max_nodes_per_row: usize) -> LayoutSize {
        let cfg = &self.config;
        let mut height = cfg.top_margin;
        let mut width: f64 = 0.0;

        for (index, group) in groups.iter().enumerate() {
            let mut depth_height: f64 = 0.0;

            for (slot, slice) in group.layers.iter().enumerate() {
                let per_row = slice.nodes_per_row(max_nodes_per_row);
                let rows = slice.row_count(max_nodes_per_row);
                let layer_height = self.block_height(rows);
                let layer_width = self.row_width(per_row);

                depth_height = depth_height.max(slot as f64 * cfg.layer_spacing + layer_height);
                width = width.max(layer_width);
            }

            height += depth_height;
            if index + 1 < groups.len() {
                height += cfg.depth_spacing;
            }
        }

        LayoutSize { width, height }
    }

    fn place(
        &self,
        groups: &[DepthGroup<'_>],
        max_nodes_per_row: usize,
        canvas_width: f64,
    ) -> PositionMap {
        let cfg = &self.config;
        let column_pitch = cfg.node_size + cfg.horizontal_gap;
        let row_pitch = cfg.node_size + cfg.vertical_gap;

        let mut positions = PositionMap::new();
        let mut current_y = cfg.top_margin;

        for group in groups {
            let depth_start = current_y;

            for (slot, slice) in group.layers.iter().enumerate() {
                let count = slice.labels.len();
                let per_row = slice.nodes_per_row(max_nodes_per_row);
                let rows = slice.row_count(max_nodes_per_row);
                let layer_start = depth_start + slot as f64 * cfg.layer_spacing;

                for (index, label) in slice.labels.iter().enumerate() {
                    let row = index / per_row;
                    let column = index % per_row;
                    let in_row = per_row.min(count - row * per_row);

                    let row_span = (in_row - 1) as f64 * column_pitch;
                    let row_start = (canvas_width - row_span) / 2.0;

                    positions.insert(
                        NodeKey::new(slice.layer, *label),
                        Position::new(
                            row_start + column as f64 * column_pitch,
                            layer_start + row as f64 * row_pitch,
                        ),
                    );
                }

                current_y = current_y.max(layer_start + self.block_height(rows));
            }

            current_y += cfg.depth_spacing;
        }

        positions
    }

    fn block_height(&self, rows: usize) -> f64 {
        let cfg = &self.config;
        rows.saturating_sub(1) as f64 * (cfg.node_size + cfg.vertical_gap) + cfg.node_size
    }

    fn row_width(&self, nodes_in_row: usize) -> f64 {
        let cfg = &self.config;
        nodes_in_row.saturating_sub(1) as f64 * (cfg.node_size + cfg.horizontal_gap)
            + cfg.node_size
    }
}

/// Depth of a layer is its index in the graph; empty layers are dropped.
fn group_by_depth(graph: &Graph) -> Vec<DepthGroup<'_>> {
    let mut groups: BTreeMap<usize, Vec<LayerSlice<'_>>> = BTreeMap::new();

    for (index, layer) in graph.layers().iter().enumerate() {
        let labels: Vec<&str> = layer
            .iter()
            .filter(|(_, parsed)| parsed.is_valid())
            .map(|(label, _)| label.as_str())
            .collect();
        if labels.is_empty() {
            continue;
        }
        groups.entry(index).or_default().push(LayerSlice {
            layer: index,
            labels,
        });
    }

    groups
        .into_values()
        .map(|layers| DepthGroup { layers })
        .collect()
}
