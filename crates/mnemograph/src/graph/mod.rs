//! Graph snapshot model and validation
//!
//! Raw snapshots are validated once into typed layers; layout, scene and
//! curve code only ever see the typed form.

pub mod types;
pub mod validate;

pub use types::{
    Edge, Graph, GraphMode, HistoryEntry, InvalidNode, LAYER_COUNT, Layer, LayerStats, Node,
    NodeKey, ParsedNode,
};
pub use validate::{parse_edge, parse_graph, parse_history, parse_node};
