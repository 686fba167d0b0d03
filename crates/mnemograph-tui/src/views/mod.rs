//! TUI view components

pub mod curve;
pub mod detail;
pub mod graph;

pub use curve::CurveView;
pub use detail::DetailView;
pub use graph::GraphView;
