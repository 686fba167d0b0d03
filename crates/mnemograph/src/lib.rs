//! Mnemograph - layout, viewport and forgetting-curve engine for layered
//! memory-retention graphs
//!
//! A snapshot of up to four layers of memory items is validated into a
//! [`graph::Graph`], laid out by a row-packing [`layout::LayoutEngine`], colored
//! by the exponential [`retention`] model and viewed through a pan/zoom
//! [`viewport::Viewport`]. [`view::GraphView`] ties these together behind a
//! single event-driven owner.

pub mod cli;
pub mod config;
pub mod curve;
pub mod error;
pub mod graph;
pub mod layout;
pub mod retention;
pub mod scene;
pub mod scheduler;
pub mod snapshot;
pub mod source;
pub mod testing;
pub mod view;
pub mod viewport;

pub use error::MnemographError;
