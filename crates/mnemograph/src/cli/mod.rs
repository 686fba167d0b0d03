//! Subcommands of the `mnemograph` binary

pub mod inspect;
pub mod layout;
pub mod validate;

pub use inspect::InspectCommand;
pub use layout::LayoutCommand;
pub use validate::ValidateCommand;

use std::path::Path;

use crate::error::Result;
use crate::graph::Graph;
use crate::snapshot;
use crate::source::{FileSnapshotSource, SnapshotSource};

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Read and validate a snapshot file
pub async fn load_graph(path: &Path) -> Result<Graph> {
    let source = FileSnapshotSource::new(path);
    let payload = source.fetch().await?;
    snapshot::parse_snapshot(&payload)
}

pub fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
