use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{OutputFormat, load_graph, truncate_label};
use crate::config::Config;
use crate::error::Result;
use crate::graph::{Graph, LayerStats, ParsedNode};

#[derive(Parser)]
pub struct ValidateCommand {
    #[clap(help = "Path to a snapshot JSON file")]
    pub snapshot: PathBuf,
}

/// A node that failed validation
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub layer: usize,
    pub label: String,
    pub reason: String,
}

/// Outcome of validating one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub layers: Vec<LayerStats>,
    pub rejected: Vec<Rejection>,
    /// Well-formed edges whose target is not a valid node
    pub unresolved_edges: usize,
}

impl ValidationReport {
    pub fn from_graph(graph: &Graph) -> Self {
        let rejected = graph
            .layers()
            .iter()
            .enumerate()
            .flat_map(|(layer, entries)| {
                entries.iter().filter_map(move |(label, parsed)| match parsed {
                    ParsedNode::Invalid(invalid) => Some(Rejection {
                        layer,
                        label: label.clone(),
                        reason: invalid.reason.clone(),
                    }),
                    ParsedNode::Valid(_) => None,
                })
            })
            .collect();

        let unresolved_edges = graph
            .valid_nodes()
            .flat_map(|(_, node)| node.next.iter())
            .filter(|edge| graph.node(&edge.target).is_none())
            .count();

        Self {
            layers: graph.layer_stats(),
            rejected,
            unresolved_edges,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
            && self.unresolved_edges == 0
            && self.layers.iter().all(|l| l.skipped_edges == 0)
    }
}

impl ValidateCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let graph = load_graph(&self.snapshot).await?;
        let report = ValidationReport::from_graph(&graph);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "snapshot": self.snapshot,
                    "clean": report.is_clean(),
                    "report": report,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let titles = config.viewer.mode.layer_titles();
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Layer", "Valid", "Invalid", "Edges", "Skipped Edges"]);

                for stats in &report.layers {
                    table.add_row([
                        format!("{} {}", stats.layer, titles[stats.layer]),
                        stats.valid_nodes.to_string(),
                        stats.invalid_nodes.to_string(),
                        stats.edges.to_string(),
                        stats.skipped_edges.to_string(),
                    ]);
                }

                println!("{table}\n");

                for rejection in &report.rejected {
                    println!(
                        "  {}-{}: {}",
                        rejection.layer,
                        truncate_label(&rejection.label, 40),
                        rejection.reason
                    );
                }
                if report.unresolved_edges > 0 {
                    println!("  {} edges point at missing nodes", report.unresolved_edges);
                }

                if report.is_clean() {
                    println!("Snapshot is clean");
                } else {
                    println!("Snapshot has problems (renderable parts will still display)");
                }
            }
        }

        Ok(())
    }
}
