use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;

use crate::cli::{OutputFormat, load_graph, truncate_label};
use crate::config::Config;
use crate::error::Result;
use crate::layout::LayoutEngine;
use crate::view::{CanvasSize, now_unix};

#[derive(Parser)]
pub struct LayoutCommand {
    #[clap(help = "Path to a snapshot JSON file")]
    pub snapshot: PathBuf,

    #[clap(long, help = "Canvas width (defaults to viewer.default_width)")]
    pub width: Option<f64>,

    #[clap(long, help = "Canvas height (defaults to viewer.default_height)")]
    pub height: Option<f64>,

    #[clap(long, help = "Evaluate retention at this unix time instead of now")]
    pub now: Option<f64>,
}

impl LayoutCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let graph = load_graph(&self.snapshot).await?;
        let canvas = CanvasSize::new(
            self.width.unwrap_or(config.viewer.default_width),
            self.height.unwrap_or(config.viewer.default_height),
        )
        .or(CanvasSize::new(
            config.viewer.default_width,
            config.viewer.default_height,
        ));
        let now = self.now.unwrap_or_else(now_unix);

        let engine = LayoutEngine::new(config.layout.clone());
        let layout = engine.layout(&graph, canvas.width, canvas.height);

        match format {
            OutputFormat::Json => {
                let nodes: Vec<_> = layout
                    .positions
                    .iter()
                    .map(|(key, pos)| {
                        let retention = graph.node(key).map(|n| n.retention(now));
                        serde_json::json!({
                            "layer": key.layer,
                            "label": key.label,
                            "x": pos.x,
                            "y": pos.y,
                            "retention": retention,
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "canvas": { "width": canvas.width, "height": canvas.height },
                    "packing": layout.packing,
                    "nodes": nodes,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let titles = config.viewer.mode.layer_titles();
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Layer", "Label", "X", "Y", "Retention"]);

                for (key, pos) in &layout.positions {
                    let retention = graph
                        .node(key)
                        .map(|n| format!("{:.1}%", n.retention(now) * 100.0))
                        .unwrap_or_default();
                    table.add_row([
                        titles.get(key.layer).copied().unwrap_or("?").to_string(),
                        truncate_label(&key.label, 32),
                        format!("{:.1}", pos.x),
                        format!("{:.1}", pos.y),
                        retention,
                    ]);
                }

                println!("{table}\n");

                match layout.packing {
                    Some(packing) => println!(
                        "{} nodes, max {} per row, bounds {:.0} x {:.0} (score {:.3})",
                        layout.positions.len(),
                        packing.max_nodes_per_row,
                        packing.size.width,
                        packing.size.height,
                        packing.score
                    ),
                    None => println!("Graph has no valid nodes"),
                }
            }
        }

        Ok(())
    }
}
