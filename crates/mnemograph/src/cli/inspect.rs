use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;

use crate::cli::{OutputFormat, load_graph};
use crate::config::Config;
use crate::curve::{CurveRender, RetentionCurveRenderer};
use crate::error::{MnemographError, Result};
use crate::graph::NodeKey;
use crate::retention::{NodeSummary, format_duration};
use crate::view::now_unix;

#[derive(Parser)]
pub struct InspectCommand {
    #[clap(help = "Path to a snapshot JSON file")]
    pub snapshot: PathBuf,

    #[clap(long, help = "Layer index (0-3)")]
    pub layer: usize,

    #[clap(long, help = "Node label within the layer")]
    pub label: String,

    #[clap(long, help = "Evaluate at this unix time instead of now")]
    pub now: Option<f64>,
}

impl InspectCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let graph = load_graph(&self.snapshot).await?;
        let key = NodeKey::new(self.layer, self.label.clone());
        let node = graph.node(&key).ok_or_else(|| {
            MnemographError::General(format!("No valid node {key} in {}", self.snapshot.display()))
        })?;

        let now = self.now.unwrap_or_else(now_unix);
        let summary = NodeSummary::new(node, now);
        let renderer = RetentionCurveRenderer::new(config.curve.clone(), &config.retention);
        let samples = renderer.sample(node, now);
        let lowest = samples.iter().map(|s| s.retention).fold(f64::INFINITY, f64::min);
        let has_curve = matches!(renderer.render(node, now), CurveRender::Plot(_));

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "key": key,
                    "now": now,
                    "summary": summary,
                    "history": node.history,
                    "edges": node.next,
                    "curve": {
                        "plotted": has_curve,
                        "segments": node.history.len(),
                        "samples": samples.len(),
                        "lowest_retention": lowest.is_finite().then_some(lowest),
                    },
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let title = config
                    .viewer
                    .mode
                    .layer_titles()
                    .get(key.layer)
                    .copied()
                    .unwrap_or("?");
                println!("{title} \"{}\"", key.label);
                println!("======================\n");

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Field", "Value"]);

                table.add_row([
                    "Retention".to_string(),
                    format!("{:.1}% ({})", summary.retention * 100.0, summary.color.to_css()),
                ]);
                table.add_row([
                    "Review interval".to_string(),
                    format_duration(summary.review_interval),
                ]);
                table.add_row([
                    "Decay factor".to_string(),
                    format!("{:.6} /s", summary.decay_factor),
                ]);
                table.add_row([
                    "Difficulty".to_string(),
                    format!("{:.2}x", summary.difficulty),
                ]);
                table.add_row(["Status".to_string(), summary.review_status.describe()]);
                table.add_row([
                    "Last review".to_string(),
                    format!("{} ago", format_duration(now - summary.last_review)),
                ]);
                table.add_row(["Edges".to_string(), node.next.len().to_string()]);

                println!("{table}\n");

                if has_curve {
                    println!(
                        "Curve: {} segments, {} samples, lowest {:.1}%",
                        node.history.len(),
                        samples.len(),
                        lowest * 100.0
                    );
                } else {
                    println!("Curve: no review history");
                }
            }
        }

        Ok(())
    }
}
