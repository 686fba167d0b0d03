//! Detail view for the selected node

use chrono::{DateTime, Local, Utc};
use mnemograph::retention::{NodeSummary, format_duration};
use mnemograph::view::Selection;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::graph::rgb;

pub struct DetailView;

impl DetailView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selection: Option<&Selection>,
        summary: Option<&NodeSummary>,
        layer_titles: &[&str],
        now: f64,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Node Details (Esc to close) ");

        let (Some(selection), Some(summary)) = (selection, summary) else {
            frame.render_widget(Paragraph::new("No node selected").block(block), area);
            return;
        };

        let layer = layer_titles
            .get(selection.key.layer)
            .copied()
            .unwrap_or("Layer");

        let mut lines = vec![
            Line::from(vec![
                Span::raw(format!("{layer}: ")),
                Span::raw(selection.key.label.clone()).bold(),
            ]),
            Line::default(),
            Line::from(vec![
                Span::raw("Retention: "),
                Span::styled(
                    format!("{:.1}%", summary.retention * 100.0),
                    Style::default().fg(rgb(summary.color)),
                ),
            ]),
            Line::from(format!(
                "Review interval: {}",
                format_duration(summary.review_interval)
            )),
            Line::from(format!("Decay factor: {:.6} /s", summary.decay_factor)),
            Line::from(format!("Difficulty: {:.2}x", summary.difficulty)),
            Line::from(summary.review_status.describe()),
            Line::from(last_review_line(summary.last_review, now)),
        ];

        if !selection.in_graph {
            lines.push(Line::default());
            lines.push(Line::styled(
                "No longer in the latest snapshot",
                Style::default().fg(Color::Yellow),
            ));
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

/// Absolute local time of the last review followed by the time since
fn last_review_line(last_review: f64, now: f64) -> String {
    let ago = format_duration(now - last_review);
    match DateTime::<Utc>::from_timestamp(last_review as i64, 0) {
        Some(at) => format!(
            "Last review: {} ({ago} ago)",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => format!("Last review: {ago} ago"),
    }
}
