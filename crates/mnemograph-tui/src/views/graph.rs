//! Graph canvas view
//!
//! Draws a [`Scene`] onto a braille canvas whose units are the same
//! pseudo-pixels the viewport works in. Screen y grows downward while canvas y
//! grows upward, so every point is flipped against the canvas height.

use mnemograph::retention::Rgb;
use mnemograph::scene::Scene;
use mnemograph::viewport::ScreenPoint;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
    },
};

use crate::app::{CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// Scale below which node labels are hidden
const LABEL_MIN_SCALE: f64 = 0.5;
const EDGE_COLOR: Color = Color::Rgb(0x94, 0xa3, 0xb8);
const GRID_COLOR: Color = Color::Rgb(0x33, 0x41, 0x55);
const RING_COLOR: Color = Color::Rgb(0xef, 0x44, 0x44);
const SELECTED_COLOR: Color = Color::Rgb(0x3b, 0x82, 0xf6);

pub fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

pub struct GraphView<'a> {
    pub scene: &'a Scene,
    pub layer_titles: [&'static str; 4],
    pub node_size: f64,
    pub selected: Option<&'a mnemograph::graph::NodeKey>,
}

impl GraphView<'_> {
    /// Block framing the canvas; its inner area is the pointer surface
    pub fn block(layer_titles: &[&str], zoom_percent: i64) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", layer_titles.join(" › ")))
            .title_bottom(format!(" {zoom_percent}% "))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Self::block(&self.layer_titles, self.scene.transform.zoom_percent());
        let inner = block.inner(area);
        let width = inner.width as f64 * CELL_WIDTH_PX;
        let height = inner.height as f64 * CELL_HEIGHT_PX;
        let flip = |p: ScreenPoint| (p.x, height - p.y);

        let scene = self.scene;
        let transform = scene.transform;
        let grid = grid_points(scene, width, height);
        let radius = self.node_size / 2.0 * transform.scale;

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &grid,
                    color: GRID_COLOR,
                });
                ctx.layer();

                for edge in &scene.edges {
                    let (x1, y1) = flip(transform.to_screen(edge.start));
                    let (x2, y2) = flip(transform.to_screen(edge.end));
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, EDGE_COLOR));
                }
                ctx.layer();

                for sprite in &scene.nodes {
                    let (x, y) = flip(transform.to_screen(sprite.center));
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius,
                        color: rgb(sprite.color),
                    });
                    if sprite.decay_ring {
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: radius + 4.0,
                            color: RING_COLOR,
                        });
                    }
                    if self.selected == Some(&sprite.key) {
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: radius + 8.0,
                            color: SELECTED_COLOR,
                        });
                    }
                }

                if transform.scale >= LABEL_MIN_SCALE {
                    for sprite in &scene.nodes {
                        let (x, y) = flip(transform.to_screen(sprite.center));
                        let label = &sprite.key.label;
                        let offset = label.chars().count() as f64 * CELL_WIDTH_PX / 2.0;
                        ctx.print(
                            x - offset,
                            y,
                            Line::styled(label.clone(), Style::default().fg(rgb(sprite.color))),
                        );
                    }
                }
            });

        frame.render_widget(canvas, area);
    }
}

/// Grid intersections visible on the canvas, already flipped
fn grid_points(scene: &Scene, width: f64, height: f64) -> Vec<(f64, f64)> {
    let spacing = scene.grid.spacing;
    if !(spacing.is_finite() && spacing >= CELL_WIDTH_PX) {
        return Vec::new();
    }

    let start_x = scene.grid.offset_x.rem_euclid(spacing);
    let start_y = scene.grid.offset_y.rem_euclid(spacing);
    let mut points = Vec::new();

    let mut x = start_x;
    while x <= width {
        let mut y = start_y;
        while y <= height {
            points.push((x, height - y));
            y += spacing;
        }
        x += spacing;
    }
    points
}
