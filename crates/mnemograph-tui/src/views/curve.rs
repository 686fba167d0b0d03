//! Retention curve view

use mnemograph::curve::{CurvePlot, CurveRender, PlotPoint, Shape, StrokeStyle, TextAlign};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
    },
};

use super::graph::rgb;

pub struct CurveView;

impl CurveView {
    pub fn render(frame: &mut Frame, area: Rect, curve: Option<&CurveRender>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Retention Curve ");

        match curve {
            Some(CurveRender::Plot(plot)) => Self::render_plot(frame, area, block, plot),
            Some(CurveRender::Placeholder) => {
                let paragraph = Paragraph::new("No review history yet").block(block);
                frame.render_widget(paragraph, area);
            }
            None => {
                let paragraph = Paragraph::new("Click a node to plot its curve").block(block);
                frame.render_widget(paragraph, area);
            }
        }
    }

    fn render_plot(frame: &mut Frame, area: Rect, block: Block<'_>, plot: &CurvePlot) {
        let inner = block.inner(area);
        let (w, h) = (plot.width, plot.height);
        // canvas units covered by one terminal column
        let char_width = if inner.width > 0 {
            w / inner.width as f64
        } else {
            w
        };

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .background_color(rgb(plot.background))
            .x_bounds([0.0, w])
            .y_bounds([0.0, h])
            .paint(|ctx| {
                for shape in &plot.shapes {
                    draw_shape(ctx, shape, h, char_width);
                }
            });

        frame.render_widget(canvas, area);
    }
}

fn draw_shape(ctx: &mut Context<'_>, shape: &Shape, height: f64, char_width: f64) {
    let flip = |p: PlotPoint| (p.x, height - p.y);

    match shape {
        Shape::Line {
            from,
            to,
            color,
            style,
            ..
        } => {
            let color = rgb(*color);
            match style {
                StrokeStyle::Solid => {
                    let (x1, y1) = flip(*from);
                    let (x2, y2) = flip(*to);
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
                }
                StrokeStyle::Dashed { dash, gap } => {
                    for (a, b) in dashes(*from, *to, *dash, *gap) {
                        let (x1, y1) = flip(a);
                        let (x2, y2) = flip(b);
                        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
                    }
                }
            }
        }
        Shape::Polyline { points, color, .. } => {
            let color = rgb(*color);
            for pair in points.windows(2) {
                let (x1, y1) = flip(pair[0]);
                let (x2, y2) = flip(pair[1]);
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
            }
        }
        Shape::Circle {
            center,
            radius,
            color,
        } => {
            let (x, y) = flip(*center);
            ctx.draw(&Circle {
                x,
                y,
                radius: *radius,
                color: rgb(*color),
            });
        }
        Shape::Text {
            at,
            text,
            color,
            align,
            ..
        } => {
            let span = text.chars().count() as f64 * char_width;
            let x = match align {
                TextAlign::Left => at.x,
                TextAlign::Center => at.x - span / 2.0,
                TextAlign::Right => at.x - span,
            };
            let (_, y) = flip(*at);
            ctx.print(
                x.max(0.0),
                y,
                Line::styled(text.clone(), Style::default().fg(rgb(*color))),
            );
        }
    }
}

/// Split a segment into dash pieces
fn dashes(from: PlotPoint, to: PlotPoint, dash: f64, gap: f64) -> Vec<(PlotPoint, PlotPoint)> {
    let length = (to.x - from.x).hypot(to.y - from.y);
    let period = dash + gap;
    if length == 0.0 || !(period > 0.0) {
        return vec![(from, to)];
    }

    let at = |t: f64| PlotPoint::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
    let mut pieces = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        pieces.push((at(start / length), at(end / length)));
        start += period;
    }
    pieces
}
