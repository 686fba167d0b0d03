//! Retention curve renderer
//!
//! Produces a display list for one node's forgetting curve across its review
//! history. Each history entry opens a segment that decays with the
//! `ease_factor`/`time_last` recorded at that review; the last segment runs to
//! "now". Plot coordinates have their origin at the top-left corner.

use serde::Serialize;

use crate::config::{CurveConfig, RetentionConfig};
use crate::graph::Node;
use crate::retention::{self, Rgb};

const BACKGROUND: Rgb = Rgb::new(0xf8, 0xfa, 0xfc);
const GRID: Rgb = Rgb::new(0xe2, 0xe8, 0xf0);
const AXIS_TEXT: Rgb = Rgb::new(0x6b, 0x72, 0x80);
const THRESHOLD: Rgb = Rgb::new(0xf4, 0x3f, 0x5e);
const CURVE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
const MARKER: Rgb = Rgb::new(0xef, 0x44, 0x44);
const MARKER_TEXT: Rgb = Rgb::new(0x1f, 0x29, 0x37);
const TITLE_TEXT: Rgb = Rgb::new(0x37, 0x41, 0x51);

const GRID_DIVISIONS: usize = 10;
const MARKER_RADIUS: f64 = 6.0;

/// A point in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StrokeStyle {
    Solid,
    Dashed { dash: f64, gap: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Line {
        from: PlotPoint,
        to: PlotPoint,
        color: Rgb,
        width: f64,
        style: StrokeStyle,
    },
    Polyline {
        points: Vec<PlotPoint>,
        color: Rgb,
        width: f64,
    },
    Circle {
        center: PlotPoint,
        radius: f64,
        color: Rgb,
    },
    Text {
        at: PlotPoint,
        text: String,
        color: Rgb,
        size: f64,
        align: TextAlign,
        /// Rotated a quarter turn counter-clockwise
        vertical: bool,
    },
}

/// One sampled point of the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSample {
    pub time: f64,
    pub retention: f64,
}

/// A fully laid out retention plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePlot {
    pub width: f64,
    pub height: f64,
    pub background: Rgb,
    pub shapes: Vec<Shape>,
    pub samples: Vec<CurveSample>,
    pub current_retention: f64,
}

impl CurvePlot {
    pub fn curve_points(&self) -> Option<&[PlotPoint]> {
        self.shapes.iter().find_map(|shape| match shape {
            Shape::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Output of one render pass
#[derive(Debug, Clone, PartialEq)]
pub enum CurveRender {
    /// The node has no review history to plot
    Placeholder,
    Plot(CurvePlot),
}

impl CurveRender {
    pub fn plot(&self) -> Option<&CurvePlot> {
        match self {
            CurveRender::Plot(plot) => Some(plot),
            CurveRender::Placeholder => None,
        }
    }
}

/// Renders the forgetting curve of a single node
#[derive(Debug, Clone)]
pub struct RetentionCurveRenderer {
    config: CurveConfig,
    review_threshold: f64,
}

impl Default for RetentionCurveRenderer {
    fn default() -> Self {
        Self::new(CurveConfig::default(), &RetentionConfig::default())
    }
}

impl RetentionCurveRenderer {
    pub fn new(config: CurveConfig, retention: &RetentionConfig) -> Self {
        Self {
            config,
            review_threshold: retention.review_threshold,
        }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Render the plot for `node` at time `now`
    pub fn render(&self, node: &Node, now: f64) -> CurveRender {
        if node.history.is_empty() {
            return CurveRender::Placeholder;
        }

        let width = self.config.width;
        let height = self.config.height;
        let samples = self.sample(node, now);
        let current_retention = node.retention(now);

        let mut shapes = Vec::new();
        self.draw_grid(&mut shapes);
        self.draw_curve(&mut shapes, &samples, now);
        self.draw_current_point(&mut shapes, current_retention);
        self.draw_labels(&mut shapes, node, now, current_retention);

        CurveRender::Plot(CurvePlot {
            width,
            height,
            background: BACKGROUND,
            shapes,
            samples,
            current_retention,
        })
    }

    /// Sample the piecewise curve: `samples_per_segment + 1` points per
    /// segment, segments bounded by consecutive history timestamps and `now`.
    pub fn sample(&self, node: &Node, now: f64) -> Vec<CurveSample> {
        let steps = self.config.samples_per_segment.max(1);
        let mut bounds: Vec<f64> = node.history.iter().map(|entry| entry.timestamp).collect();
        bounds.push(now);

        let mut samples = Vec::with_capacity(node.history.len() * (steps + 1));
        for (entry, window) in node.history.iter().zip(bounds.windows(2)) {
            let (start, end) = (window[0], window[1]);
            let ease = entry.ease_factor.unwrap_or(self.config.default_ease);
            let time_last = entry.time_last.unwrap_or(start);

            for step in 0..=steps {
                let time = start + (step as f64 / steps as f64) * (end - start);
                samples.push(CurveSample {
                    time,
                    retention: retention::retention(node.decay_factor, ease, time_last, time),
                });
            }
        }

        samples
    }

    /// Vertical plot coordinate of a retention value; 100% sits at 10% of the
    /// height, 0% at 90%.
    pub fn retention_to_y(&self, retention: f64) -> f64 {
        let h = self.config.height;
        h - retention * h * 0.8 - h * 0.1
    }

    fn time_to_x(&self, time: f64, start: f64, now: f64) -> f64 {
        let span = now - start;
        if span <= 0.0 {
            return self.config.width;
        }
        (time - start) / span * self.config.width
    }

    fn draw_grid(&self, shapes: &mut Vec<Shape>) {
        let (w, h) = (self.config.width, self.config.height);

        for i in 0..=GRID_DIVISIONS {
            let x = w * i as f64 / GRID_DIVISIONS as f64;
            shapes.push(solid_line(PlotPoint::new(x, 0.0), PlotPoint::new(x, h), GRID, 1.0));
        }
        for i in 0..=GRID_DIVISIONS {
            let y = h * i as f64 / GRID_DIVISIONS as f64;
            shapes.push(solid_line(PlotPoint::new(0.0, y), PlotPoint::new(w, y), GRID, 1.0));
        }

        let threshold_y = self.retention_to_y(self.review_threshold);
        let label_x = w - 5.0;
        shapes.push(text(
            PlotPoint::new(label_x, self.retention_to_y(1.0) + 4.0),
            "100%",
            AXIS_TEXT,
            12.0,
            TextAlign::Right,
        ));
        shapes.push(text(
            PlotPoint::new(label_x, threshold_y - 5.0),
            format!("Review line {:.0}%", self.review_threshold * 100.0),
            AXIS_TEXT,
            12.0,
            TextAlign::Right,
        ));
        shapes.push(text(
            PlotPoint::new(label_x, self.retention_to_y(0.0) + 4.0),
            "0%",
            AXIS_TEXT,
            12.0,
            TextAlign::Right,
        ));

        shapes.push(solid_line(
            PlotPoint::new(0.0, threshold_y),
            PlotPoint::new(w, threshold_y),
            THRESHOLD,
            1.5,
        ));
    }

    fn draw_curve(&self, shapes: &mut Vec<Shape>, samples: &[CurveSample], now: f64) {
        let Some(first) = samples.first() else {
            return;
        };
        let start = first.time;

        let points = samples
            .iter()
            .map(|s| PlotPoint::new(self.time_to_x(s.time, start, now), self.retention_to_y(s.retention)))
            .collect();
        shapes.push(Shape::Polyline {
            points,
            color: CURVE,
            width: 3.0,
        });

        let now_x = self.time_to_x(now, start, now);
        shapes.push(Shape::Line {
            from: PlotPoint::new(now_x, 0.0),
            to: PlotPoint::new(now_x, self.config.height),
            color: MARKER,
            width: 3.0,
            style: StrokeStyle::Dashed { dash: 5.0, gap: 5.0 },
        });
    }

    fn draw_current_point(&self, shapes: &mut Vec<Shape>, current: f64) {
        let x = self.config.width;
        let y = self.retention_to_y(current);

        shapes.push(Shape::Circle {
            center: PlotPoint::new(x, y),
            radius: MARKER_RADIUS,
            color: MARKER,
        });
        shapes.push(text(
            PlotPoint::new(x - 10.0, y - 20.0),
            "Current retention",
            MARKER_TEXT,
            12.0,
            TextAlign::Right,
        ));
        shapes.push(text(
            PlotPoint::new(x - 10.0, y - 6.0),
            format!("{:.1}%", current * 100.0),
            MARKER_TEXT,
            12.0,
            TextAlign::Right,
        ));
        shapes.push(Shape::Line {
            from: PlotPoint::new(0.0, y),
            to: PlotPoint::new(self.config.width, y),
            color: MARKER,
            width: 1.0,
            style: StrokeStyle::Dashed { dash: 4.0, gap: 4.0 },
        });
    }

    fn draw_labels(&self, shapes: &mut Vec<Shape>, node: &Node, now: f64, current: f64) {
        let (w, h) = (self.config.width, self.config.height);

        shapes.push(Shape::Text {
            at: PlotPoint::new(15.0, h / 2.0),
            text: "Retention (%)".to_string(),
            color: TITLE_TEXT,
            size: 14.0,
            align: TextAlign::Center,
            vertical: true,
        });
        shapes.push(text(
            PlotPoint::new(w / 2.0, h - 5.0),
            "Time",
            TITLE_TEXT,
            14.0,
            TextAlign::Center,
        ));
        shapes.push(text(
            PlotPoint::new(w - 5.0, h - 5.0),
            "Now",
            TITLE_TEXT,
            14.0,
            TextAlign::Right,
        ));

        let info = [
            format!("Decay factor: {:.3}", node.decay_factor),
            format!("Ease factor: {:.2}", node.ease_factor),
            format!("Current retention: {:.1}%", current * 100.0),
            format!(
                "Since last review: {}",
                retention::format_elapsed(now - node.time_last)
            ),
        ];
        for (index, line) in info.into_iter().enumerate() {
            shapes.push(text(
                PlotPoint::new(10.0, 20.0 + index as f64 * 16.0),
                line,
                AXIS_TEXT,
                12.0,
                TextAlign::Left,
            ));
        }
    }
}

fn solid_line(from: PlotPoint, to: PlotPoint, color: Rgb, width: f64) -> Shape {
    Shape::Line {
        from,
        to,
        color,
        width,
        style: StrokeStyle::Solid,
    }
}

fn text(at: PlotPoint, text: impl Into<String>, color: Rgb, size: f64, align: TextAlign) -> Shape {
    Shape::Text {
        at,
        text: text.into(),
        color,
        size,
        align,
        vertical: false,
    }
}
