//! Forgetting-curve retention model
//!
//! Retention decays exponentially from the last review:
//! `exp(-decay_factor / ease_factor * elapsed)`. Everything here is pure and
//! cheap enough to call once per node per frame.

use serde::Serialize;

use crate::graph::Node;

/// Retention below which a node is due for review
pub const REVIEW_THRESHOLD: f64 = 0.6;

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style `rgb(r,g,b)` string
    pub fn to_css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Retention in `[0, 1]` after `now - time_last` seconds.
///
/// Elapsed time is floored at zero, so a `time_last` in the future reads as
/// fully retained.
pub fn retention(decay_factor: f64, ease_factor: f64, time_last: f64, now: f64) -> f64 {
    let elapsed = (now - time_last).max(0.0);
    let value = (-decay_factor / ease_factor * elapsed).exp();
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Red to green gradient: fully retained is `rgb(0,200,0)`, fully decayed is
/// `rgb(255,0,0)`.
pub fn color(retention: f64) -> Rgb {
    let r = retention.clamp(0.0, 1.0);
    Rgb::new(
        (255.0 * (1.0 - r)).round() as u8,
        (200.0 * r).round() as u8,
        0,
    )
}

/// Whether the node should carry the "due for review" ring
pub fn show_decay_ring(retention: f64) -> bool {
    retention < REVIEW_THRESHOLD
}

/// Same as [`show_decay_ring`] with a configurable threshold
pub fn below_threshold(retention: f64, threshold: f64) -> bool {
    retention < threshold
}

/// Where a node stands relative to its scheduled review
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "seconds", rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Seconds until the next review
    DueIn(f64),
    /// Seconds since the review became due
    Overdue(f64),
}

impl ReviewStatus {
    pub fn describe(&self) -> String {
        match self {
            ReviewStatus::DueIn(secs) => format!("Next review in {}", format_duration(*secs)),
            ReviewStatus::Overdue(secs) => format!("Review overdue by {}", format_duration(*secs)),
        }
    }
}

/// Detail-panel summary of a node at a given instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub retention: f64,
    pub color: Rgb,
    pub review_interval: f64,
    pub decay_factor: f64,
    /// `1 / ease_factor`
    pub difficulty: f64,
    pub review_status: ReviewStatus,
    /// Unix seconds of the most recent review
    pub last_review: f64,
}

impl NodeSummary {
    pub fn new(node: &Node, now: f64) -> Self {
        let retention = node.retention(now);
        let review_status = if node.time_next > now {
            ReviewStatus::DueIn(node.time_next - now)
        } else {
            ReviewStatus::Overdue(now - node.time_next)
        };

        Self {
            retention,
            color: color(retention),
            review_interval: node.review_interval,
            decay_factor: node.decay_factor,
            difficulty: 1.0 / node.ease_factor,
            review_status,
            last_review: node.last_review(),
        }
    }
}

const DURATION_UNITS: [(&str, u64); 6] = [
    ("y", 31_536_000),
    ("mo", 2_592_000),
    ("d", 86_400),
    ("h", 3_600),
    ("m", 60),
    ("s", 1),
];

/// Non-zero units among years, months, days, hours, minutes and seconds,
/// e.g. `"1d 2h 5s"`. Zero or negative durations read `"just now"`.
pub fn format_duration(seconds: f64) -> String {
    let mut remaining = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let parts: Vec<String> = DURATION_UNITS
        .iter()
        .filter_map(|(label, unit)| {
            let value = remaining / unit;
            remaining %= unit;
            (value > 0).then(|| format!("{value}{label}"))
        })
        .collect();

    if parts.is_empty() {
        "just now".to_string()
    } else {
        parts.join(" ")
    }
}

/// Compact elapsed time used on the curve: `"3d 4h"`, `"2h 15m"` or `"7m"`
pub fn format_elapsed(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;

    if hours > 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
