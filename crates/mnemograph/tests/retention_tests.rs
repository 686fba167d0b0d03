//! Integration tests for the retention model
//!
//! Tests verify that:
//! - Retention stays in [0, 1] and never increases with time
//! - Color and review ring follow retention
//! - Node summaries report review status from snapshot data

use mnemograph::graph::NodeKey;
use mnemograph::retention::{
    self, NodeSummary, REVIEW_THRESHOLD, ReviewStatus, Rgb, format_duration,
};
use mnemograph::snapshot::parse_snapshot;
use mnemograph::testing::{NodeBuilder, sample_snapshot};

const NOW: f64 = 1_700_000_000.0;

// ===== Retention Curve =====

#[test]
fn test_retention_is_monotonic_in_time() {
    let mut previous = 1.0;
    for step in 0..200 {
        let now = step as f64 * 600.0;
        let r = retention::retention(0.0005, 2.5, 0.0, now);
        assert!(r <= previous, "retention rose at t={now}");
        previous = r;
    }
}

#[test]
fn test_retention_bounds_for_extreme_parameters() {
    let cases = [
        (1e9, 1e-9, 0.0, 1e12),
        (1e-12, 1e12, 0.0, 1.0),
        (0.5, 0.1, 100.0, 0.0),
        (f64::MAX, f64::MIN_POSITIVE, 0.0, f64::MAX),
    ];
    for (d, e, tl, now) in cases {
        let r = retention::retention(d, e, tl, now);
        assert!((0.0..=1.0).contains(&r), "{r} out of range for {d} {e} {tl} {now}");
    }
}

#[test]
fn test_higher_ease_decays_slower() {
    let hard = retention::retention(0.001, 1.3, 0.0, 3_600.0);
    let easy = retention::retention(0.001, 2.8, 0.0, 3_600.0);
    assert!(easy > hard);
}

// ===== Color and Ring =====

#[test]
fn test_color_tracks_decay() {
    let fresh = retention::color(retention::retention(0.01, 2.5, NOW, NOW));
    assert_eq!(fresh, Rgb::new(0, 200, 0));

    let faded = retention::color(retention::retention(0.01, 2.5, 0.0, NOW));
    assert_eq!(faded, Rgb::new(255, 0, 0));
}

#[test]
fn test_ring_appears_once_below_threshold() {
    // exp(-0.01 / 1 * t) = 0.6 at t = ln(1/0.6) / 0.01
    let crossing = (1.0f64 / REVIEW_THRESHOLD).ln() / 0.01;
    let before = retention::retention(0.01, 1.0, 0.0, crossing - 1.0);
    let after = retention::retention(0.01, 1.0, 0.0, crossing + 1.0);

    assert!(!retention::show_decay_ring(before));
    assert!(retention::show_decay_ring(after));
}

// ===== Node Summary =====

#[test]
fn test_summary_from_sample_snapshot() {
    let graph = parse_snapshot(&sample_snapshot(NOW)).unwrap();

    let cats = graph.node(&NodeKey::new(1, "cats")).unwrap();
    let summary = NodeSummary::new(cats, NOW);
    assert_eq!(summary.review_status, ReviewStatus::Overdue(3_600.0));
    assert_eq!(summary.review_status.describe(), "Review overdue by 1h");
    assert_eq!(summary.last_review, NOW - 86_400.0);
    assert!((summary.difficulty - 1.0 / 1.3).abs() < 1e-12);

    let the = graph.node(&NodeKey::new(1, "the")).unwrap();
    let summary = NodeSummary::new(the, NOW);
    assert_eq!(summary.review_status, ReviewStatus::DueIn(3.0 * 86_400.0));
    assert_eq!(format_duration(summary.review_interval), "4d");
}

#[test]
fn test_summary_is_due_exactly_at_time_next() {
    let node = NodeBuilder::new(0.01, 2.5, 100.0).time_next(200.0).build();
    let summary = NodeSummary::new(&node, 200.0);
    assert_eq!(summary.review_status, ReviewStatus::Overdue(0.0));
    assert_eq!(summary.review_status.describe(), "Review overdue by just now");
}

#[test]
fn test_summary_serializes_status_tag() {
    let node = NodeBuilder::new(0.01, 2.5, 100.0).time_next(160.0).build();
    let json = serde_json::to_value(NodeSummary::new(&node, 100.0)).unwrap();
    assert_eq!(json["review_status"]["status"], "due_in");
    assert_eq!(json["review_status"]["seconds"], 60.0);
}
