//! Integration tests for the graph view event handling
//!
//! Tests verify that:
//! - Snapshots are applied in request order and malformed ones are dropped
//! - Pointer input selects nodes or pans the canvas
//! - Selection survives snapshot refreshes
//! - Ticks, resizes and zoom controls update the frame

use serde_json::{Value, json};

use mnemograph::config::Config;
use mnemograph::curve::CurveRender;
use mnemograph::graph::NodeKey;
use mnemograph::retention::ReviewStatus;
use mnemograph::scheduler::TickKind;
use mnemograph::testing::{layer_json, node_json, sample_snapshot, snapshot_json};
use mnemograph::view::{CanvasSize, GraphView, ViewEvent, ViewOutcome};
use mnemograph::viewport::{PointerEvent, ScreenPoint, Transform};

const NOW: f64 = 1_700_000_000.0;

// ===== Test Fixtures and Helpers =====

fn view_with(payload: Value) -> GraphView {
    let mut view = GraphView::new(&Config::default(), NOW);
    let outcome = view.handle(ViewEvent::SnapshotArrived {
        request: None,
        payload,
    });
    assert_eq!(outcome, ViewOutcome::Redraw);
    view
}

fn screen_of(view: &GraphView, key: &NodeKey) -> ScreenPoint {
    view.transform().to_screen(view.layout().positions[key])
}

fn click(view: &mut GraphView, at: ScreenPoint) -> ViewOutcome {
    let outcome = view.handle(ViewEvent::Pointer(PointerEvent::Down { at, on_node: false }));
    view.handle(ViewEvent::Pointer(PointerEvent::Up));
    outcome
}

// ===== Snapshots =====

#[test]
fn test_snapshot_populates_scene() {
    let view = view_with(sample_snapshot(NOW));
    let scene = view.scene();

    assert_eq!(scene.nodes.len(), 9);
    assert_eq!(scene.edges.len(), 5);
    assert!(scene.nodes.iter().all(|n| n.retention > 0.0 && n.retention <= 1.0));
}

#[test]
fn test_stale_fetch_is_discarded() {
    let mut view = GraphView::new(&Config::default(), NOW);
    let ViewOutcome::FetchRequested(old) = view.handle(ViewEvent::Tick(TickKind::Poll, NOW)) else {
        panic!("poll tick should request a fetch");
    };
    let ViewOutcome::FetchRequested(new) = view.handle(ViewEvent::Tick(TickKind::Poll, NOW)) else {
        panic!("poll tick should request a fetch");
    };
    assert!(new > old);

    let applied = view.handle(ViewEvent::SnapshotArrived {
        request: Some(new),
        payload: sample_snapshot(NOW),
    });
    assert_eq!(applied, ViewOutcome::Redraw);

    let late = view.handle(ViewEvent::SnapshotArrived {
        request: Some(old),
        payload: snapshot_json(vec![]),
    });
    assert!(matches!(late, ViewOutcome::Discarded(_)));
    assert_eq!(view.graph().node_count(), 9);
    assert_eq!(view.last_applied(), Some(new));
}

#[test]
fn test_push_supersedes_in_flight_fetch() {
    let mut view = GraphView::new(&Config::default(), NOW);
    let pending = view.begin_fetch();

    view.handle(ViewEvent::SnapshotArrived {
        request: None,
        payload: sample_snapshot(NOW),
    });
    let outcome = view.handle(ViewEvent::SnapshotArrived {
        request: Some(pending),
        payload: snapshot_json(vec![]),
    });

    assert!(matches!(outcome, ViewOutcome::Discarded(_)));
    assert_eq!(view.graph().node_count(), 9);
}

#[test]
fn test_malformed_snapshot_keeps_previous_graph() {
    let mut view = view_with(sample_snapshot(NOW));
    let before = view.layout().clone();

    let outcome = view.handle(ViewEvent::SnapshotArrived {
        request: None,
        payload: json!({"unexpected": true}),
    });

    assert!(matches!(outcome, ViewOutcome::Discarded(_)));
    assert_eq!(view.graph().node_count(), 9);
    assert_eq!(view.layout(), &before);
}

#[test]
fn test_edge_to_missing_label_is_omitted() {
    let mut cat = node_json(0.01, 2.5, NOW);
    cat["next"] = json!([[["ghost", 1], 1.0], [["dog", 1], 0.5]]);
    let with_dangling = snapshot_json(vec![
        layer_json(&[("cat", cat)]),
        layer_json(&[("dog", node_json(0.01, 2.5, NOW))]),
    ]);

    let mut plain_cat = node_json(0.01, 2.5, NOW);
    plain_cat["next"] = json!([[["dog", 1], 0.5]]);
    let without = snapshot_json(vec![
        layer_json(&[("cat", plain_cat)]),
        layer_json(&[("dog", node_json(0.01, 2.5, NOW))]),
    ]);

    let view = view_with(with_dangling);
    let scene = view.scene();
    assert_eq!(scene.edges.len(), 1);
    assert_eq!(scene.edges[0].to, NodeKey::new(1, "dog"));
    assert_eq!(scene.nodes.len(), 2);

    let reference = view_with(without);
    assert_eq!(view.layout().positions, reference.layout().positions);
}

// ===== Pointer Input =====

#[test]
fn test_click_on_node_selects_it() {
    let mut view = view_with(sample_snapshot(NOW));
    let key = NodeKey::new(1, "cats");
    let at = screen_of(&view, &key);

    let outcome = view.handle(ViewEvent::Pointer(PointerEvent::Down { at, on_node: false }));
    assert_eq!(outcome, ViewOutcome::Redraw);
    assert!(!view.viewport_state().is_dragging());

    let selection = view.selection().unwrap();
    assert_eq!(selection.key, key);
    assert!(selection.in_graph);

    let summary = view.summary().unwrap();
    assert!(matches!(summary.review_status, ReviewStatus::Overdue(_)));
    assert!(matches!(view.curve(), Some(CurveRender::Plot(_))));
}

#[test]
fn test_drag_on_empty_space_pans() {
    let mut view = view_with(sample_snapshot(NOW));

    view.handle(ViewEvent::Pointer(PointerEvent::Down {
        at: ScreenPoint::new(5.0, 5.0),
        on_node: false,
    }));
    assert!(view.viewport_state().is_dragging());

    view.handle(ViewEvent::Pointer(PointerEvent::Move {
        at: ScreenPoint::new(45.0, -15.0),
    }));
    view.handle(ViewEvent::Pointer(PointerEvent::Up));

    let t = view.transform();
    assert_eq!((t.translate_x, t.translate_y), (40.0, -20.0));
    assert!(view.selection().is_none());
}

#[test]
fn test_selection_follows_pan_and_zoom() {
    let mut view = view_with(sample_snapshot(NOW));
    let key = NodeKey::new(3, "a");

    view.handle(ViewEvent::Pointer(PointerEvent::Wheel {
        at: ScreenPoint::new(300.0, 200.0),
        delta_y: 120.0,
    }));
    view.handle(ViewEvent::Pointer(PointerEvent::Down {
        at: ScreenPoint::new(1.0, 1.0),
        on_node: false,
    }));
    view.handle(ViewEvent::Pointer(PointerEvent::Move {
        at: ScreenPoint::new(31.0, 11.0),
    }));
    view.handle(ViewEvent::Pointer(PointerEvent::Up));

    let at = screen_of(&view, &key);
    click(&mut view, at);
    assert_eq!(view.selection().unwrap().key, key);
}

// ===== Selection Refresh =====

#[test]
fn test_selection_refreshes_from_new_snapshot() {
    let mut view = view_with(snapshot_json(vec![layer_json(&[("hi", node_json(0.01, 2.5, NOW))])]));
    let key = NodeKey::new(0, "hi");
    let at = screen_of(&view, &key);
    click(&mut view, at);

    view.handle(ViewEvent::SnapshotArrived {
        request: None,
        payload: snapshot_json(vec![layer_json(&[("hi", node_json(0.01, 2.9, NOW))])]),
    });

    let selection = view.selection().unwrap();
    assert_eq!(selection.node.ease_factor, 2.9);
    assert!(selection.in_graph);
}

#[test]
fn test_selection_kept_when_node_disappears() {
    let mut view = view_with(snapshot_json(vec![layer_json(&[("gone", node_json(0.01, 2.5, NOW))])]));
    let key = NodeKey::new(0, "gone");
    assert!(view.select(&key));

    view.handle(ViewEvent::SnapshotArrived {
        request: None,
        payload: snapshot_json(vec![layer_json(&[("other", node_json(0.01, 2.5, NOW))])]),
    });

    let selection = view.selection().unwrap();
    assert_eq!(selection.key, key);
    assert!(!selection.in_graph);
    assert_eq!(selection.node.ease_factor, 2.5);
    assert!(view.summary().is_some());
}

#[test]
fn test_clear_selection() {
    let mut view = view_with(sample_snapshot(NOW));
    assert!(view.select(&NodeKey::new(0, "the cats")));
    assert!(!view.select(&NodeKey::new(0, "missing")));

    assert_eq!(view.handle(ViewEvent::ClearSelection), ViewOutcome::Redraw);
    assert!(view.selection().is_none());
    assert!(view.curve().is_none());
}

// ===== Ticks, Resize and Controls =====

#[test]
fn test_clock_tick_advances_decay() {
    let mut view = view_with(sample_snapshot(NOW));
    let key = NodeKey::new(1, "cats");
    let before = view.scene().node(&key).unwrap().retention;

    let outcome = view.handle(ViewEvent::Tick(TickKind::Clock, NOW + 86_400.0));
    assert_eq!(outcome, ViewOutcome::Redraw);
    assert_eq!(view.now(), NOW + 86_400.0);
    assert!(view.scene().node(&key).unwrap().retention < before);
}

#[test]
fn test_curve_tick_only_redraws_with_selection() {
    let mut view = view_with(sample_snapshot(NOW));
    assert_eq!(view.handle(ViewEvent::Tick(TickKind::Curve, NOW + 1.0)), ViewOutcome::Unchanged);

    view.select(&NodeKey::new(1, "the"));
    assert_eq!(view.handle(ViewEvent::Tick(TickKind::Curve, NOW + 2.0)), ViewOutcome::Redraw);
}

#[test]
fn test_resize_relayouts_and_falls_back() {
    let mut view = view_with(sample_snapshot(NOW));
    let key = NodeKey::new(0, "the cats");

    view.handle(ViewEvent::Resized(CanvasSize::new(2000.0, 900.0)));
    assert_eq!(view.layout().positions[&key].x, 1000.0);

    view.handle(ViewEvent::Resized(CanvasSize::new(0.0, 0.0)));
    assert_eq!(view.canvas(), CanvasSize::new(1000.0, 600.0));
    assert_eq!(view.layout().positions[&key].x, 500.0);

    assert_eq!(
        view.handle(ViewEvent::Resized(CanvasSize::new(1000.0, 600.0))),
        ViewOutcome::Unchanged
    );
}

#[test]
fn test_zoom_controls_and_reset() {
    let mut view = view_with(sample_snapshot(NOW));

    view.handle(ViewEvent::ZoomIn);
    assert_eq!(view.transform().zoom_percent(), 110);
    view.handle(ViewEvent::ZoomOut);
    assert_eq!(view.transform().zoom_percent(), 99);

    view.handle(ViewEvent::ResetViewport);
    assert_eq!(view.transform(), Transform::IDENTITY);
}

#[test]
fn test_scene_strokes_scale_with_zoom() {
    let mut view = view_with(sample_snapshot(NOW));
    view.handle(ViewEvent::ZoomIn);

    let scene = view.scene();
    let expected = 2.0 / view.transform().scale;
    assert!(scene.edges.iter().all(|e| (e.stroke_width - expected).abs() < 1e-12));
    assert!((scene.grid.spacing - 40.0 * view.transform().scale).abs() < 1e-12);
}

#[test]
fn test_layer_titles_follow_mode() {
    let mut config = Config::default();
    config.viewer.mode = mnemograph::graph::GraphMode::Article;
    let view = GraphView::new(&config, NOW);
    assert_eq!(view.layer_titles(), ["Article", "Section", "Concept", "Detail"]);
}
