//! The graph view: single owner of interaction state
//!
//! All state changes go through [`GraphView::handle`], one event at a time.
//! Snapshot results, pointer input, resizes and timer ticks are all
//! [`ViewEvent`]s, so nothing mutates the view concurrently.

use serde_json::Value;

use crate::config::Config;
use crate::curve::{CurveRender, RetentionCurveRenderer};
use crate::graph::{Graph, GraphMode, LAYER_COUNT, Node, NodeKey};
use crate::layout::{Layout, LayoutEngine};
use crate::retention::NodeSummary;
use crate::scene::{self, Scene, SceneStyle};
use crate::scheduler::TickKind;
use crate::snapshot::{self, RequestId, SnapshotSequencer};
use crate::viewport::{PointerEvent, Transform, Viewport, ViewportState};

/// Current wall-clock time in unix seconds
pub fn now_unix() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Drawing surface size in screen units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Replace a zero or unusable dimension with the fallback's
    pub fn or(self, fallback: CanvasSize) -> Self {
        let pick = |value: f64, default: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                default
            }
        };
        Self {
            width: pick(self.width, fallback.width),
            height: pick(self.height, fallback.height),
        }
    }
}

/// The node shown in the detail panel
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: NodeKey,
    /// Last known copy of the node
    pub node: Node,
    /// `false` once a newer snapshot no longer contains the node
    pub in_graph: bool,
}

/// Input to the view
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A snapshot payload; `request` is `None` for push deliveries
    SnapshotArrived {
        request: Option<RequestId>,
        payload: Value,
    },
    Resized(CanvasSize),
    Pointer(PointerEvent),
    Tick(TickKind, f64),
    ZoomIn,
    ZoomOut,
    ResetViewport,
    ClearSelection,
}

/// What the caller should do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    /// Nothing visible changed
    Unchanged,
    Redraw,
    /// Start a fetch under this id and deliver it back as `SnapshotArrived`
    FetchRequested(RequestId),
    /// The payload was stale or malformed and was dropped
    Discarded(String),
}

/// Interactive state of one graph canvas
#[derive(Debug)]
pub struct GraphView {
    graph: Graph,
    layout: Layout,
    viewport: Viewport,
    viewport_state: ViewportState,
    selection: Option<Selection>,
    now: f64,
    canvas: CanvasSize,
    fallback_canvas: CanvasSize,
    sequencer: SnapshotSequencer,
    engine: LayoutEngine,
    curve: RetentionCurveRenderer,
    style: SceneStyle,
    mode: GraphMode,
}

impl GraphView {
    pub fn new(config: &Config, now: f64) -> Self {
        let fallback_canvas =
            CanvasSize::new(config.viewer.default_width, config.viewer.default_height);

        Self {
            graph: Graph::empty(),
            layout: Layout::default(),
            viewport: Viewport::new(config.viewport.clone()),
            viewport_state: ViewportState::default(),
            selection: None,
            now,
            canvas: fallback_canvas,
            fallback_canvas,
            sequencer: SnapshotSequencer::new(),
            engine: LayoutEngine::new(config.layout.clone()),
            curve: RetentionCurveRenderer::new(config.curve.clone(), &config.retention),
            style: SceneStyle::from_config(config),
            mode: config.viewer.mode,
        }
    }

    pub fn handle(&mut self, event: ViewEvent) -> ViewOutcome {
        match event {
            ViewEvent::SnapshotArrived { request, payload } => {
                self.apply_snapshot(request, &payload)
            }
            ViewEvent::Resized(size) => {
                let size = size.or(self.fallback_canvas);
                if size == self.canvas {
                    return ViewOutcome::Unchanged;
                }
                self.canvas = size;
                self.relayout();
                ViewOutcome::Redraw
            }
            ViewEvent::Pointer(pointer) => self.handle_pointer(pointer),
            ViewEvent::Tick(kind, now) => {
                self.now = now;
                match kind {
                    TickKind::Clock => ViewOutcome::Redraw,
                    TickKind::Curve if self.selection.is_some() => ViewOutcome::Redraw,
                    TickKind::Curve => ViewOutcome::Unchanged,
                    TickKind::Poll => ViewOutcome::FetchRequested(self.sequencer.begin_request()),
                }
            }
            ViewEvent::ZoomIn => {
                self.viewport_state.transform = self.viewport.zoom_in(self.viewport_state.transform);
                ViewOutcome::Redraw
            }
            ViewEvent::ZoomOut => {
                self.viewport_state.transform = self.viewport.zoom_out(self.viewport_state.transform);
                ViewOutcome::Redraw
            }
            ViewEvent::ResetViewport => {
                self.viewport_state = self.viewport.reset();
                ViewOutcome::Redraw
            }
            ViewEvent::ClearSelection => match self.selection.take() {
                Some(_) => ViewOutcome::Redraw,
                None => ViewOutcome::Unchanged,
            },
        }
    }

    /// Allocate an id for a fetch started outside the poll timer
    pub fn begin_fetch(&mut self) -> RequestId {
        self.sequencer.begin_request()
    }

    /// Select a node by key. Returns `false` if it is not a valid node.
    pub fn select(&mut self, key: &NodeKey) -> bool {
        let Some(node) = self.graph.node(key) else {
            return false;
        };
        tracing::debug!(node = %key, "Node selected");
        self.selection = Some(Selection {
            key: key.clone(),
            node: node.clone(),
            in_graph: true,
        });
        true
    }

    fn apply_snapshot(&mut self, request: Option<RequestId>, payload: &Value) -> ViewOutcome {
        let id = match request {
            Some(id) => {
                if !self.sequencer.accept(id) {
                    return ViewOutcome::Discarded(format!("stale snapshot {id}"));
                }
                id
            }
            None => self.sequencer.observe_push(),
        };

        let graph = match snapshot::parse_snapshot(payload) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(request = %id, "Keeping previous graph: {e}");
                return ViewOutcome::Discarded(e.to_string());
            }
        };

        tracing::info!(request = %id, nodes = graph.node_count(), "Snapshot applied");
        self.graph = graph;
        self.relayout();
        self.refresh_selection();
        ViewOutcome::Redraw
    }

    fn refresh_selection(&mut self) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        match self.graph.node(&selection.key) {
            Some(node) => {
                selection.node = node.clone();
                selection.in_graph = true;
            }
            None => {
                if selection.in_graph {
                    tracing::debug!(node = %selection.key, "Selected node left the graph");
                }
                selection.in_graph = false;
            }
        }
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) -> ViewOutcome {
        let pointer = match pointer {
            PointerEvent::Down { at, .. } => {
                let hit = scene::hit_test(
                    &self.layout.positions,
                    &self.viewport_state.transform,
                    at,
                    self.style.node_size,
                );
                if let Some(key) = hit {
                    self.select(&key);
                    self.viewport_state = self
                        .viewport
                        .transition(self.viewport_state, &PointerEvent::Down { at, on_node: true });
                    return ViewOutcome::Redraw;
                }
                PointerEvent::Down { at, on_node: false }
            }
            other => other,
        };

        let next = self.viewport.transition(self.viewport_state, &pointer);
        if next == self.viewport_state {
            return ViewOutcome::Unchanged;
        }
        self.viewport_state = next;
        ViewOutcome::Redraw
    }

    fn relayout(&mut self) {
        self.layout = self
            .engine
            .layout(&self.graph, self.canvas.width, self.canvas.height);
    }

    /// Compose the frame for the current state
    pub fn scene(&self) -> Scene {
        Scene::compose(
            &self.graph,
            &self.layout.positions,
            self.viewport_state.transform,
            self.now,
            &self.style,
        )
    }

    /// Retention curve of the selected node
    pub fn curve(&self) -> Option<CurveRender> {
        self.selection
            .as_ref()
            .map(|selection| self.curve.render(&selection.node, self.now))
    }

    pub fn summary(&self) -> Option<NodeSummary> {
        self.selection
            .as_ref()
            .map(|selection| NodeSummary::new(&selection.node, self.now))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn transform(&self) -> Transform {
        self.viewport_state.transform
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport_state
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    /// Node diameter in graph units
    pub fn node_size(&self) -> f64 {
        self.style.node_size
    }

    pub fn layer_titles(&self) -> [&'static str; LAYER_COUNT] {
        self.mode.layer_titles()
    }

    pub fn last_applied(&self) -> Option<RequestId> {
        self.sequencer.last_applied()
    }
}
