//! Application state and logic

use crossterm::event::{
    Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use std::sync::Arc;
use tokio::sync::mpsc;

use mnemograph::source::{FetchOutcome, SnapshotSource, spawn_fetch};
use mnemograph::view::{CanvasSize, GraphView, ViewEvent, ViewOutcome, now_unix};
use mnemograph::viewport::{PointerEvent, ScreenPoint};

use crate::event::Event;

/// Pseudo-pixels per terminal column
pub const CELL_WIDTH_PX: f64 = 8.0;
/// Pseudo-pixels per terminal row
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Main application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// The graph view driven by this app
    pub view: GraphView,
    /// Last problem worth showing in the status line
    pub status: Option<String>,
    source: Option<Arc<dyn SnapshotSource>>,
    sender: mpsc::UnboundedSender<Event>,
    graph_area: Rect,
}

impl App {
    /// Create a new App instance
    pub fn new(
        view: GraphView,
        source: Option<Arc<dyn SnapshotSource>>,
        sender: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            should_quit: false,
            view,
            status: None,
            source,
            sender,
            graph_area: Rect::default(),
        }
    }

    /// Mark the app as ready to quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Start a fetch outside the poll timer (startup, manual refresh)
    pub fn request_snapshot(&mut self) {
        let request = self.view.begin_fetch();
        self.start_fetch(request);
    }

    /// Track the canvas cells of the graph pane; resizes the view on change
    pub fn set_graph_area(&mut self, area: Rect) {
        if area == self.graph_area {
            return;
        }
        self.graph_area = area;
        let size = CanvasSize::new(
            area.width as f64 * CELL_WIDTH_PX,
            area.height as f64 * CELL_HEIGHT_PX,
        );
        self.apply(ViewEvent::Resized(size));
    }

    pub fn graph_area(&self) -> Rect {
        self.graph_area
    }

    /// Handle one event; returns whether the screen needs a redraw
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Terminal(TerminalEvent::Key(key)) => self.handle_key(key),
            Event::Terminal(TerminalEvent::Mouse(mouse)) => self.handle_mouse(mouse),
            Event::Terminal(TerminalEvent::Resize(_, _)) => true,
            Event::Terminal(_) => false,
            Event::Tick(kind) => self.apply(ViewEvent::Tick(kind, now_unix())),
            Event::Snapshot(FetchOutcome { request, payload }) => match payload {
                Ok(payload) => {
                    let outcome = self.view.handle(ViewEvent::SnapshotArrived {
                        request: Some(request),
                        payload,
                    });
                    // only a snapshot that was actually applied clears the last problem
                    if outcome == ViewOutcome::Redraw {
                        self.status = None;
                    }
                    self.follow(outcome)
                }
                Err(e) => {
                    self.status = Some(e.to_string());
                    true
                }
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.quit();
                false
            }
            (KeyCode::Char('r'), _) => self.apply(ViewEvent::ResetViewport),
            (KeyCode::Char('+') | KeyCode::Char('='), _) => self.apply(ViewEvent::ZoomIn),
            (KeyCode::Char('-'), _) => self.apply(ViewEvent::ZoomOut),
            (KeyCode::Esc, _) => self.apply(ViewEvent::ClearSelection),
            (KeyCode::Char('f'), _) => {
                self.request_snapshot();
                false
            }
            _ => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let at = self.to_screen_point(mouse.column, mouse.row);
        let inside = self.contains(mouse.column, mouse.row);

        let pointer = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => PointerEvent::Down {
                at,
                on_node: false,
            },
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move { at },
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up,
            MouseEventKind::ScrollUp if inside => PointerEvent::Wheel { at, delta_y: -1.0 },
            MouseEventKind::ScrollDown if inside => PointerEvent::Wheel { at, delta_y: 1.0 },
            _ => return false,
        };
        self.apply(ViewEvent::Pointer(pointer))
    }

    fn contains(&self, column: u16, row: u16) -> bool {
        let area = self.graph_area;
        column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height)
    }

    /// Center of a terminal cell in canvas pseudo-pixels
    pub fn to_screen_point(&self, column: u16, row: u16) -> ScreenPoint {
        ScreenPoint::new(
            (column as f64 - self.graph_area.x as f64 + 0.5) * CELL_WIDTH_PX,
            (row as f64 - self.graph_area.y as f64 + 0.5) * CELL_HEIGHT_PX,
        )
    }

    fn apply(&mut self, event: ViewEvent) -> bool {
        let outcome = self.view.handle(event);
        self.follow(outcome)
    }

    fn follow(&mut self, outcome: ViewOutcome) -> bool {
        match outcome {
            ViewOutcome::Unchanged => false,
            ViewOutcome::Redraw => true,
            ViewOutcome::FetchRequested(request) => {
                self.start_fetch(request);
                false
            }
            ViewOutcome::Discarded(reason) => {
                tracing::debug!("Snapshot discarded: {reason}");
                self.status = Some(reason);
                true
            }
        }
    }

    fn start_fetch(&self, request: mnemograph::snapshot::RequestId) {
        if let Some(source) = &self.source {
            spawn_fetch(Arc::clone(source), request, self.sender.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use mnemograph::MnemographError;
    use mnemograph::config::Config;
    use mnemograph::scheduler::TickKind;
    use mnemograph::snapshot::RequestId;
    use mnemograph::testing::sample_snapshot;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let view = GraphView::new(&Config::default(), 0.0);
        App::new(view, None, tx)
    }

    fn press(code: KeyCode) -> Event {
        Event::Terminal(TerminalEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_event(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_zoom_keys() {
        let mut app = app();
        assert!(app.handle_event(press(KeyCode::Char('+'))));
        assert_eq!(app.view.transform().zoom_percent(), 110);
        assert!(app.handle_event(press(KeyCode::Char('r'))));
        assert_eq!(app.view.transform().zoom_percent(), 100);
    }

    fn fetch_failure(request: RequestId) -> Event {
        Event::Snapshot(FetchOutcome {
            request,
            payload: Err(MnemographError::Snapshot("read failed".to_string())),
        })
    }

    #[test]
    fn test_fetch_error_survives_clock_ticks() {
        let mut app = app();
        let request = app.view.begin_fetch();
        assert!(app.handle_event(fetch_failure(request)));
        assert_eq!(app.status.as_deref(), Some("Snapshot error: read failed"));

        app.handle_event(Event::Tick(TickKind::Clock));
        app.handle_event(press(KeyCode::Char('+')));
        assert_eq!(app.status.as_deref(), Some("Snapshot error: read failed"));
    }

    #[test]
    fn test_applied_snapshot_clears_status() {
        let mut app = app();
        let failed = app.view.begin_fetch();
        app.handle_event(fetch_failure(failed));
        assert!(app.status.is_some());

        let request = app.view.begin_fetch();
        let outcome = Event::Snapshot(FetchOutcome {
            request,
            payload: Ok(sample_snapshot(0.0)),
        });
        assert!(app.handle_event(outcome));
        assert!(app.status.is_none());
        assert!(app.view.graph().node_count() > 0);
    }

    #[test]
    fn test_stale_snapshot_keeps_status() {
        let mut app = app();
        let stale = app.view.begin_fetch();
        let _latest = app.view.begin_fetch();
        let outcome = Event::Snapshot(FetchOutcome {
            request: stale,
            payload: Ok(sample_snapshot(0.0)),
        });
        assert!(app.handle_event(outcome));
        assert!(app.status.as_deref().is_some_and(|s| s.contains("stale")));
        assert!(app.view.graph().is_empty());
    }

    #[test]
    fn test_graph_area_sets_canvas_size() {
        let mut app = app();
        app.set_graph_area(Rect::new(1, 1, 100, 30));
        assert_eq!(app.view.canvas(), CanvasSize::new(800.0, 480.0));
        assert_eq!(app.to_screen_point(1, 1), ScreenPoint::new(4.0, 8.0));
    }
}
