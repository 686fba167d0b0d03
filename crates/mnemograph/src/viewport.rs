//! Pan/zoom viewport
//!
//! The viewport is an explicit two-state machine (`Idle` / `Dragging`) whose
//! transitions are pure functions of `(state, event)`. The affine transform
//! maps graph space to screen space as `screen = graph * scale + translate`.

use serde::Serialize;

use crate::config::ViewportConfig;
use crate::layout::Position;

/// A point in screen (surface) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Graph-to-screen affine transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn to_screen(&self, p: Position) -> ScreenPoint {
        ScreenPoint::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    pub fn to_graph(&self, p: ScreenPoint) -> Position {
        Position::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    /// Zoom level as a rounded percentage, e.g. `105`
    pub fn zoom_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }
}

/// Interaction mode of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragMode {
    #[default]
    Idle,
    Dragging {
        /// Screen point where the drag started
        origin: ScreenPoint,
        /// Translation at the moment the drag started
        origin_translate: (f64, f64),
    },
}

/// Pointer input in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { at: ScreenPoint, on_node: bool },
    Move { at: ScreenPoint },
    Up,
    /// Positive `delta_y` scrolls down (zoom out)
    Wheel { at: ScreenPoint, delta_y: f64 },
}

/// Transform plus interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    pub transform: Transform,
    pub mode: DragMode,
}

impl ViewportState {
    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, DragMode::Dragging { .. })
    }
}

/// Transition rules for [`ViewportState`]
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    config: ViewportConfig,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Apply one pointer event
    pub fn transition(&self, state: ViewportState, event: &PointerEvent) -> ViewportState {
        match (state.mode, *event) {
            (_, PointerEvent::Down { on_node: true, .. }) => state,
            (_, PointerEvent::Down { at, on_node: false }) => ViewportState {
                transform: state.transform,
                mode: DragMode::Dragging {
                    origin: at,
                    origin_translate: (state.transform.translate_x, state.transform.translate_y),
                },
            },
            (
                DragMode::Dragging {
                    origin,
                    origin_translate,
                },
                PointerEvent::Move { at },
            ) => ViewportState {
                transform: Transform {
                    translate_x: origin_translate.0 + (at.x - origin.x),
                    translate_y: origin_translate.1 + (at.y - origin.y),
                    ..state.transform
                },
                mode: state.mode,
            },
            (DragMode::Idle, PointerEvent::Move { .. }) => state,
            (_, PointerEvent::Up) => ViewportState {
                transform: state.transform,
                mode: DragMode::Idle,
            },
            (_, PointerEvent::Wheel { at, delta_y }) => {
                let factor = if delta_y > 0.0 {
                    self.config.wheel_zoom_out
                } else if delta_y < 0.0 {
                    self.config.wheel_zoom_in
                } else {
                    return state;
                };
                ViewportState {
                    transform: self.zoom_at(state.transform, at, factor),
                    mode: state.mode,
                }
            }
        }
    }

    /// Scale by `factor` keeping the graph point under `at` fixed on screen
    pub fn zoom_at(&self, transform: Transform, at: ScreenPoint, factor: f64) -> Transform {
        let new_scale = self.clamp_scale(transform.scale * factor);
        if new_scale == transform.scale {
            return transform;
        }

        let change = new_scale / transform.scale;
        Transform {
            scale: new_scale,
            translate_x: at.x - (at.x - transform.translate_x) * change,
            translate_y: at.y - (at.y - transform.translate_y) * change,
        }
    }

    /// "+" control: scale only, translation untouched
    pub fn zoom_in(&self, transform: Transform) -> Transform {
        Transform {
            scale: self.clamp_scale(transform.scale * self.config.button_zoom_in),
            ..transform
        }
    }

    /// "-" control: scale only, translation untouched
    pub fn zoom_out(&self, transform: Transform) -> Transform {
        Transform {
            scale: self.clamp_scale(transform.scale * self.config.button_zoom_out),
            ..transform
        }
    }

    pub fn reset(&self) -> ViewportState {
        ViewportState::default()
    }

    // max/min rather than clamp: an inverted range must not panic
    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.config.min_scale).min(self.config.max_scale)
    }
}
