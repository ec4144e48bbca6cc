//! Device-neutral pointer events and the winit adapter that produces them.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

/// Identifies one pointer: the mouse, or a single finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(u64::MAX);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A pointer event in logical window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        id: PointerId,
        kind: PointerKind,
        position: Vec2,
    },
    Move {
        id: PointerId,
        kind: PointerKind,
        position: Vec2,
    },
    Up {
        id: PointerId,
        kind: PointerKind,
        position: Vec2,
    },
    /// Positive scrolls up (toward the globe).
    Wheel { delta: f32 },
    Cancel { id: PointerId },
}

impl PointerEvent {
    pub fn kind(&self) -> Option<PointerKind> {
        match self {
            PointerEvent::Down { kind, .. }
            | PointerEvent::Move { kind, .. }
            | PointerEvent::Up { kind, .. } => Some(*kind),
            PointerEvent::Wheel { .. } => Some(PointerKind::Mouse),
            PointerEvent::Cancel { .. } => None,
        }
    }
}

/// Converts winit window events into [`PointerEvent`]s.
///
/// winit reports button presses without a position, so the adapter keeps the
/// last cursor position. Positions are converted from physical to logical
/// pixels with the current scale factor.
#[derive(Debug, Clone)]
pub struct WinitPointerAdapter {
    cursor: Vec2,
    scale_factor: f64,
}

impl WinitPointerAdapter {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            cursor: Vec2::ZERO,
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Last known cursor position in logical pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    fn to_logical(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            (x / self.scale_factor) as f32,
            (y / self.scale_factor) as f32,
        )
    }

    /// Convert one window event. Non-pointer events and buttons other than
    /// the primary one yield `None`.
    pub fn convert(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_logical(position.x, position.y);
                Some(PointerEvent::Move {
                    id: PointerId::MOUSE,
                    kind: PointerKind::Mouse,
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => Some(self.mouse_button(*state)),
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // ~40 pixels per line
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 40.0) as f32,
                };
                Some(PointerEvent::Wheel { delta })
            }
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Cancel {
                id: PointerId::MOUSE,
            }),
            WindowEvent::Touch(touch) => {
                let id = PointerId(touch.id);
                let kind = PointerKind::Touch;
                let position = self.to_logical(touch.location.x, touch.location.y);
                Some(match touch.phase {
                    TouchPhase::Started => PointerEvent::Down { id, kind, position },
                    TouchPhase::Moved => PointerEvent::Move { id, kind, position },
                    TouchPhase::Ended => PointerEvent::Up { id, kind, position },
                    TouchPhase::Cancelled => PointerEvent::Cancel { id },
                })
            }
            _ => None,
        }
    }

    fn mouse_button(&self, state: ElementState) -> PointerEvent {
        let id = PointerId::MOUSE;
        let kind = PointerKind::Mouse;
        let position = self.cursor;
        match state {
            ElementState::Pressed => PointerEvent::Down { id, kind, position },
            ElementState::Released => PointerEvent::Up { id, kind, position },
        }
    }
}
