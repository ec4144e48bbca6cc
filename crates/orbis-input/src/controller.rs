//! Turns pointer events into globe intents.
//!
//! Mouse: hovering outlines the country under the cursor, a click selects,
//! a drag orbits, the wheel dollies. Touch: the first tap on a country
//! outlines it and a second tap on the same country selects; two fingers
//! dolly by pinching. The controller never mutates the scene itself.

use glam::Vec2;
use orbis_animation::DollyDirection;
use orbis_config::InputConfig;

use crate::pointer::{PointerEvent, PointerId, PointerKind};

/// Pinch distance changes below this (logical pixels) are ignored.
const PINCH_EPSILON: f32 = 0.5;

/// Finds the country under a window position.
pub trait Picker {
    /// Name of the nearest visible country at `position` (logical pixels).
    fn pick(&self, position: Vec2) -> Option<String>;
}

/// Platform hint for the interaction style.
pub trait InputCapabilities {
    fn prefers_touch(&self) -> bool;
}

/// Mouse-and-keyboard desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopCapabilities;

impl InputCapabilities for DesktopCapabilities {
    fn prefers_touch(&self) -> bool {
        false
    }
}

/// A configured touch mode wins over the platform hint.
pub fn resolve_touch_mode(configured: Option<bool>, capabilities: &dyn InputCapabilities) -> bool {
    configured.unwrap_or_else(|| capabilities.prefers_touch())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Outline this country, or clear the outline.
    Hover(Option<String>),
    Select(String),
    Dolly(DollyDirection),
    /// Orbit by this many radians (x around the vertical axis, y toward the poles).
    Orbit(Vec2),
}

#[derive(Debug, Clone)]
struct TrackedPointer {
    id: PointerId,
    kind: PointerKind,
    down: Vec2,
    last: Vec2,
    dragging: bool,
}

pub struct InteractionController {
    enabled: bool,
    touch_mode: Option<bool>,
    drag_threshold: f32,
    orbit_sensitivity: f32,
    /// At most two pointers are tracked.
    pointers: Vec<TrackedPointer>,
    pinch_distance: Option<f32>,
    /// A second finger joined the current gesture, so it is not a tap.
    pinched: bool,
    hovered: Option<String>,
    tapped: Option<String>,
}

impl InteractionController {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            enabled: true,
            touch_mode: config.touch_mode,
            drag_threshold: config.drag_threshold_px.max(0.0),
            orbit_sensitivity: config.orbit_sensitivity,
            pointers: Vec::with_capacity(2),
            pinch_distance: None,
            pinched: false,
            hovered: None,
            tapped: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Detach or re-attach input. Disabling drops any gesture in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.reset_gesture();
        tracing::debug!(enabled, "Interaction input toggled");
    }

    /// `None` picks the style per event from the pointer kind.
    pub fn set_touch_mode(&mut self, touch_mode: Option<bool>) {
        self.touch_mode = touch_mode;
        self.tapped = None;
    }

    pub fn touch_mode(&self) -> Option<bool> {
        self.touch_mode
    }

    /// Country currently outlined by hover or first tap.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    fn reset_gesture(&mut self) {
        self.pointers.clear();
        self.pinch_distance = None;
        self.pinched = false;
        self.hovered = None;
        self.tapped = None;
    }

    fn uses_taps(&self, kind: PointerKind) -> bool {
        self.touch_mode.unwrap_or(kind == PointerKind::Touch)
    }

    fn tracked(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|p| p.id == id)
    }

    fn current_pinch_distance(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [a, b] => Some(a.last.distance(b.last)),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: PointerEvent, picker: &dyn Picker) -> Vec<Intent> {
        if !self.enabled {
            return Vec::new();
        }
        let mut intents = Vec::new();
        match event {
            PointerEvent::Down { id, kind, position } => self.on_down(id, kind, position),
            PointerEvent::Move { id, kind, position } => {
                self.on_move(id, kind, position, picker, &mut intents)
            }
            PointerEvent::Up { id, kind, position } => {
                self.on_up(id, kind, position, picker, &mut intents)
            }
            PointerEvent::Wheel { delta } => {
                if delta > 0.0 {
                    intents.push(Intent::Dolly(DollyDirection::In));
                } else if delta < 0.0 {
                    intents.push(Intent::Dolly(DollyDirection::Out));
                }
            }
            PointerEvent::Cancel { id } => self.on_cancel(id, &mut intents),
        }
        intents
    }

    fn on_down(&mut self, id: PointerId, kind: PointerKind, position: Vec2) {
        if self.pointers.len() >= 2 || self.tracked(id).is_some() {
            return;
        }
        self.pointers.push(TrackedPointer {
            id,
            kind,
            down: position,
            last: position,
            dragging: false,
        });
        if self.pointers.len() == 2 {
            self.pinched = true;
            self.pinch_distance = self.current_pinch_distance();
        }
    }

    fn on_move(
        &mut self,
        id: PointerId,
        kind: PointerKind,
        position: Vec2,
        picker: &dyn Picker,
        intents: &mut Vec<Intent>,
    ) {
        let Some(index) = self.tracked(id) else {
            if kind == PointerKind::Mouse && !self.uses_taps(kind) {
                let name = picker.pick(position);
                if name != self.hovered {
                    self.hovered.clone_from(&name);
                    intents.push(Intent::Hover(name));
                }
            }
            return;
        };

        if self.pointers.len() == 2 {
            self.pointers[index].last = position;
            let (Some(previous), Some(current)) =
                (self.pinch_distance, self.current_pinch_distance())
            else {
                return;
            };
            let change = current - previous;
            if change.abs() > PINCH_EPSILON {
                let direction = if change > 0.0 {
                    DollyDirection::In
                } else {
                    DollyDirection::Out
                };
                intents.push(Intent::Dolly(direction));
                self.pinch_distance = Some(current);
            }
            return;
        }

        let threshold = self.drag_threshold;
        let sensitivity = self.orbit_sensitivity;
        let pointer = &mut self.pointers[index];
        if !pointer.dragging && pointer.down.distance(position) > threshold {
            pointer.dragging = true;
        }
        if pointer.dragging {
            let delta = position - pointer.last;
            if delta != Vec2::ZERO {
                intents.push(Intent::Orbit(delta * sensitivity));
            }
        }
        pointer.last = position;
    }

    fn on_up(
        &mut self,
        id: PointerId,
        kind: PointerKind,
        position: Vec2,
        picker: &dyn Picker,
        intents: &mut Vec<Intent>,
    ) {
        let Some(index) = self.tracked(id) else {
            return;
        };
        let pointer = self.pointers.remove(index);
        self.pinch_distance = None;
        if !self.pointers.is_empty() {
            return;
        }
        let pinched = std::mem::take(&mut self.pinched);
        if pinched || pointer.dragging || pointer.down.distance(position) > self.drag_threshold {
            return;
        }

        let picked = picker.pick(position);
        if !self.uses_taps(kind) {
            if let Some(name) = picked {
                intents.push(Intent::Select(name));
            }
            return;
        }

        match picked {
            Some(name) if self.tapped.as_deref() == Some(name.as_str()) => {
                tracing::debug!(country = %name, "Second tap selects");
                self.tapped = None;
                self.hovered = None;
                intents.push(Intent::Select(name));
            }
            Some(name) => {
                self.tapped = Some(name.clone());
                self.hovered = Some(name.clone());
                intents.push(Intent::Hover(Some(name)));
            }
            None => {
                self.tapped = None;
                if self.hovered.take().is_some() {
                    intents.push(Intent::Hover(None));
                }
            }
        }
    }

    fn on_cancel(&mut self, id: PointerId, intents: &mut Vec<Intent>) {
        match self.tracked(id) {
            Some(index) => {
                self.pointers.remove(index);
                self.pinch_distance = None;
                if self.pointers.is_empty() {
                    self.pinched = false;
                }
            }
            // The cursor left the window while hovering.
            None if id == PointerId::MOUSE && !self.uses_taps(PointerKind::Mouse) => {
                if self.hovered.take().is_some() {
                    intents.push(Intent::Hover(None));
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "West" left of x = 100, "East" from 100 to 200, ocean beyond.
    struct StripPicker;

    impl Picker for StripPicker {
        fn pick(&self, position: Vec2) -> Option<String> {
            if position.x < 100.0 {
                Some("West".to_string())
            } else if position.x < 200.0 {
                Some("East".to_string())
            } else {
                None
            }
        }
    }

    fn controller(touch_mode: Option<bool>) -> InteractionController {
        InteractionController::new(&InputConfig {
            drag_threshold_px: 4.0,
            orbit_sensitivity: 0.01,
            touch_mode,
        })
    }

    fn mouse_move(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Move {
            id: PointerId::MOUSE,
            kind: PointerKind::Mouse,
            position: Vec2::new(x, y),
        }
    }

    fn mouse_down(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Down {
            id: PointerId::MOUSE,
            kind: PointerKind::Mouse,
            position: Vec2::new(x, y),
        }
    }

    fn mouse_up(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Up {
            id: PointerId::MOUSE,
            kind: PointerKind::Mouse,
            position: Vec2::new(x, y),
        }
    }

    fn touch(id: u64, x: f32, y: f32) -> [PointerEvent; 3] {
        let id = PointerId(id);
        let kind = PointerKind::Touch;
        let position = Vec2::new(x, y);
        [
            PointerEvent::Down { id, kind, position },
            PointerEvent::Move { id, kind, position },
            PointerEvent::Up { id, kind, position },
        ]
    }

    fn tap(c: &mut InteractionController, x: f32) -> Vec<Intent> {
        let [down, _, up] = touch(1, x, 50.0);
        let mut intents = c.handle(down, &StripPicker);
        intents.extend(c.handle(up, &StripPicker));
        intents
    }

    #[test]
    fn test_hover_reports_changes_only() {
        let mut c = controller(None);
        assert_eq!(
            c.handle(mouse_move(10.0, 10.0), &StripPicker),
            vec![Intent::Hover(Some("West".into()))]
        );
        assert!(c.handle(mouse_move(20.0, 10.0), &StripPicker).is_empty());
        assert_eq!(
            c.handle(mouse_move(250.0, 10.0), &StripPicker),
            vec![Intent::Hover(None)]
        );
    }

    #[test]
    fn test_click_selects() {
        let mut c = controller(None);
        assert!(c.handle(mouse_down(150.0, 10.0), &StripPicker).is_empty());
        assert_eq!(
            c.handle(mouse_up(152.0, 11.0), &StripPicker),
            vec![Intent::Select("East".into())]
        );
    }

    #[test]
    fn test_click_on_ocean_does_nothing() {
        let mut c = controller(None);
        c.handle(mouse_down(300.0, 10.0), &StripPicker);
        assert!(c.handle(mouse_up(300.0, 10.0), &StripPicker).is_empty());
    }

    #[test]
    fn test_drag_orbits_and_suppresses_select() {
        let mut c = controller(None);
        c.handle(mouse_down(50.0, 50.0), &StripPicker);
        assert!(c.handle(mouse_move(52.0, 50.0), &StripPicker).is_empty());

        let intents = c.handle(mouse_move(60.0, 50.0), &StripPicker);
        assert_eq!(intents.len(), 1);
        let Intent::Orbit(delta) = intents[0] else {
            panic!("expected orbit, got {intents:?}");
        };
        assert!((delta.x - 0.08).abs() < 1e-6);
        assert_eq!(delta.y, 0.0);

        assert!(c.handle(mouse_up(60.0, 50.0), &StripPicker).is_empty());
    }

    #[test]
    fn test_no_hover_while_button_held() {
        let mut c = controller(None);
        c.handle(mouse_down(50.0, 50.0), &StripPicker);
        let intents = c.handle(mouse_move(51.0, 50.0), &StripPicker);
        assert!(intents.iter().all(|i| !matches!(i, Intent::Hover(_))));
    }

    #[test]
    fn test_wheel_sign_selects_direction() {
        let mut c = controller(None);
        assert_eq!(
            c.handle(PointerEvent::Wheel { delta: 1.0 }, &StripPicker),
            vec![Intent::Dolly(DollyDirection::In)]
        );
        assert_eq!(
            c.handle(PointerEvent::Wheel { delta: -0.5 }, &StripPicker),
            vec![Intent::Dolly(DollyDirection::Out)]
        );
        assert!(c.handle(PointerEvent::Wheel { delta: 0.0 }, &StripPicker).is_empty());
    }

    #[test]
    fn test_first_tap_outlines_second_selects() {
        let mut c = controller(None);
        assert_eq!(tap(&mut c, 50.0), vec![Intent::Hover(Some("West".into()))]);
        assert_eq!(c.hovered(), Some("West"));
        assert_eq!(tap(&mut c, 50.0), vec![Intent::Select("West".into())]);
    }

    #[test]
    fn test_tap_on_other_country_moves_outline() {
        let mut c = controller(None);
        tap(&mut c, 50.0);
        assert_eq!(tap(&mut c, 150.0), vec![Intent::Hover(Some("East".into()))]);
        assert_eq!(tap(&mut c, 250.0), vec![Intent::Hover(None)]);
        assert_eq!(tap(&mut c, 150.0), vec![Intent::Hover(Some("East".into()))]);
    }

    #[test]
    fn test_forced_touch_mode_applies_to_mouse() {
        let mut c = controller(Some(true));
        assert!(c.handle(mouse_move(50.0, 10.0), &StripPicker).is_empty());
        c.handle(mouse_down(50.0, 10.0), &StripPicker);
        assert_eq!(
            c.handle(mouse_up(50.0, 10.0), &StripPicker),
            vec![Intent::Hover(Some("West".into()))]
        );
    }

    #[test]
    fn test_pinch_dollies_by_distance_change() {
        let mut c = controller(None);
        let [a_down, ..] = touch(1, 100.0, 100.0);
        let [b_down, ..] = touch(2, 200.0, 100.0);
        c.handle(a_down, &StripPicker);
        c.handle(b_down, &StripPicker);

        let spread = PointerEvent::Move {
            id: PointerId(2),
            kind: PointerKind::Touch,
            position: Vec2::new(260.0, 100.0),
        };
        assert_eq!(
            c.handle(spread, &StripPicker),
            vec![Intent::Dolly(DollyDirection::In)]
        );

        let squeeze = PointerEvent::Move {
            id: PointerId(2),
            kind: PointerKind::Touch,
            position: Vec2::new(150.0, 100.0),
        };
        assert_eq!(
            c.handle(squeeze, &StripPicker),
            vec![Intent::Dolly(DollyDirection::Out)]
        );
    }

    #[test]
    fn test_third_finger_is_ignored_and_pinch_is_not_a_tap() {
        let mut c = controller(None);
        let [a_down, _, a_up] = touch(1, 50.0, 100.0);
        let [b_down, _, b_up] = touch(2, 60.0, 100.0);
        let [c_down, _, _] = touch(3, 70.0, 100.0);
        c.handle(a_down, &StripPicker);
        c.handle(b_down, &StripPicker);
        c.handle(c_down, &StripPicker);
        assert!(c.handle(b_up, &StripPicker).is_empty());
        assert!(c.handle(a_up, &StripPicker).is_empty());
        assert_eq!(tap(&mut c, 50.0), vec![Intent::Hover(Some("West".into()))]);
    }

    #[test]
    fn test_disabled_controller_ignores_everything() {
        let mut c = controller(None);
        c.handle(mouse_down(50.0, 10.0), &StripPicker);
        c.set_enabled(false);
        assert!(!c.is_enabled());
        assert!(c.handle(mouse_up(50.0, 10.0), &StripPicker).is_empty());
        assert!(c.handle(PointerEvent::Wheel { delta: 1.0 }, &StripPicker).is_empty());

        c.set_enabled(true);
        // The press was dropped with the gesture state.
        assert!(c.handle(mouse_up(50.0, 10.0), &StripPicker).is_empty());
        assert_eq!(
            c.handle(mouse_move(50.0, 10.0), &StripPicker),
            vec![Intent::Hover(Some("West".into()))]
        );
    }

    #[test]
    fn test_cursor_leaving_clears_hover() {
        let mut c = controller(None);
        c.handle(mouse_move(50.0, 10.0), &StripPicker);
        assert_eq!(
            c.handle(PointerEvent::Cancel { id: PointerId::MOUSE }, &StripPicker),
            vec![Intent::Hover(None)]
        );
    }

    #[test]
    fn test_touch_mode_resolution() {
        struct Tablet;
        impl InputCapabilities for Tablet {
            fn prefers_touch(&self) -> bool {
                true
            }
        }
        assert!(!resolve_touch_mode(None, &DesktopCapabilities));
        assert!(resolve_touch_mode(None, &Tablet));
        assert!(!resolve_touch_mode(Some(false), &Tablet));
    }
}
