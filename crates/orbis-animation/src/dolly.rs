//! Camera dolly state: the camera orbits the globe centre and the user
//! moves it closer or further within soft bounds.

use glam::{Vec2, Vec3};

/// Upper dolly bound as a multiple of the initial camera distance.
pub const MAX_DISTANCE_FACTOR: f32 = 1.5;

/// Keeps orbiting away from the exact poles, where the up vector degenerates.
const POLE_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DollyDirection {
    /// Toward the globe.
    In,
    /// Away from the globe.
    Out,
}

/// Camera placement relative to the globe centre.
#[derive(Debug, Clone, PartialEq)]
pub struct DollyState {
    position: Vec3,
    initial_position: Vec3,
    user_distance: Option<f32>,
    min_distance: f32,
    max_distance: f32,
    step: f32,
}

impl DollyState {
    /// `step` is the relative distance change per dolly; the outer bound is
    /// fixed at [`MAX_DISTANCE_FACTOR`] times the initial distance.
    pub fn new(initial_position: Vec3, min_distance: f32, step: f32) -> Self {
        Self {
            position: initial_position,
            initial_position,
            user_distance: None,
            min_distance,
            max_distance: initial_position.length() * MAX_DISTANCE_FACTOR,
            step: step.clamp(0.0, 0.95),
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    #[must_use]
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    #[must_use]
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Unit vector from the globe centre toward the camera.
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Z)
    }

    /// Written by camera animations.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Step the camera along its view ray.
    ///
    /// The bounds are soft: a step is refused once the camera is already at
    /// or past the bound in that direction, and a step that would cross it
    /// lands on it instead. A camera animation may still leave the camera
    /// outside the bounds. Returns whether the camera moved.
    pub fn dolly(&mut self, direction: DollyDirection) -> bool {
        let distance = self.distance();
        let target = match direction {
            DollyDirection::In if distance <= self.min_distance => return false,
            DollyDirection::Out if distance >= self.max_distance => return false,
            DollyDirection::In => (distance * (1.0 - self.step)).max(self.min_distance),
            DollyDirection::Out => (distance * (1.0 + self.step)).min(self.max_distance),
        };
        // Already on the bound up to rounding.
        if (target - distance).abs() <= distance * 1e-6 {
            return false;
        }
        self.position = self.direction() * target;
        true
    }

    /// Rotate the camera around the globe centre, keeping its distance.
    ///
    /// `delta.x` turns around the vertical axis, `delta.y` tilts toward the
    /// poles. Both are in radians.
    pub fn orbit(&mut self, delta: Vec2) {
        let distance = self.distance();
        if distance <= f32::EPSILON {
            return;
        }
        let dir = self.direction();
        let azimuth = dir.x.atan2(dir.z) - delta.x;
        let polar = (dir.y.clamp(-1.0, 1.0).acos() - delta.y)
            .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
        self.position = Vec3::new(
            polar.sin() * azimuth.sin(),
            polar.cos(),
            polar.sin() * azimuth.cos(),
        ) * distance;
    }

    /// Remember the current distance so a later return flight can restore it.
    pub fn remember_user_distance(&mut self) {
        self.user_distance = Some(self.distance());
    }

    #[must_use]
    pub fn user_distance(&self) -> Option<f32> {
        self.user_distance
    }

    /// Take the remembered distance, clearing it.
    pub fn take_user_distance(&mut self) -> Option<f32> {
        self.user_distance.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dolly() -> DollyState {
        DollyState::new(Vec3::new(0.0, 2.4, 3.2), 1.6, 0.05)
    }

    #[test]
    fn test_bounds_from_initial_distance() {
        let state = dolly();
        assert!((state.distance() - 4.0).abs() < 1e-5);
        assert!((state.max_distance() - 6.0).abs() < 1e-5);
        assert_eq!(state.min_distance(), 1.6);
    }

    #[test]
    fn test_dolly_in_non_increasing_and_stops() {
        let mut state = dolly();
        let mut prev = state.distance();
        let mut moves = 0;
        while state.dolly(DollyDirection::In) {
            assert!(state.distance() <= prev);
            assert!(state.distance() >= state.min_distance() - 1e-5);
            prev = state.distance();
            moves += 1;
            assert!(moves < 1000);
        }
        assert!((state.distance() - state.min_distance()).abs() < 1e-4);
        assert!(!state.dolly(DollyDirection::In));
    }

    #[test]
    fn test_dolly_out_non_decreasing_and_stops() {
        let mut state = dolly();
        let mut prev = state.distance();
        while state.dolly(DollyDirection::Out) {
            assert!(state.distance() >= prev);
            assert!(state.distance() <= state.max_distance() + 1e-5);
            prev = state.distance();
        }
        assert!((state.distance() - state.max_distance()).abs() < 1e-4);
        assert!(!state.dolly(DollyDirection::Out));
    }

    #[test]
    fn test_step_crossing_inner_bound_lands_on_it() {
        let mut state = DollyState::new(Vec3::new(0.0, 0.0, 1.65), 1.6, 0.05);
        assert!(state.dolly(DollyDirection::In));
        assert!((state.distance() - 1.6).abs() < 1e-5);
        assert!(!state.dolly(DollyDirection::In));
        assert!(state.dolly(DollyDirection::Out));
    }

    #[test]
    fn test_dolly_in_from_inside_bound_is_refused() {
        let mut state = dolly();
        state.set_position(Vec3::new(0.0, 0.0, 1.2));
        assert!(!state.dolly(DollyDirection::In));
        assert_eq!(state.distance(), 1.2);
    }

    #[test]
    fn test_dolly_keeps_direction() {
        let mut state = dolly();
        let dir = state.direction();
        state.dolly(DollyDirection::In);
        assert!((state.direction() - dir).length() < 1e-5);
    }

    #[test]
    fn test_orbit_preserves_distance_and_clamps_poles() {
        let mut state = dolly();
        state.orbit(Vec2::new(0.7, 0.0));
        assert!((state.distance() - 4.0).abs() < 1e-4);

        state.orbit(Vec2::new(0.0, 10.0));
        let polar = state.direction().y.acos();
        assert!(polar >= POLE_MARGIN - 1e-4);
        assert!((state.distance() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_user_distance_round_trip() {
        let mut state = dolly();
        state.dolly(DollyDirection::Out);
        state.remember_user_distance();
        let remembered = state.user_distance().unwrap();
        assert!((remembered - 4.2).abs() < 1e-4);
        assert_eq!(state.take_user_distance(), Some(remembered));
        assert_eq!(state.take_user_distance(), None);
    }
}
