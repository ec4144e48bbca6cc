//! Animated properties.

use glam::{Quat, Vec3};

/// What an animation interpolates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    /// Uniform scale of a mesh.
    Scale { from: f32, to: f32 },
    /// Camera position orbiting the origin. Direction is interpolated on the
    /// sphere and distance linearly, so the path never cuts through the globe.
    CameraPath { from: Vec3, to: Vec3 },
}

/// A sampled track value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Scale(f32),
    Position(Vec3),
}

impl Track {
    pub fn sample(&self, t: f32) -> TrackValue {
        match *self {
            Track::Scale { from, to } => TrackValue::Scale(from + (to - from) * t),
            Track::CameraPath { from, to } => TrackValue::Position(orbit_lerp(from, to, t)),
        }
    }

    /// The same track played backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match *self {
            Track::Scale { from, to } => Track::Scale { from: to, to: from },
            Track::CameraPath { from, to } => Track::CameraPath { from: to, to: from },
        }
    }

    /// Restart from `value` when it matches this track's kind.
    #[must_use]
    pub fn starting_at(&self, value: TrackValue) -> Self {
        match (*self, value) {
            (Track::Scale { to, .. }, TrackValue::Scale(from)) => Track::Scale { from, to },
            (Track::CameraPath { to, .. }, TrackValue::Position(from)) => {
                Track::CameraPath { from, to }
            }
            (track, _) => track,
        }
    }

    pub fn end_value(&self) -> TrackValue {
        self.sample(1.0)
    }
}

fn orbit_lerp(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let (from_len, to_len) = (from.length(), to.length());
    if from_len <= f32::EPSILON || to_len <= f32::EPSILON {
        return from.lerp(to, t);
    }
    let (from_dir, to_dir) = (from / from_len, to / to_len);
    let arc = Quat::from_rotation_arc(from_dir, to_dir);
    let dir = Quat::IDENTITY.slerp(arc, t) * from_dir;
    dir * (from_len + (to_len - from_len) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_sample() {
        let track = Track::Scale { from: 1.0, to: 2.0 };
        assert_eq!(track.sample(0.0), TrackValue::Scale(1.0));
        assert_eq!(track.sample(0.5), TrackValue::Scale(1.5));
        assert_eq!(track.end_value(), TrackValue::Scale(2.0));
    }

    #[test]
    fn test_camera_path_endpoints() {
        let from = Vec3::new(0.0, 0.0, 4.0);
        let to = Vec3::new(2.2, 0.0, 0.0);
        let track = Track::CameraPath { from, to };
        let TrackValue::Position(start) = track.sample(0.0) else {
            panic!("expected position");
        };
        let TrackValue::Position(end) = track.sample(1.0) else {
            panic!("expected position");
        };
        assert!((start - from).length() < 1e-4);
        assert!((end - to).length() < 1e-4);
    }

    #[test]
    fn test_camera_path_stays_outside_globe() {
        // diametrically opposite ends would pass through the origin if lerped
        let track = Track::CameraPath {
            from: Vec3::new(0.0, 0.0, 3.0),
            to: Vec3::new(0.0, 0.0, -3.0),
        };
        for i in 0..=20 {
            let TrackValue::Position(p) = track.sample(i as f32 / 20.0) else {
                panic!("expected position");
            };
            assert!((p.length() - 3.0).abs() < 1e-3, "step {i} at radius {}", p.length());
        }
    }

    #[test]
    fn test_camera_path_distance_is_linear() {
        let track = Track::CameraPath {
            from: Vec3::new(0.0, 4.0, 0.0),
            to: Vec3::new(0.0, 0.0, 2.0),
        };
        let TrackValue::Position(mid) = track.sample(0.5) else {
            panic!("expected position");
        };
        assert!((mid.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_reversed_and_restart() {
        let track = Track::Scale { from: 1.0, to: 1.08 };
        assert_eq!(track.reversed(), Track::Scale { from: 1.08, to: 1.0 });
        assert_eq!(
            track.reversed().starting_at(TrackValue::Scale(1.04)),
            Track::Scale { from: 1.04, to: 1.0 }
        );
        // mismatched kinds leave the track alone
        assert_eq!(track.starting_at(TrackValue::Position(Vec3::ONE)), track);
    }
}
