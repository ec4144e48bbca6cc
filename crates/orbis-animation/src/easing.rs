//! Easing curves and the tween time driver.

/// Easing curve mapping linear progress `t ∈ [0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    CubicInOut,
    SineInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// One-shot time driver: accumulates elapsed time and clamps at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    /// A non-positive duration finishes on the first advance.
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt` seconds and return the eased progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.progress()
    }

    /// Eased progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.easing.apply(self.elapsed / self.duration)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::QuadOut,
        Easing::CubicInOut,
        Easing::SineInOut,
    ];

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v >= prev - 1e-6, "{easing:?} decreased at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::QuadOut.apply(-3.0), 0.0);
        assert_eq!(Easing::QuadOut.apply(7.0), 1.0);
    }

    #[test]
    fn test_tween_finishes_and_clamps() {
        let mut tween = Tween::new(1.0, Easing::Linear);
        assert!((tween.advance(0.25) - 0.25).abs() < 1e-6);
        assert!(!tween.is_finished());
        assert_eq!(tween.advance(5.0), 1.0);
        assert!(tween.is_finished());
        assert_eq!(tween.advance(1.0), 1.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut tween = Tween::new(0.0, Easing::CubicInOut);
        assert_eq!(tween.advance(0.0), 1.0);
        assert!(tween.is_finished());
    }
}
