//! Redraw pacing by quality tier.
//!
//! A frame is due once a full interval has passed since the last one. The
//! part of the elapsed time past the last whole interval carries over, so
//! the average rate stays on target even when redraws arrive late.

use std::time::{Duration, Instant};

/// Longest step handed to the simulation, in seconds. Longer gaps (a
/// dragged window, a debugger pause) are clamped.
pub const MAX_FRAME_TIME: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: Duration,
    last: Instant,
}

impl FrameLimiter {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        Self {
            interval: interval_for(target_fps),
            last: now,
        }
    }

    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.interval = interval_for(target_fps);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next frame becomes due.
    pub fn next_deadline(&self) -> Instant {
        self.last + self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) >= self.interval
    }

    /// Consume a due frame, returning its time step in seconds.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed < self.interval {
            return None;
        }
        let remainder = Duration::from_nanos(
            (elapsed.as_nanos() % self.interval.as_nanos().max(1)) as u64,
        );
        self.last = now.checked_sub(remainder).unwrap_or(now);
        let step = (elapsed - remainder).as_secs_f32();
        if step > MAX_FRAME_TIME {
            tracing::warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                step * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
        }
        Some(step.min(MAX_FRAME_TIME))
    }
}

fn interval_for(target_fps: u32) -> Duration {
    Duration::from_secs(1) / target_fps.max(1)
}
