//! Time-driven animation for the globe: eased tweens over mesh scale and
//! camera position, an active list addressed by handle, and the camera
//! dolly state that user zoom operates on.

pub mod animator;
pub mod dolly;
pub mod easing;
pub mod track;

pub use animator::{
    AnimationHandle, AnimationRecord, Animator, Clip, Direction, Finished, Sample, TickOutput,
};
pub use dolly::{DollyDirection, DollyState};
pub use easing::{Easing, Tween};
pub use track::{Track, TrackValue};
