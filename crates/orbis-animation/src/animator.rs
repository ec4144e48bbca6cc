//! The active animation list.
//!
//! Animations are registered as records under a key and started by key.
//! Each start returns an [`AnimationHandle`]. [`Animator::advance`] is called
//! once per frame: it samples every running animation and reports those that
//! reached their end together with their completion value, removing each one
//! exactly once. Completion values are plain data chosen by the caller, so
//! the owner decides what a finished animation means for its own state.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::easing::{Easing, Tween};
use crate::track::{Track, TrackValue};

/// Identifies one started animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

/// Which clip of a record to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A playable animation: track, timing and what finishing means.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip<C> {
    pub track: Track,
    pub duration: f32,
    pub easing: Easing,
    pub on_finish: C,
}

impl<C> Clip<C> {
    pub fn new(track: Track, duration: f32, easing: Easing, on_finish: C) -> Self {
        Self {
            track,
            duration,
            easing,
            on_finish,
        }
    }
}

/// Forward clip plus an optional explicit reverse for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRecord<K, C> {
    pub key: K,
    pub forward: Clip<C>,
    pub reverse: Option<Clip<C>>,
}

/// One sampled value produced during [`Animator::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<K> {
    pub handle: AnimationHandle,
    pub key: K,
    pub value: TrackValue,
}

/// An animation that reached its end during [`Animator::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finished<K, C> {
    pub handle: AnimationHandle,
    pub key: K,
    pub on_finish: C,
}

/// Everything one frame of animation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput<K, C> {
    pub samples: Vec<Sample<K>>,
    pub finished: Vec<Finished<K, C>>,
}

impl<K, C> Default for TickOutput<K, C> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            finished: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Active<K, C> {
    handle: AnimationHandle,
    key: K,
    track: Track,
    tween: Tween,
    on_finish: C,
    last_value: TrackValue,
}

/// Registered records and the list of running animations.
///
/// At most one animation runs per key. Starting a key that is already
/// running replaces it: the new animation begins from the old one's last
/// sampled value and the old completion is dropped without firing.
#[derive(Debug)]
pub struct Animator<K, C> {
    records: FxHashMap<K, AnimationRecord<K, C>>,
    active: Vec<Active<K, C>>,
    next_handle: u64,
}

impl<K, C> Default for Animator<K, C> {
    fn default() -> Self {
        Self {
            records: FxHashMap::default(),
            active: Vec::new(),
            next_handle: 0,
        }
    }
}

impl<K, C> Animator<K, C>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    C: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the record for `record.key`.
    pub fn register(&mut self, record: AnimationRecord<K, C>) {
        self.records.insert(record.key.clone(), record);
    }

    #[must_use]
    pub fn has_record(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }

    /// Start a registered record. Without an explicit reverse clip, reverse
    /// plays the forward track backwards with the forward completion.
    ///
    /// Returns `None` if no record exists for `key`.
    pub fn play(&mut self, key: &K, direction: Direction) -> Option<AnimationHandle> {
        let record = self.records.get(key)?;
        let clip = match (direction, &record.reverse) {
            (Direction::Forward, _) => record.forward.clone(),
            (Direction::Reverse, Some(reverse)) => reverse.clone(),
            (Direction::Reverse, None) => Clip {
                track: record.forward.track.reversed(),
                ..record.forward.clone()
            },
        };
        Some(self.play_clip(key.clone(), clip))
    }

    /// Start an unregistered clip under `key`.
    pub fn play_clip(&mut self, key: K, clip: Clip<C>) -> AnimationHandle {
        let mut track = clip.track;
        if let Some(index) = self.active.iter().position(|a| a.key == key) {
            let replaced = self.active.swap_remove(index);
            log::debug!("Animation {:?} on {:?} replaced", replaced.handle, key);
            track = track.starting_at(replaced.last_value);
        }

        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;
        self.active.push(Active {
            handle,
            key,
            track,
            tween: Tween::new(clip.duration, clip.easing),
            on_finish: clip.on_finish,
            last_value: track.sample(0.0),
        });
        handle
    }

    /// Remove a running animation without firing its completion.
    pub fn stop(&mut self, handle: AnimationHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.handle != handle);
        self.active.len() != before
    }

    #[must_use]
    pub fn is_active(&self, handle: AnimationHandle) -> bool {
        self.active.iter().any(|a| a.handle == handle)
    }

    /// Handle of the animation currently running for `key`.
    pub fn active_for(&self, key: &K) -> Option<AnimationHandle> {
        self.active.iter().find(|a| &a.key == key).map(|a| a.handle)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Advance every running animation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> TickOutput<K, C> {
        let mut output = TickOutput::default();
        for anim in &mut self.active {
            let t = anim.tween.advance(dt);
            anim.last_value = anim.track.sample(t);
            output.samples.push(Sample {
                handle: anim.handle,
                key: anim.key.clone(),
                value: anim.last_value,
            });
        }

        let mut index = 0;
        while index < self.active.len() {
            if self.active[index].tween.is_finished() {
                let done = self.active.remove(index);
                output.finished.push(Finished {
                    handle: done.handle,
                    key: done.key,
                    on_finish: done.on_finish,
                });
            } else {
                index += 1;
            }
        }
        output
    }
}
