//! Pointer, wheel and touch handling for the globe: raw events normalized
//! into [`PointerEvent`]s and turned into hover/select/dolly/orbit intents.

pub mod controller;
pub mod pointer;

pub use controller::{
    DesktopCapabilities, InputCapabilities, Intent, InteractionController, Picker,
    resolve_touch_mode,
};
pub use pointer::{PointerEvent, PointerId, PointerKind, WinitPointerAdapter};
