//! Space background: the starfield speed state machine and the procedural
//! starfield pass it drives.

pub mod pass;
pub mod starfield;

pub use pass::{STARFIELD_SHADER_SOURCE, StarfieldPass, StarfieldUniform};
pub use starfield::{
    ACCELERATION, CRUISE_SPEED, HALT_SPEED, HALT_SPIN, HYPER_SPEED, StarfieldMotion,
    StarfieldState, StarfieldStateMachine,
};
