//! Starfield speed control.
//!
//! The loading sequence switches between three states: halt while idle,
//! hyper while bulk-fetching, cruise otherwise. Entering hyper eases the
//! speed toward a large target; entering halt or cruise snaps the speed.

/// Forward speed while halted.
pub const HALT_SPEED: f32 = 0.05;
/// Forward speed while cruising.
pub const CRUISE_SPEED: f32 = 0.35;
/// Target forward speed in hyper.
pub const HYPER_SPEED: f32 = 6.0;
/// Speed units per second while easing toward a target.
pub const ACCELERATION: f32 = 2.0;
/// Spin per second while halted.
pub const HALT_SPIN: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarfieldState {
    Halt,
    Cruise,
    Hyper,
}

/// Per-frame output of [`StarfieldStateMachine::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldMotion {
    /// Forward speed this frame.
    pub forward: f32,
    /// Rotation this frame. In halt this is already scaled by elapsed time.
    pub rotation: f32,
    /// Accumulated forward travel.
    pub travel: f32,
    /// Accumulated rotation angle in radians.
    pub spin: f32,
}

#[derive(Debug, Clone)]
pub struct StarfieldStateMachine {
    state: StarfieldState,
    speed: f32,
    target: Option<f32>,
    travel: f32,
    spin: f32,
}

impl StarfieldStateMachine {
    /// Starts halted.
    pub fn new() -> Self {
        Self {
            state: StarfieldState::Halt,
            speed: HALT_SPEED,
            target: None,
            travel: 0.0,
            spin: 0.0,
        }
    }

    pub fn state(&self) -> StarfieldState {
        self.state
    }

    /// Current forward speed factor.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed being eased toward, if a transition is in flight.
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    pub fn set_state(&mut self, state: StarfieldState) {
        if state != self.state {
            log::debug!("Starfield {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        match state {
            StarfieldState::Hyper => self.target = Some(HYPER_SPEED),
            StarfieldState::Halt => {
                self.speed = HALT_SPEED;
                self.target = None;
            }
            StarfieldState::Cruise => {
                self.speed = CRUISE_SPEED;
                self.target = None;
            }
        }
    }

    /// Ease the speed toward the target and accumulate travel and spin.
    pub fn tick(&mut self, dt: f32) -> StarfieldMotion {
        let dt = dt.max(0.0);
        if let Some(target) = self.target {
            let step = dt * ACCELERATION;
            let delta = target - self.speed;
            if delta.abs() <= step {
                self.speed = target;
                self.target = None;
            } else {
                self.speed += step.copysign(delta);
            }
        }

        let forward = self.speed;
        let (rotation, spin_step) = match self.state {
            StarfieldState::Halt => (HALT_SPIN * dt, HALT_SPIN * dt),
            StarfieldState::Cruise => (forward, forward * dt),
            StarfieldState::Hyper => (forward * 0.5, forward * 0.5 * dt),
        };
        self.travel = (self.travel + forward * dt).rem_euclid(1.0);
        self.spin = (self.spin + spin_step).rem_euclid(std::f32::consts::TAU);

        StarfieldMotion {
            forward,
            rotation,
            travel: self.travel,
            spin: self.spin,
        }
    }
}

impl Default for StarfieldStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
