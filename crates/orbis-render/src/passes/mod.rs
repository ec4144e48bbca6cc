//! The generic passes of the compositor chain. The starfield background
//! lives with the rest of the space rendering in `orbis-space`.

mod clear;
mod fxaa;
mod outline;
mod scene;

pub use clear::ClearPass;
pub use fxaa::FxaaPass;
pub use outline::OutlinePass;
pub use scene::ScenePass;
