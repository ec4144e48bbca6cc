//! wgpu rendering for the globe: GPU context, surface sizing, the orbit
//! camera, and the multi-pass compositor with its generic passes.

pub mod camera;
pub mod compositor;
pub mod depth;
pub mod fullscreen;
pub mod gpu;
pub mod pass;
pub mod passes;
pub mod surface;
pub mod target;

pub use camera::{CameraUniform, OrbitCamera, Ray};
pub use compositor::Compositor;
pub use depth::DepthBuffer;
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, device_class, init_headless_blocking,
    init_render_context_blocking,
};
pub use pass::{FrameContext, Pass, PassIo, PassState, SceneDraw};
pub use passes::{ClearPass, FxaaPass, OutlinePass, ScenePass};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
pub use target::{PingPong, RenderTarget};
