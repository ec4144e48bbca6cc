use std::any::Any;

use crate::pass::{FrameContext, Pass, PassIo, PassState, begin_color_pass};

/// Fills the current target with a solid colour.
pub struct ClearPass {
    state: PassState,
    color: [f32; 4],
}

impl ClearPass {
    pub fn new(color: [f32; 4]) -> Self {
        Self {
            state: PassState::new(false),
            color,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }
}

impl Pass for ClearPass {
    fn label(&self) -> &'static str {
        "clear"
    }

    fn state(&self) -> &PassState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }

    fn set_size(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, frame: &mut FrameContext<'_>, io: &PassIo<'_>) {
        let [r, g, b, a] = self.color.map(f64::from);
        let _pass = begin_color_pass(
            frame.encoder,
            "clear-pass",
            io.in_place_target(),
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
