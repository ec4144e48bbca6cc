use std::any::Any;

use crate::depth::DepthBuffer;
use crate::pass::{FrameContext, Pass, PassIo, PassState};

/// Draws the scene over whatever the previous passes left in the target,
/// with its own reverse-Z depth buffer.
pub struct ScenePass {
    state: PassState,
    width: u32,
    height: u32,
    depth: Option<DepthBuffer>,
}

impl ScenePass {
    pub fn new() -> Self {
        Self {
            state: PassState::new(false),
            width: 1,
            height: 1,
            depth: None,
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ScenePass {
    fn label(&self) -> &'static str {
        "scene"
    }

    fn state(&self) -> &PassState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    fn render(&mut self, frame: &mut FrameContext<'_>, io: &PassIo<'_>) {
        let (width, height) = (self.width, self.height);
        let depth = match &mut self.depth {
            Some(depth) => {
                depth.ensure_size(frame.device, width, height);
                depth
            }
            None => self
                .depth
                .insert(DepthBuffer::new(frame.device, width, height)),
        };

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: io.in_place_target(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        frame.scene.draw_scene(&mut pass);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
