//! The pass abstraction the compositor drives.
//!
//! A pass renders either in place into the current read target (clear,
//! background, scene, outline) or from the read target into the write target
//! (full-screen effects). `render_to_screen` redirects whichever target it
//! would write to the swapchain view. The compositor sets it only on the
//! last enabled pass.

use std::any::Any;

/// Flags every pass carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassState {
    pub enabled: bool,
    /// Swap read/write targets after this pass renders.
    pub needs_swap: bool,
    /// Write to the screen instead of an off-screen target.
    pub render_to_screen: bool,
}

impl PassState {
    pub fn new(needs_swap: bool) -> Self {
        Self {
            enabled: true,
            needs_swap,
            render_to_screen: false,
        }
    }
}

/// Scene content that scene-aware passes draw. Implemented by the globe
/// renderer; pipelines it binds must target the pass's colour format and,
/// for [`draw_scene`](Self::draw_scene), [`DepthBuffer::FORMAT`](crate::DepthBuffer::FORMAT).
pub trait SceneDraw {
    /// Draw every visible mesh.
    fn draw_scene(&self, pass: &mut wgpu::RenderPass<'_>);

    /// Draw the outlined meshes as a flat mask into a
    /// [`OutlinePass::MASK_FORMAT`](crate::OutlinePass::MASK_FORMAT) target.
    fn draw_outline_mask(&self, pass: &mut wgpu::RenderPass<'_>);

    /// Whether anything is currently outlined.
    fn has_outlined(&self) -> bool;
}

/// Per-frame GPU handles shared by every pass.
pub struct FrameContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub scene: &'a dyn SceneDraw,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

/// The targets a pass may touch this frame.
pub struct PassIo<'a> {
    /// Colour format of every target, screen included.
    pub format: wgpu::TextureFormat,
    pub read: &'a wgpu::TextureView,
    pub write: &'a wgpu::TextureView,
    pub screen: &'a wgpu::TextureView,
    pub render_to_screen: bool,
}

impl<'a> PassIo<'a> {
    /// Destination for passes that draw on top of the read target.
    pub fn in_place_target(&self) -> &'a wgpu::TextureView {
        if self.render_to_screen {
            self.screen
        } else {
            self.read
        }
    }

    /// Destination for passes that sample the read target.
    pub fn output_target(&self) -> &'a wgpu::TextureView {
        if self.render_to_screen {
            self.screen
        } else {
            self.write
        }
    }
}

/// One stage of the compositor chain.
pub trait Pass: Any {
    /// Name used for lookup and GPU debug labels.
    fn label(&self) -> &'static str;

    fn state(&self) -> &PassState;

    fn state_mut(&mut self) -> &mut PassState;

    /// New effective (pixel-ratio-scaled) size. Size-dependent GPU resources
    /// are rebuilt on the next render.
    fn set_size(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &mut FrameContext<'_>, io: &PassIo<'_>);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Record a single-attachment render pass.
pub fn begin_color_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
