use std::any::Any;

use bytemuck::{Pod, Zeroable};

use crate::fullscreen::{
    ADDITIVE_BLEND, create_effect_bind_group, create_effect_layout, create_fullscreen_pipeline,
    create_fullscreen_shader, create_linear_sampler, draw_fullscreen,
};
use crate::pass::{FrameContext, Pass, PassIo, PassState, begin_color_pass};

const OUTLINE_WGSL: &str = r#"
struct OutlineParams {
    color: vec3<f32>,
    thickness: f32,
    texel: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: OutlineParams;
@group(0) @binding(1) var source_tex: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

fn mask_at(uv: vec2<f32>) -> f32 {
    return textureSample(source_tex, source_sampler, uv).r;
}

@fragment
fn fs_edge(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let o = params.texel * params.thickness;
    let center = mask_at(in.uv);
    var neighbours = 0.0;
    neighbours = max(neighbours, mask_at(in.uv + vec2<f32>(o.x, 0.0)));
    neighbours = max(neighbours, mask_at(in.uv - vec2<f32>(o.x, 0.0)));
    neighbours = max(neighbours, mask_at(in.uv + vec2<f32>(0.0, o.y)));
    neighbours = max(neighbours, mask_at(in.uv - vec2<f32>(0.0, o.y)));
    neighbours = max(neighbours, mask_at(in.uv + o));
    neighbours = max(neighbours, mask_at(in.uv - o));
    neighbours = max(neighbours, mask_at(in.uv + vec2<f32>(o.x, -o.y)));
    neighbours = max(neighbours, mask_at(in.uv + vec2<f32>(-o.x, o.y)));
    let edge = clamp(neighbours - center, 0.0, 1.0);
    return vec4<f32>(params.color * edge, edge);
}

@fragment
fn fs_copy(in: FullscreenOutput) -> @location(0) vec4<f32> {
    return textureSample(source_tex, source_sampler, in.uv);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct OutlineParams {
    color: [f32; 3],
    thickness: f32,
    texel: [f32; 2],
    _pad: [f32; 2],
}

struct OutlineGpu {
    format: wgpu::TextureFormat,
    layout: wgpu::BindGroupLayout,
    edge_pipeline: wgpu::RenderPipeline,
    copy_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
    mask: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl OutlineGpu {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = create_effect_layout(
            device,
            "outline-layout",
            std::mem::size_of::<OutlineParams>() as u64,
            1,
        );
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("outline-pipeline-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });
        let shader = create_fullscreen_shader(device, "outline-shader", OUTLINE_WGSL);
        let edge_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &pipeline_layout,
            "fs_edge",
            format,
            Some(ADDITIVE_BLEND),
            "outline-edge-pipeline",
        );
        let copy_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &pipeline_layout,
            "fs_copy",
            format,
            None,
            "outline-copy-pipeline",
        );
        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("outline-params"),
            size: std::mem::size_of::<OutlineParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            format,
            layout,
            edge_pipeline,
            copy_pipeline,
            sampler: create_linear_sampler(device, "outline-sampler"),
            params,
            mask: None,
        }
    }

    fn ensure_mask(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let stale = self
            .mask
            .as_ref()
            .is_none_or(|(t, _)| t.width() != width || t.height() != height);
        if stale {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("outline-mask"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: OutlinePass::MASK_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            log::debug!("Allocated outline mask at {width}x{height}");
            self.mask = Some((texture, view));
        }
    }
}

/// Draws a coloured edge around the meshes the scene marks as outlined.
///
/// The outlined meshes are first rendered as a flat mask; an edge-detect
/// pass then adds the outline colour wherever a mask pixel borders an
/// unmasked one. Renders in place.
pub struct OutlinePass {
    state: PassState,
    color: [f32; 3],
    thickness: f32,
    width: u32,
    height: u32,
    gpu: Option<OutlineGpu>,
}

impl OutlinePass {
    /// Single-channel mask the scene draws outlined meshes into.
    pub const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

    /// `thickness` is the edge width in effective pixels.
    pub fn new(color: [f32; 3], thickness: f32) -> Self {
        Self {
            state: PassState::new(false),
            color,
            thickness: thickness.max(0.0),
            width: 1,
            height: 1,
            gpu: None,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness.max(0.0);
    }

    /// Size of one effective pixel in UV units.
    #[must_use]
    pub fn texel_size(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }

    fn params(&self) -> OutlineParams {
        OutlineParams {
            color: self.color,
            thickness: self.thickness,
            texel: self.texel_size(),
            _pad: [0.0; 2],
        }
    }
}

impl Pass for OutlinePass {
    fn label(&self) -> &'static str {
        "outline"
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
        let params = self.params();
        let (width, height) = (self.width, self.height);
        if self.gpu.as_ref().is_some_and(|g| g.format != io.format) {
            self.gpu = None;
        }
        let gpu = self
            .gpu
            .get_or_insert_with(|| OutlineGpu::new(frame.device, io.format));
        frame
            .queue
            .write_buffer(&gpu.params, 0, bytemuck::bytes_of(&params));

        // The last pass must leave the full image on screen, outline or not.
        if io.render_to_screen {
            let bind_group = create_effect_bind_group(
                frame.device,
                "outline-copy-bind-group",
                &gpu.layout,
                &gpu.params,
                &[io.read],
                &gpu.sampler,
            );
            draw_fullscreen(
                frame.encoder,
                "outline-copy",
                &gpu.copy_pipeline,
                &bind_group,
                io.screen,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            );
        }

        if !frame.scene.has_outlined() || self.thickness <= 0.0 {
            return;
        }

        gpu.ensure_mask(frame.device, width, height);
        let Some((_, mask)) = &gpu.mask else {
            return;
        };
        {
            let mut pass = begin_color_pass(
                frame.encoder,
                "outline-mask",
                mask,
                wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            );
            frame.scene.draw_outline_mask(&mut pass);
        }

        let bind_group = create_effect_bind_group(
            frame.device,
            "outline-edge-bind-group",
            &gpu.layout,
            &gpu.params,
            &[mask],
            &gpu.sampler,
        );
        draw_fullscreen(
            frame.encoder,
            "outline-edge",
            &gpu.edge_pipeline,
            &bind_group,
            io.in_place_target(),
            wgpu::LoadOp::Load,
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipelines_build() {
        let Some((device, _queue)) = crate::gpu::init_headless_blocking() else {
            return;
        };
        let mut gpu = OutlineGpu::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb);
        gpu.ensure_mask(&device, 64, 32);
        let (mask, _) = gpu.mask.as_ref().unwrap();
        assert_eq!((mask.width(), mask.height()), (64, 32));
        assert_eq!(mask.format(), OutlinePass::MASK_FORMAT);
    }

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<OutlineParams>(), 32);
    }

    #[test]
    fn test_negative_thickness_is_clamped() {
        let mut pass = OutlinePass::new([1.0, 1.0, 1.0], -3.0);
        assert_eq!(pass.thickness(), 0.0);
        pass.set_thickness(2.5);
        assert_eq!(pass.thickness(), 2.5);
    }

    #[test]
    fn test_params_carry_color_and_texel() {
        let mut pass = OutlinePass::new([0.2, 0.4, 0.6], 2.0);
        pass.set_size(400, 200);
        let params = pass.params();
        assert_eq!(params.color, [0.2, 0.4, 0.6]);
        assert_eq!(params.texel, [1.0 / 400.0, 1.0 / 200.0]);
    }
}
