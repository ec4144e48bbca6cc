use std::any::Any;

use bytemuck::{Pod, Zeroable};

use crate::fullscreen::{
    create_effect_bind_group, create_effect_layout, create_fullscreen_pipeline,
    create_fullscreen_shader, create_linear_sampler, draw_fullscreen,
};
use crate::pass::{FrameContext, Pass, PassIo, PassState};

const FXAA_WGSL: &str = r#"
struct FxaaParams {
    inverse_resolution: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: FxaaParams;
@group(0) @binding(1) var source_tex: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

const REDUCE_MIN: f32 = 1.0 / 128.0;
const REDUCE_MUL: f32 = 1.0 / 8.0;
const SPAN_MAX: f32 = 8.0;
const LUMA: vec3<f32> = vec3<f32>(0.299, 0.587, 0.114);

fn rgb_at(uv: vec2<f32>) -> vec3<f32> {
    return textureSample(source_tex, source_sampler, uv).rgb;
}

@fragment
fn fs_fxaa(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let rcp = params.inverse_resolution;
    let centre = textureSample(source_tex, source_sampler, in.uv);

    let luma_nw = dot(rgb_at(in.uv + vec2<f32>(-1.0, -1.0) * rcp), LUMA);
    let luma_ne = dot(rgb_at(in.uv + vec2<f32>(1.0, -1.0) * rcp), LUMA);
    let luma_sw = dot(rgb_at(in.uv + vec2<f32>(-1.0, 1.0) * rcp), LUMA);
    let luma_se = dot(rgb_at(in.uv + vec2<f32>(1.0, 1.0) * rcp), LUMA);
    let luma_m = dot(centre.rgb, LUMA);

    let luma_min = min(luma_m, min(min(luma_nw, luma_ne), min(luma_sw, luma_se)));
    let luma_max = max(luma_m, max(max(luma_nw, luma_ne), max(luma_sw, luma_se)));

    var dir = vec2<f32>(
        -((luma_nw + luma_ne) - (luma_sw + luma_se)),
        (luma_nw + luma_sw) - (luma_ne + luma_se),
    );
    let dir_reduce = max((luma_nw + luma_ne + luma_sw + luma_se) * 0.25 * REDUCE_MUL, REDUCE_MIN);
    let rcp_dir_min = 1.0 / (min(abs(dir.x), abs(dir.y)) + dir_reduce);
    dir = clamp(dir * rcp_dir_min, vec2<f32>(-SPAN_MAX), vec2<f32>(SPAN_MAX)) * rcp;

    let rgb_a = 0.5 * (
        rgb_at(in.uv + dir * (1.0 / 3.0 - 0.5)) +
        rgb_at(in.uv + dir * (2.0 / 3.0 - 0.5))
    );
    let rgb_b = rgb_a * 0.5 + 0.25 * (
        rgb_at(in.uv + dir * -0.5) +
        rgb_at(in.uv + dir * 0.5)
    );
    let luma_b = dot(rgb_b, LUMA);
    let outside = luma_b < luma_min || luma_b > luma_max;
    return vec4<f32>(select(rgb_b, rgb_a, outside), centre.a);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct FxaaParams {
    inverse_resolution: [f32; 2],
    _pad: [f32; 2],
}

struct FxaaGpu {
    format: wgpu::TextureFormat,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
}

impl FxaaGpu {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = create_effect_layout(
            device,
            "fxaa-layout",
            std::mem::size_of::<FxaaParams>() as u64,
            1,
        );
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fxaa-pipeline-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });
        let shader = create_fullscreen_shader(device, "fxaa-shader", FXAA_WGSL);
        let pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &pipeline_layout,
            "fs_fxaa",
            format,
            None,
            "fxaa-pipeline",
        );
        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fxaa-params"),
            size: std::mem::size_of::<FxaaParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            format,
            layout,
            pipeline,
            sampler: create_linear_sampler(device, "fxaa-sampler"),
            params,
        }
    }
}

/// Fast approximate anti-aliasing over the composed image. Reads the
/// current target and writes the other one, so it swaps.
pub struct FxaaPass {
    state: PassState,
    width: u32,
    height: u32,
    gpu: Option<FxaaGpu>,
}

impl FxaaPass {
    pub fn new() -> Self {
        Self {
            state: PassState::new(true),
            width: 1,
            height: 1,
            gpu: None,
        }
    }

    /// One over the effective render size, per axis.
    #[must_use]
    pub fn inverse_resolution(&self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }
}

impl Default for FxaaPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for FxaaPass {
    fn label(&self) -> &'static str {
        "fxaa"
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
        let params = FxaaParams {
            inverse_resolution: self.inverse_resolution(),
            _pad: [0.0; 2],
        };
        if self.gpu.as_ref().is_some_and(|g| g.format != io.format) {
            self.gpu = None;
        }
        let gpu = self
            .gpu
            .get_or_insert_with(|| FxaaGpu::new(frame.device, io.format));
        frame
            .queue
            .write_buffer(&gpu.params, 0, bytemuck::bytes_of(&params));

        let bind_group = create_effect_bind_group(
            frame.device,
            "fxaa-bind-group",
            &gpu.layout,
            &gpu.params,
            &[io.read],
            &gpu.sampler,
        );
        draw_fullscreen(
            frame.encoder,
            "fxaa",
            &gpu.pipeline,
            &bind_group,
            io.output_target(),
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
    use crate::gpu::init_headless_blocking;

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<FxaaParams>(), 16);
    }

    #[test]
    fn test_shader_compiles() {
        let Some((device, _queue)) = init_headless_blocking() else {
            return;
        };
        let _gpu = FxaaGpu::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb);
    }
}
