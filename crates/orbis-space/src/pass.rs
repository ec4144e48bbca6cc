//! Procedural starfield drawn as a full-screen triangle behind the globe.
//!
//! Stars live in a grid of cells per layer; each layer is scaled by its depth
//! so that advancing the travel phase streams layers toward the viewer.

use std::any::Any;

use bytemuck::{Pod, Zeroable};
use orbis_config::Quality;
use orbis_render::fullscreen::{
    ADDITIVE_BLEND, create_fullscreen_pipeline, create_fullscreen_shader, draw_fullscreen,
};
use orbis_render::{FrameContext, Pass, PassIo, PassState};

use crate::starfield::StarfieldMotion;

/// Uniform buffer for the starfield pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StarfieldUniform {
    /// Effective render size in pixels.
    pub resolution: [f32; 2],
    /// Forward travel phase in `[0, 1)`.
    pub travel: f32,
    /// Rotation of the whole field in radians.
    pub spin: f32,
    pub layers: u32,
    pub _pad: [u32; 3],
}

/// Fragment stage of the starfield; paired with the full-screen vertex stage.
pub const STARFIELD_SHADER_SOURCE: &str = r#"
struct StarfieldUniform {
    resolution: vec2<f32>,
    travel: f32,
    spin: f32,
    layers: u32,
};

@group(0) @binding(0)
var<uniform> starfield: StarfieldUniform;

fn hash21(p: vec2<f32>) -> f32 {
    var q = fract(p * vec2<f32>(123.34, 456.21));
    q += dot(q, q + 45.32);
    return fract(q.x * q.y);
}

fn rotation(angle: f32) -> mat2x2<f32> {
    let c = cos(angle);
    let s = sin(angle);
    return mat2x2<f32>(c, -s, s, c);
}

fn star_layer(uv: vec2<f32>) -> vec3<f32> {
    let cell = floor(uv);
    let local = fract(uv) - 0.5;
    let n = hash21(cell);
    let offset = vec2<f32>(n, fract(n * 34.0)) - 0.5;
    let d = length(local - offset * 0.8);
    let size = fract(n * 345.32);
    let glow = 0.02 / max(d, 1e-3) * smoothstep(0.5, 0.1, d);
    let flare = smoothstep(0.9, 1.0, size);
    let tint = sin(vec3<f32>(0.2, 0.3, 0.9) * fract(n * 2345.2) * 123.2) * 0.5 + 0.5;
    return tint * glow * (size * 0.6 + flare * 0.4);
}

@fragment
fn fs_starfield(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let aspect = starfield.resolution.x / max(starfield.resolution.y, 1.0);
    let uv = rotation(starfield.spin) * ((in.uv - 0.5) * vec2<f32>(aspect, 1.0));

    let count = max(starfield.layers, 1u);
    var color = vec3<f32>(0.0);
    for (var i = 0u; i < count; i = i + 1u) {
        let depth = fract(f32(i) / f32(count) + starfield.travel);
        let scale = mix(20.0, 0.5, depth);
        let fade = depth * smoothstep(1.0, 0.9, depth);
        color += star_layer(uv * scale + f32(i) * 453.2) * fade;
    }
    return vec4<f32>(color, 0.0);
}
"#;

struct StarfieldGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl StarfieldGpu {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<StarfieldUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });
        let shader = create_fullscreen_shader(device, "starfield-shader", STARFIELD_SHADER_SOURCE);
        let pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &pipeline_layout,
            "fs_starfield",
            format,
            Some(ADDITIVE_BLEND),
            "starfield-pipeline",
        );
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("starfield-uniform"),
            size: std::mem::size_of::<StarfieldUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield-bind-group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            format,
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }
}

/// Adds the starfield on top of the cleared background. Renders in place.
pub struct StarfieldPass {
    state: PassState,
    uniform: StarfieldUniform,
    gpu: Option<StarfieldGpu>,
}

impl StarfieldPass {
    pub fn new(layers: u32) -> Self {
        Self {
            state: PassState::new(false),
            uniform: StarfieldUniform {
                resolution: [1.0, 1.0],
                travel: 0.0,
                spin: 0.0,
                layers: layers.max(1),
                _pad: [0; 3],
            },
            gpu: None,
        }
    }

    /// Pass configured for `quality`: disabled on the lowest tier.
    pub fn for_quality(quality: Quality) -> Self {
        let mut pass = Self::new(quality.starfield_layers());
        pass.apply_quality(quality);
        pass
    }

    pub fn apply_quality(&mut self, quality: Quality) {
        self.state.enabled = quality.starfield_enabled();
        if quality.starfield_enabled() {
            self.uniform.layers = quality.starfield_layers().max(1);
        }
        log::info!(
            "Starfield {} ({} layers) for {} quality",
            if self.state.enabled { "enabled" } else { "disabled" },
            self.uniform.layers,
            quality.label()
        );
    }

    pub fn layers(&self) -> u32 {
        self.uniform.layers
    }

    /// Feed this frame's travel and spin phases.
    pub fn set_motion(&mut self, motion: &StarfieldMotion) {
        self.uniform.travel = motion.travel;
        self.uniform.spin = motion.spin;
    }

    pub fn uniform(&self) -> &StarfieldUniform {
        &self.uniform
    }
}

impl Pass for StarfieldPass {
    fn label(&self) -> &'static str {
        "starfield"
    }

    fn state(&self) -> &PassState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PassState {
        &mut self.state
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.uniform.resolution = [width.max(1) as f32, height.max(1) as f32];
    }

    fn render(&mut self, frame: &mut FrameContext<'_>, io: &PassIo<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format != io.format) {
            self.gpu = None;
        }
        let gpu = self
            .gpu
            .get_or_insert_with(|| StarfieldGpu::new(frame.device, io.format));
        frame
            .queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&self.uniform));

        draw_fullscreen(
            frame.encoder,
            "starfield-pass",
            &gpu.pipeline,
            &gpu.bind_group,
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
    use crate::starfield::{StarfieldState, StarfieldStateMachine};
    use orbis_render::init_headless_blocking;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<StarfieldUniform>(), 32);
    }

    #[test]
    fn test_quality_controls_layers_and_enable() {
        let pass = StarfieldPass::for_quality(Quality::High);
        assert!(pass.state().enabled);
        assert_eq!(pass.layers(), 6);

        let pass = StarfieldPass::for_quality(Quality::Low);
        assert_eq!(pass.layers(), 2);

        let mut pass = StarfieldPass::for_quality(Quality::UltraLow);
        assert!(!pass.state().enabled);
        pass.apply_quality(Quality::Mid);
        assert!(pass.state().enabled);
        assert_eq!(pass.layers(), 4);
    }

    #[test]
    fn test_motion_and_size_reach_uniform() {
        let mut pass = StarfieldPass::new(4);
        pass.set_size(1200, 800);
        let mut sm = StarfieldStateMachine::new();
        sm.set_state(StarfieldState::Cruise);
        let motion = sm.tick(0.5);
        pass.set_motion(&motion);

        let uniform = pass.uniform();
        assert_eq!(uniform.resolution, [1200.0, 800.0]);
        assert_eq!(uniform.travel, motion.travel);
        assert_eq!(uniform.spin, motion.spin);
        assert!(!pass.state().needs_swap);
    }

    #[test]
    fn test_resize_reaches_full_globe_chain() {
        use orbis_render::{ClearPass, Compositor, FxaaPass, OutlinePass, ScenePass};

        let mut compositor = Compositor::new(wgpu::TextureFormat::Bgra8UnormSrgb, 800, 600, 1.0);
        compositor.add_pass(Box::new(ClearPass::new([0.0, 0.0, 0.0, 1.0])));
        compositor.add_pass(Box::new(StarfieldPass::for_quality(Quality::High)));
        compositor.add_pass(Box::new(ScenePass::new()));
        compositor.add_pass(Box::new(OutlinePass::new([1.0, 1.0, 1.0], 2.0)));
        compositor.add_pass(Box::new(FxaaPass::new()));
        assert_eq!(
            compositor.pass_labels().collect::<Vec<_>>(),
            ["clear", "starfield", "scene", "outline", "fxaa"]
        );
        assert_eq!(
            compositor.pass_ref::<StarfieldPass>().unwrap().uniform().resolution,
            [800.0, 600.0]
        );

        compositor.set_size(1200, 800);

        assert_eq!(compositor.targets().read.size(), (1200, 800));
        assert_eq!(compositor.targets().write.size(), (1200, 800));
        assert_eq!(
            compositor.pass_ref::<StarfieldPass>().unwrap().uniform().resolution,
            [1200.0, 800.0]
        );
        assert_eq!(compositor.pass_ref::<ScenePass>().unwrap().size(), (1200, 800));
        assert_eq!(
            compositor.pass_ref::<OutlinePass>().unwrap().texel_size(),
            [1.0 / 1200.0, 1.0 / 800.0]
        );
        assert_eq!(
            compositor.pass_ref::<FxaaPass>().unwrap().inverse_resolution(),
            [1.0 / 1200.0, 1.0 / 800.0]
        );
    }

    #[test]
    fn test_pipeline_builds() {
        let Some((device, _queue)) = init_headless_blocking() else {
            return;
        };
        let _gpu = StarfieldGpu::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb);
    }
}
