//! GPU side of the globe scene: one vertex buffer and model uniform per
//! mesh, one bind group per material, and the scene and outline-mask
//! pipelines. Implements [`SceneDraw`] for the compositor's scene-aware
//! passes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orbis_mesh::GLOBE_VERTEX_LAYOUT;
use orbis_render::{CameraUniform, DepthBuffer, OrbitCamera, OutlinePass, SceneDraw};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::material::{MaterialId, TextureSource, load_texture};
use crate::scene::{GlobeScene, MeshId};

pub const GLOBE_SHADER_SOURCE: &str = include_str!("globe.wgsl");

/// Colour of the base sphere.
pub const OCEAN_COLOR: [f32; 3] = [0.03, 0.07, 0.16];

/// Per-mesh uniform (group 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: 1 when textured.
    pub params: [f32; 4],
}

impl MeshUniform {
    pub fn new(scale: f32, color: [f32; 3], textured: bool) -> Self {
        Self {
            model: Mat4::from_scale(Vec3::splat(scale)).to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
            params: [if textured { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    bind_group: wgpu::BindGroup,
    textured: bool,
}

pub struct GlobeRenderer {
    scene_pipeline: wgpu::RenderPipeline,
    mask_pipeline: wgpu::RenderPipeline,
    mesh_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    /// 1×1 white texture for untextured materials and the base sphere.
    fallback: wgpu::BindGroup,
    meshes: FxHashMap<MeshId, GpuMesh>,
    materials: FxHashMap<MaterialId, GpuMaterial>,
    draw_list: Vec<(MeshId, Option<MaterialId>)>,
    outline_list: Vec<MeshId>,
}

impl GlobeRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: wgpu::ShaderSource::Wgsl(GLOBE_SHADER_SOURCE.into()),
        });

        let camera_layout = uniform_layout(
            device,
            "globe-camera-bgl",
            std::mem::size_of::<CameraUniform>() as u64,
        );
        let mesh_layout = uniform_layout(
            device,
            "globe-mesh-bgl",
            std::mem::size_of::<MeshUniform>() as u64,
        );
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-material-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe-scene-layout"),
            bind_group_layouts: &[&camera_layout, &mesh_layout, &material_layout],
            immediate_size: 0,
        });
        let mask_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe-mask-layout"),
            bind_group_layouts: &[&camera_layout, &mesh_layout],
            immediate_size: 0,
        });

        let scene_pipeline = create_mesh_pipeline(
            device,
            &shader,
            &scene_layout,
            "fs_main",
            color_format,
            Some(DepthBuffer::stencil_state(true)),
            "globe-scene-pipeline",
        );
        let mask_pipeline = create_mesh_pipeline(
            device,
            &shader,
            &mask_layout,
            "fs_mask",
            OutlinePass::MASK_FORMAT,
            None,
            "globe-mask-pipeline",
        );

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe-camera-uniform"),
            contents: bytemuck::cast_slice(&[OrbitCamera::default().to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-camera-bg"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("globe-material-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let fallback = texture_bind_group(
            device,
            queue,
            &material_layout,
            &sampler,
            &white,
            "globe-fallback-texture",
        );

        Self {
            scene_pipeline,
            mask_pipeline,
            mesh_layout,
            material_layout,
            camera_buffer,
            camera_bind_group,
            sampler,
            fallback,
            meshes: FxHashMap::default(),
            materials: FxHashMap::default(),
            draw_list: Vec::new(),
            outline_list: Vec::new(),
        }
    }

    /// Meshes with GPU buffers.
    pub fn uploaded_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Materials that ended up with a texture rather than a palette colour.
    pub fn textured_material_count(&self) -> usize {
        self.materials.values().filter(|m| m.textured).count()
    }

    /// Sync GPU state with `scene` and `camera`. Buffers and textures are
    /// created the first time a mesh or material is seen; a texture that
    /// fails to load leaves the material on its palette colour.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &GlobeScene,
        camera: &OrbitCamera,
        textures: &dyn TextureSource,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform()]),
        );

        self.draw_list.clear();
        for (id, mesh) in scene.meshes() {
            if let Some(material) = mesh.material
                && !self.materials.contains_key(&material)
            {
                let gpu = self.load_material(device, queue, scene, material, textures);
                self.materials.insert(material, gpu);
            }

            if !self.meshes.contains_key(&id) {
                let vertices = mesh.geometry.to_vertices();
                if vertices.is_empty() {
                    continue;
                }
                let gpu = self.upload_mesh(device, id, &vertices);
                self.meshes.insert(id, gpu);
            }

            let (color, textured) = match mesh.material {
                Some(material) => (
                    scene
                        .materials()
                        .get(material)
                        .map_or(OCEAN_COLOR, |m| m.color),
                    self.materials.get(&material).is_some_and(|m| m.textured),
                ),
                None => (OCEAN_COLOR, false),
            };
            if let Some(gpu) = self.meshes.get(&id) {
                let uniform = MeshUniform::new(mesh.scale, color, textured);
                queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
            if mesh.visible {
                self.draw_list.push((id, mesh.material));
            }
        }

        self.outline_list.clear();
        self.outline_list.extend(
            scene
                .outlined_meshes()
                .filter(|id| self.meshes.contains_key(id)),
        );
    }

    fn upload_mesh(
        &self,
        device: &wgpu::Device,
        id: MeshId,
        vertices: &[orbis_mesh::GlobeVertex],
    ) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe-mesh-vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe-mesh-uniform"),
            contents: bytemuck::cast_slice(&[MeshUniform::new(1.0, OCEAN_COLOR, false)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-mesh-bg"),
            layout: &self.mesh_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        tracing::trace!(mesh = id.0, vertices = vertices.len(), "Uploaded mesh");
        GpuMesh {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    fn load_material(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &GlobeScene,
        id: MaterialId,
        textures: &dyn TextureSource,
    ) -> GpuMaterial {
        let palette = || GpuMaterial {
            bind_group: self.fallback.clone(),
            textured: false,
        };
        let Some(url) = scene.materials().get(id).and_then(|m| m.image_url()) else {
            return palette();
        };
        match load_texture(textures, url) {
            Ok(image) => {
                let bind_group = texture_bind_group(
                    device,
                    queue,
                    &self.material_layout,
                    &self.sampler,
                    &image,
                    "globe-material-texture",
                );
                tracing::debug!(
                    url,
                    width = image.width(),
                    height = image.height(),
                    "Loaded material texture"
                );
                GpuMaterial {
                    bind_group,
                    textured: true,
                }
            }
            Err(err) => {
                tracing::warn!(
                    url,
                    error = %err,
                    "Material texture unavailable, using palette colour"
                );
                palette()
            }
        }
    }
}

impl SceneDraw for GlobeRenderer {
    fn draw_scene(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.scene_pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for (id, material) in &self.draw_list {
            let Some(gpu) = self.meshes.get(id) else {
                continue;
            };
            let material = material
                .and_then(|m| self.materials.get(&m))
                .map_or(&self.fallback, |m| &m.bind_group);
            pass.set_bind_group(1, &gpu.bind_group, &[]);
            pass.set_bind_group(2, material, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.draw(0..gpu.vertex_count, 0..1);
        }
    }

    fn draw_outline_mask(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.mask_pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for id in &self.outline_list {
            let Some(gpu) = self.meshes.get(id) else {
                continue;
            };
            pass.set_bind_group(1, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.draw(0..gpu.vertex_count, 0..1);
        }
    }

    fn has_outlined(&self) -> bool {
        !self.outline_list.is_empty()
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, size: u64) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &image::RgbaImage,
    label: &str,
) -> wgpu::BindGroup {
    let texture = device.create_texture_with_data(
        queue,
        &texture_descriptor(image, label),
        wgpu::util::TextureDataOrder::LayerMajor,
        image.as_raw(),
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn texture_descriptor<'a>(image: &image::RgbaImage, label: &'a str) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
    depth_stencil: Option<wgpu::DepthStencilState>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[GLOBE_VERTEX_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        // Country shells are open surfaces seen from both sides.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
