//! Lit, textured 3D mesh rendering with depth testing.
//!
//! # Bind groups
//!
//! - **Group 0**: scene uniforms (view-projection, camera position, scene-wide lights)
//! - **Group 1**: per-draw model uniforms, one 256-byte slot per draw selected
//!   with a dynamic offset
//! - **Group 2**: surface texture and sampler
//!
//! # Draw order
//!
//! Opaque draws go first with depth writes on. Transparent draws follow,
//! depth-tested but not written, so the orbit indicators and the planet ring
//! blend over whatever lies behind them. They are sorted back to front by
//! the distance from the eye to the nearest point of each shape, since the
//! concentric orbit rings all share the origin as their position.
//!
//! Pipelines are keyed by which faces are drawn ([`Side`]) and whether the
//! draw is transparent.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::draw2d::Color;
use crate::ecs::{Material, Shape, Side};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform, Vertex3d};
use crate::texture::Texture;

/// Scene-wide point lights the shader accepts.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Draws the model buffer can hold per frame.
const MAX_DRAWS: usize = 64;

/// Point light packed for the GPU: `position.xyz, range` and `color * intensity`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position_range: [f32; 4],
    pub color: [f32; 4],
}

impl PointLightRaw {
    pub fn new(position: Vec3, color: Color, intensity: f32, range: f32) -> Self {
        Self {
            position_range: position.extend(range).to_array(),
            color: scaled(color, intensity),
        }
    }
}

fn scaled(color: Color, intensity: f32) -> [f32; 4] {
    [
        color.r * intensity,
        color.g * intensity,
        color.b * intensity,
        1.0,
    ]
}

/// Lights that reach every lit surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLights {
    pub ambient: [f32; 4],
    pub hemisphere_sky: [f32; 4],
    pub hemisphere_ground: [f32; 4],
    pub points: Vec<PointLightRaw>,
}

impl SceneLights {
    pub fn add_ambient(&mut self, color: Color, intensity: f32) {
        add(&mut self.ambient, scaled(color, intensity));
    }

    pub fn add_hemisphere(&mut self, sky: Color, ground: Color, intensity: f32) {
        add(&mut self.hemisphere_sky, scaled(sky, intensity));
        add(&mut self.hemisphere_ground, scaled(ground, intensity));
    }

    /// Extra point lights past [`MAX_POINT_LIGHTS`] are dropped.
    pub fn add_point(&mut self, light: PointLightRaw) {
        if self.points.len() < MAX_POINT_LIGHTS {
            self.points.push(light);
        } else {
            tracing::warn!("Point light limit reached, ignoring light");
        }
    }
}

/// Lights bound to a single body, applied only when drawing that body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalLights {
    pub hemisphere_sky: [f32; 4],
    pub hemisphere_ground: [f32; 4],
    pub point: Option<PointLightRaw>,
}

impl LocalLights {
    pub fn add_hemisphere(&mut self, sky: Color, ground: Color, intensity: f32) {
        add(&mut self.hemisphere_sky, scaled(sky, intensity));
        add(&mut self.hemisphere_ground, scaled(ground, intensity));
    }
}

fn add(acc: &mut [f32; 4], value: [f32; 4]) {
    for i in 0..3 {
        acc[i] += value[i];
    }
    acc[3] = 1.0;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    hemisphere_sky: [f32; 4],
    hemisphere_ground: [f32; 4],
    point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    point_count: [u32; 4],
}

/// Per-draw uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// `emissive * intensity`.
    pub emissive: [f32; 4],
    pub local_sky: [f32; 4],
    pub local_ground: [f32; 4],
    pub local_point: PointLightRaw,
    /// `x`: opacity, `y`: 1 if lit, `z`: 1 if `local_point` is active.
    pub params: [f32; 4],
}

impl ModelUniforms {
    pub fn new(transform: &Transform, material: &Material, lights: &LocalLights) -> Self {
        let model = transform.matrix();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: material.color.to_array(),
            emissive: scaled(material.emissive, material.emissive_intensity),
            local_sky: lights.hemisphere_sky,
            local_ground: lights.hemisphere_ground,
            local_point: lights.point.unwrap_or_default(),
            params: [
                material.opacity,
                if material.lit { 1.0 } else { 0.0 },
                if lights.point.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// One mesh to draw this frame.
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    /// Shape the mesh was built from, used to sort transparent draws.
    pub shape: Shape,
    pub transform: Transform,
    pub material: &'a Material,
    /// Bind group from [`MeshPass::create_texture_bind_group`].
    pub texture: &'a wgpu::BindGroup,
    pub lights: LocalLights,
}

/// Indices of `calls` in render order: opaque first, then transparent
/// from farthest to nearest `eye`.
pub fn draw_order(calls: &[DrawCall], eye: Vec3) -> Vec<usize> {
    draw_order_by(calls.iter().map(|c| {
        (
            c.material.is_transparent(),
            surface_distance(c.shape, &c.transform, eye),
        )
    }))
}

/// Distance from `eye` to the closest point of `shape` placed by `transform`.
fn surface_distance(shape: Shape, transform: &Transform, eye: Vec3) -> f32 {
    let matrix = transform.matrix();
    let local_eye = matrix.inverse().transform_point3(eye);
    matrix
        .transform_point3(shape.nearest_point(local_eye))
        .distance(eye)
}

/// Orders `(transparent, distance)` items.
fn draw_order_by(items: impl Iterator<Item = (bool, f32)>) -> Vec<usize> {
    let items: Vec<(bool, f32)> = items.collect();
    let mut opaque: Vec<usize> = (0..items.len()).filter(|&i| !items[i].0).collect();
    let mut transparent: Vec<usize> = (0..items.len()).filter(|&i| items[i].0).collect();
    transparent.sort_by(|&a, &b| items[b].1.total_cmp(&items[a].1));
    opaque.append(&mut transparent);
    opaque
}

/// Renders lit and unlit textured meshes with depth testing.
pub struct MeshPass {
    pipelines: HashMap<(Side, bool), wgpu::RenderPipeline>,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    /// The depth texture used for depth testing.
    pub(crate) depth_texture: wgpu::Texture,
    /// View into the depth texture for render pass attachment.
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    texture_bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // Scene uniform buffer (group 0)
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        // Model uniform buffer (group 1), one aligned slot per draw
        let model_size = std::mem::size_of::<ModelUniforms>() as u64;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = model_size.div_ceil(alignment) * alignment;

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: model_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(model_size),
                    },
                    count: None,
                }],
            });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(model_size),
                }),
            }],
        });

        // Texture bind group layout (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[
                &scene_bind_group_layout,
                &model_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for side in [Side::Front, Side::Back, Side::Double] {
            for transparent in [false, true] {
                let cull_mode = match side {
                    Side::Front => Some(wgpu::Face::Back),
                    Side::Back => Some(wgpu::Face::Front),
                    Side::Double => None,
                };
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Mesh Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs"),
                        buffers: &[Vertex3d::LAYOUT],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: gpu.config.format,
                            blend: Some(if transparent {
                                wgpu::BlendState::ALPHA_BLENDING
                            } else {
                                wgpu::BlendState::REPLACE
                            }),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode,
                        front_face: wgpu::FrontFace::Ccw,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: wgpu::TextureFormat::Depth32Float,
                        depth_write_enabled: !transparent,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });
                pipelines.insert((side, transparent), pipeline);
            }
        }

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Self {
            pipelines,
            scene_buffer,
            scene_bind_group,
            model_buffer,
            model_bind_group,
            model_stride,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            texture_bind_group_layout,
        }
    }

    /// Creates a bind group for a texture (group 2).
    pub fn create_texture_bind_group(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Uploads uniforms and records every draw call into `render_pass`.
    ///
    /// Draws beyond the model buffer's capacity are skipped with a warning.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        camera: &Camera,
        lights: &SceneLights,
        draw_calls: &[DrawCall],
    ) {
        let view_proj: Mat4 = camera.view_projection(gpu.aspect());

        let mut point_lights = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        for (slot, light) in point_lights.iter_mut().zip(&lights.points) {
            *slot = *light;
        }

        let scene = SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: lights.ambient,
            hemisphere_sky: lights.hemisphere_sky,
            hemisphere_ground: lights.hemisphere_ground,
            point_lights,
            point_count: [lights.points.len().min(MAX_POINT_LIGHTS) as u32, 0, 0, 0],
        };
        gpu.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[scene]));

        if draw_calls.is_empty() {
            return;
        }

        let mut order = draw_order(draw_calls, camera.position);
        if order.len() > MAX_DRAWS {
            tracing::warn!(
                draws = order.len(),
                max = MAX_DRAWS,
                "Too many draw calls, dropping the rest"
            );
            order.truncate(MAX_DRAWS);
        }

        let stride = self.model_stride as usize;
        let mut staging = vec![0u8; stride * order.len()];
        for (slot, &index) in order.iter().enumerate() {
            let call = &draw_calls[index];
            let uniforms = ModelUniforms::new(&call.transform, call.material, &call.lights);
            let bytes = bytemuck::bytes_of(&uniforms);
            staging[slot * stride..slot * stride + bytes.len()].copy_from_slice(bytes);
        }
        gpu.queue.write_buffer(&self.model_buffer, 0, &staging);

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

        for (slot, &index) in order.iter().enumerate() {
            let call = &draw_calls[index];
            let key = (call.material.side, call.material.is_transparent());
            let Some(pipeline) = self.pipelines.get(&key) else {
                continue;
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &self.model_bind_group, &[(slot * stride) as u32]);
            render_pass.set_bind_group(2, call.texture, &[]);
            render_pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(call.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..call.mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_uniforms_fit_one_slot() {
        assert!(std::mem::size_of::<ModelUniforms>() <= 256);
        assert_eq!(std::mem::size_of::<ModelUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn opaque_before_transparent_far_to_near() {
        let items = [(true, 5.0), (false, 50.0), (true, 20.0), (false, 1.0)];
        let order = draw_order_by(items.into_iter());
        assert_eq!(order, [1, 3, 2, 0]);
    }

    #[test]
    fn concentric_rings_sort_by_nearest_edge() {
        // Home camera pose; both rings sit at the origin.
        let eye = Vec3::new(0.0, 50.0, 150.0);
        let inner = Shape::Annulus { inner: 39.9, outer: 40.1 };
        let outer = Shape::Annulus { inner: 149.9, outer: 150.1 };
        let origin = Transform::new();

        let near = surface_distance(outer, &origin, eye);
        let far = surface_distance(inner, &origin, eye);
        assert!((near - 50.0).abs() < 0.2, "outer ring at {near}");
        assert!(far > near);

        let items = [(true, near), (true, far)];
        assert_eq!(draw_order_by(items.into_iter()), [1, 0]);
    }

    #[test]
    fn surface_distance_follows_transform() {
        let sphere = Shape::Sphere { radius: 5.0 };
        let placed = Transform::from_position(Vec3::new(0.0, 0.0, -20.0));
        assert!((surface_distance(sphere, &placed, Vec3::ZERO) - 15.0).abs() < 1e-4);

        // Eye inside the sphere.
        assert_eq!(surface_distance(sphere, &Transform::new(), Vec3::X), 0.0);

        // Tilted ring: the eye straight above the ring's center in world space.
        let ring = Shape::Annulus { inner: 10.0, outer: 20.0 };
        let tilted = Transform {
            rotation: glam::Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
            ..Transform::new()
        };
        let d = surface_distance(ring, &tilted, Vec3::new(0.0, 0.0, 30.0));
        assert!((d - 30.0f32.hypot(10.0)).abs() < 1e-3, "tilted ring at {d}");
    }

    #[test]
    fn lights_accumulate() {
        let mut lights = SceneLights::default();
        lights.add_ambient(Color::WHITE, 0.5);
        lights.add_ambient(Color::rgb(1.0, 0.0, 0.0), 0.5);
        assert_eq!(lights.ambient, [1.0, 0.5, 0.5, 1.0]);

        for _ in 0..MAX_POINT_LIGHTS + 2 {
            lights.add_point(PointLightRaw::new(Vec3::ZERO, Color::WHITE, 1.0, 10.0));
        }
        assert_eq!(lights.points.len(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn unlit_material_flags() {
        let material = Material::unlit(Color::WHITE).with_opacity(0.3);
        let uniforms = ModelUniforms::new(&Transform::new(), &material, &LocalLights::default());
        assert_eq!(uniforms.params, [0.3, 0.0, 0.0, 0.0]);
    }
}
