//! Per-frame rendering of the simulation: scene meshes, then the info panel.
//!
//! The renderer owns every GPU resource derived from the ECS world. Meshes
//! are built from an entity's [`Shape`] the first time it is drawn and
//! textures are loaded once per path, so the world itself stays free of GPU
//! handles.

use std::collections::HashMap;
use std::path::PathBuf;

use hecs::Entity;

use crate::assets::FontAtlas;
use crate::bodies::CelestialBodyConfig;
use crate::config::Config;
use crate::draw2d::{Color, Draw2d};
use crate::ecs::{AttachedTo, Light, Material, MeshId, Shape, TextureId, Visible};
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform};
use crate::mesh_pass::{DrawCall, LocalLights, MeshPass, PointLightRaw, SceneLights};
use crate::simulation::SimulationContext;
use crate::texture::Texture;

const SPHERE_SEGMENTS: u32 = 64;
const RING_SEGMENTS: u32 = 64;

const PANEL_FONT_SIZE: f32 = 18.0;
const PANEL_MARGIN: f32 = 10.0;
const PANEL_PADDING: f32 = 10.0;

struct LoadedTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    mesh_pass: MeshPass,
    draw2d: Draw2d,
    font: Option<FontAtlas>,
    texture_root: PathBuf,

    meshes: Vec<Mesh>,
    mesh_ids: HashMap<Entity, MeshId>,
    textures: Vec<LoadedTexture>,
    texture_ids: HashMap<&'static str, TextureId>,
    white: TextureId,
}

impl Renderer {
    /// Create the passes and load the panel font.
    ///
    /// A missing or unreadable font is not fatal: the panel then draws
    /// without text.
    pub fn new(gpu: &GpuContext, config: &Config) -> Self {
        let mesh_pass = MeshPass::new(gpu);
        let mut draw2d = Draw2d::new(gpu);

        let font = match FontAtlas::from_file(gpu, &config.assets.font_path, PANEL_FONT_SIZE) {
            Ok(font) => {
                draw2d.set_font(gpu, &font);
                Some(font)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Info panel text disabled");
                None
            }
        };

        let white = Texture::white(gpu);
        let bind_group = mesh_pass.create_texture_bind_group(gpu, &white);

        Self {
            mesh_pass,
            draw2d,
            font,
            texture_root: config.assets.texture_root.clone(),
            meshes: Vec::new(),
            mesh_ids: HashMap::new(),
            textures: vec![LoadedTexture {
                _texture: white,
                bind_group,
            }],
            texture_ids: HashMap::new(),
            white: TextureId(0),
        }
    }

    /// Draw one frame of `sim` to the window surface.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        sim: &SimulationContext,
    ) -> Result<(), wgpu::SurfaceError> {
        self.mesh_pass.ensure_depth_size(gpu);
        self.prepare(gpu, sim);

        let (scene_lights, local_lights) = gather_lights(&sim.world);
        let camera = sim.camera();

        let mut query = sim
            .world
            .query::<(&Shape, &Material, &Transform, &Visible)>();
        let mut draw_calls = Vec::new();
        for (entity, (shape, material, transform, visible)) in query.iter() {
            if !visible.0 {
                continue;
            }
            let Some(&MeshId(mesh)) = self.mesh_ids.get(&entity) else {
                continue;
            };
            let texture = material
                .texture
                .and_then(|path| self.texture_ids.get(path).copied())
                .unwrap_or(self.white);

            draw_calls.push(DrawCall {
                mesh: &self.meshes[mesh],
                shape: *shape,
                transform: *transform,
                material,
                texture: &self.textures[texture.0].bind_group,
                lights: local_lights.get(&entity).copied().unwrap_or_default(),
            });
        }

        self.draw2d.clear();
        if let Some(body) = sim.info_panel() {
            draw_info_panel(&mut self.draw2d, self.font.as_ref(), gpu, body);
        }

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.mesh_pass.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_pass
                .render(gpu, &mut render_pass, &camera, &scene_lights, &draw_calls);
        }

        // Overlay pass keeps the scene and has no depth attachment.
        {
            let mut ui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.draw2d.render(gpu, &mut ui_pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Build meshes and load textures for entities seen for the first time.
    fn prepare(&mut self, gpu: &GpuContext, sim: &SimulationContext) {
        let mut query = sim.world.query::<(&Shape, &Material)>();
        for (entity, (shape, material)) in query.iter() {
            if !self.mesh_ids.contains_key(&entity) {
                let geometry = match *shape {
                    Shape::Sphere { radius } => {
                        RawGeometry::sphere(radius, SPHERE_SEGMENTS, SPHERE_SEGMENTS)
                    }
                    Shape::Annulus { inner, outer } => {
                        RawGeometry::annulus(inner, outer, RING_SEGMENTS)
                    }
                };
                self.meshes.push(Mesh::from_raw(gpu, &geometry));
                self.mesh_ids.insert(entity, MeshId(self.meshes.len() - 1));
            }

            if let Some(path) = material.texture
                && !self.texture_ids.contains_key(path)
            {
                let id = self.load_texture(gpu, path);
                self.texture_ids.insert(path, id);
            }
        }
    }

    /// Load `path` under the texture root, falling back to white on failure.
    fn load_texture(&mut self, gpu: &GpuContext, path: &str) -> TextureId {
        let full = self.texture_root.join(path);
        match Texture::from_file(gpu, &full) {
            Ok(texture) => {
                tracing::debug!(
                    path = %full.display(),
                    width = texture.width,
                    height = texture.height,
                    "Texture loaded"
                );
                let bind_group = self.mesh_pass.create_texture_bind_group(gpu, &texture);
                self.textures.push(LoadedTexture {
                    _texture: texture,
                    bind_group,
                });
                TextureId(self.textures.len() - 1)
            }
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "Texture unavailable, using white");
                self.white
            }
        }
    }
}

/// Split lights into scene-wide lights and lights bound to a parent body.
fn gather_lights(world: &hecs::World) -> (SceneLights, HashMap<Entity, LocalLights>) {
    let mut scene = SceneLights::default();
    let mut local: HashMap<Entity, LocalLights> = HashMap::new();

    let mut query = world.query::<(&Light, &Transform, Option<&AttachedTo>)>();
    for (_, (light, transform, attached)) in query.iter() {
        match (attached, *light) {
            (None, Light::Point { color, intensity, range }) => {
                scene.add_point(PointLightRaw::new(transform.position, color, intensity, range));
            }
            (None, Light::Ambient { color, intensity }) => scene.add_ambient(color, intensity),
            (None, Light::Hemisphere { sky, ground, intensity }) => {
                scene.add_hemisphere(sky, ground, intensity)
            }
            (Some(attached), Light::Point { color, intensity, range }) => {
                local.entry(attached.parent).or_default().point =
                    Some(PointLightRaw::new(transform.position, color, intensity, range));
            }
            (Some(attached), Light::Ambient { color, intensity }) => {
                local
                    .entry(attached.parent)
                    .or_default()
                    .add_hemisphere(color, color, intensity);
            }
            (Some(attached), Light::Hemisphere { sky, ground, intensity }) => {
                local
                    .entry(attached.parent)
                    .or_default()
                    .add_hemisphere(sky, ground, intensity);
            }
        }
    }

    (scene, local)
}

fn draw_info_panel(
    draw2d: &mut Draw2d,
    font: Option<&FontAtlas>,
    gpu: &GpuContext,
    body: &CelestialBodyConfig,
) {
    let lines = body.info_lines();
    let line_height = font.map_or(PANEL_FONT_SIZE * 1.2, FontAtlas::line_height);
    let text_width = font.map_or(PANEL_FONT_SIZE * 14.0, |font| {
        lines
            .iter()
            .map(|line| font.measure(line))
            .fold(0.0, f32::max)
    });

    let width = text_width + PANEL_PADDING * 2.0;
    let height = line_height * lines.len() as f32 + PANEL_PADDING * 2.0;
    let x = PANEL_MARGIN;
    let y = gpu.height() as f32 - PANEL_MARGIN - height;

    draw2d.rect(x, y, width, height, Color::PANEL_BG);

    if let Some(font) = font {
        for (i, line) in lines.iter().enumerate() {
            draw2d.text(
                font,
                x + PANEL_PADDING,
                y + PANEL_PADDING + line_height * i as f32,
                line,
                Color::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::build_scene;

    #[test]
    fn scene_lights_are_shared_and_fill_lights_are_local() {
        let mut world = hecs::World::new();
        let handles = build_scene(&mut world, 0);

        let (scene, local) = gather_lights(&world);
        assert_eq!(scene.points.len(), 1);
        assert!(scene.ambient[0] > 0.0);
        assert!(scene.hemisphere_sky[2] > 0.0);

        assert_eq!(local.len(), handles.planets.len());
        for planet in &handles.planets {
            let lights = local[planet];
            assert!(lights.point.is_none());
            assert_eq!(lights.hemisphere_ground, [0.0, 0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn attached_point_light_stays_local() {
        let mut world = hecs::World::new();
        let parent = world.spawn((Transform::new(),));
        world.spawn((
            Light::point(Color::WHITE, 2.0, 50.0),
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            AttachedTo::new(parent),
        ));

        let (scene, local) = gather_lights(&world);
        assert!(scene.points.is_empty());
        let point = local[&parent].point.unwrap();
        assert_eq!(point.position_range, [1.0, 2.0, 3.0, 50.0]);
        assert_eq!(point.color, [2.0, 2.0, 2.0, 1.0]);
    }
}
