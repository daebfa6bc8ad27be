//! # Orrery
//!
//! **An interactive 3D model of the solar system, rendered with wgpu.**
//!
//! The Sun sits at the origin inside a textured starfield, and the eight
//! planets orbit it while spinning on their own axes. Drag to orbit the camera
//! and scroll to zoom. Click a planet to fly to it: the rest of the system
//! hides, the planet's facts appear in a panel, and after a few seconds the
//! view flies home again. Escape returns home early.
//!
//! ## Layout
//!
//! - **Simulation** ([`SimulationContext`]): the `hecs` world, orbital
//!   kinematics, camera controls and the click-to-focus phases. It needs no
//!   GPU and is tested headless.
//! - **Rendering** ([`Renderer`]): turns the world into lit, textured meshes
//!   and draws the info panel on top.
//! - **Shell** ([`run`]): the winit event loop tying the two together.
//!
//! ```no_run
//! use orrery::{Config, run};
//!
//! let config = Config::default();
//! run(config).expect("event loop failed");
//! ```

mod app;
mod assets;
pub mod bodies;
mod camera;
mod cli;
pub mod config;
mod draw2d;
mod ecs;
mod error;
mod focus;
mod geometry;
mod gpu;
mod input;
mod kinematics;
pub mod logging;
mod mesh;
mod mesh_pass;
mod orbit_camera;
mod picking;
mod renderer;
mod scene;
mod simulation;
mod texture;

pub use app::run;
pub use assets::{FontAtlas, GlyphInfo, GlyphSheet, pack_glyphs};
pub use bodies::{CelestialBodyConfig, PLANETS};
pub use camera::Camera;
pub use cli::CliArgs;
pub use config::Config;
pub use draw2d::{Color, Draw2d};
pub use error::{AssetError, ConfigError, GpuError};
pub use focus::{FocusEvent, FocusPhase, FocusTiming, focus_pose, lerp_pose};
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use input::{CLICK_SLOP, Input};
pub use kinematics::{Planet, PlanetState, initial_phase};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawCall, LocalLights, MeshPass, SceneLights};
pub use orbit_camera::OrbitCamera;
pub use renderer::Renderer;
pub use scene::{SceneHandles, build_scene};
pub use simulation::SimulationContext;
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

// ECS components and handles
pub use ecs::{
    AttachedTo, EmphasisLight, Light, Material, MeshId, OrbitRing, PlanetRing, Shape, Side,
    Starfield, Sun, TextureId, Visible,
};
pub use hecs::{Entity, World};

// 3D picking
pub use picking::{Collider, Ray, RayHit, raycast, screen_to_ndc};
