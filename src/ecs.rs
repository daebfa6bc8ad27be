//! ECS components describing the scene.
//!
//! Every scene member is a `hecs` entity. Drawable entities carry a
//! [`Transform`](crate::Transform), a [`Shape`], a [`Material`] and a
//! [`Visible`] flag; the renderer builds GPU meshes from the shape the first
//! time it sees an entity. Lights are entities too, either free-standing
//! (scene-wide) or bound to a body with [`AttachedTo`].
//!
//! ```
//! use orrery::*;
//!
//! let mut world = World::new();
//! world.spawn((
//!     Sun,
//!     Transform::new(),
//!     Shape::Sphere { radius: 5.0 },
//!     Material::unlit(Color::WHITE).with_texture("Planets/8k_sun.jpg"),
//!     Visible(true),
//! ));
//! world.spawn((Light::point(Color::WHITE, 10.0, 1000.0), Transform::new()));
//! ```

use glam::Vec3;

use crate::draw2d::Color;

/// Type-safe handle to a GPU mesh owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Type-safe handle to a GPU texture owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Geometry of a drawable entity, in its local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Flat ring in the local XZ plane.
    Annulus { inner: f32, outer: f32 },
}

impl Shape {
    /// Point of the shape closest to `point`, both in local space.
    pub fn nearest_point(&self, point: Vec3) -> Vec3 {
        match *self {
            Shape::Sphere { radius } => {
                if point.length() <= radius {
                    point
                } else {
                    point.normalize() * radius
                }
            }
            Shape::Annulus { inner, outer } => {
                let radial = Vec3::new(point.x, 0.0, point.z);
                let r = radial.length();
                let direction = if r > f32::EPSILON { radial / r } else { Vec3::X };
                direction * r.clamp(inner, outer)
            }
        }
    }
}

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    /// Only inner faces; used for the starfield seen from inside.
    Back,
    Double,
}

/// Surface appearance of a drawable entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Base color, multiplied with the texture.
    pub color: Color,
    /// Texture path relative to the texture root.
    pub texture: Option<&'static str>,
    /// Extra light emitted regardless of scene lighting.
    pub emissive: Color,
    pub emissive_intensity: f32,
    /// Multiplied into the final alpha. Values below 1 draw in the transparent pass.
    pub opacity: f32,
    pub side: Side,
    /// Unlit materials output `texture × color` without shading or tone mapping.
    pub lit: bool,
}

impl Material {
    /// A shaded material.
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            texture: None,
            emissive: Color::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            side: Side::Front,
            lit: true,
        }
    }

    /// A flat material unaffected by lights.
    pub fn unlit(color: Color) -> Self {
        Self {
            lit: false,
            ..Self::standard(color)
        }
    }

    pub fn with_texture(mut self, path: &'static str) -> Self {
        self.texture = Some(path);
        self
    }

    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Whether an entity is drawn and pickable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visible(pub bool);

/// Binds an entity to a parent body: it follows the parent's position plus
/// `offset` and, for lights, only illuminates the parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttachedTo {
    pub parent: hecs::Entity,
    pub offset: Vec3,
}

impl AttachedTo {
    pub fn new(parent: hecs::Entity) -> Self {
        Self {
            parent,
            offset: Vec3::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }
}

/// A light source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Omnidirectional light fading smoothly to zero at `range`.
    Point {
        color: Color,
        intensity: f32,
        range: f32,
    },
    Ambient { color: Color, intensity: f32 },
    /// Sky color from above blending to ground color from below.
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
}

impl Light {
    pub fn point(color: Color, intensity: f32, range: f32) -> Self {
        Self::Point {
            color,
            intensity,
            range,
        }
    }

    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self::Hemisphere {
            sky,
            ground,
            intensity,
        }
    }
}

/// Marker for the background star sphere.
#[derive(Clone, Copy, Debug)]
pub struct Starfield;

/// Marker for the sun mesh.
#[derive(Clone, Copy, Debug)]
pub struct Sun;

/// Marker for a planet's orbit indicator, holding the planet's table index.
#[derive(Clone, Copy, Debug)]
pub struct OrbitRing(pub usize);

/// Marker for the ring mesh around a ringed planet.
#[derive(Clone, Copy, Debug)]
pub struct PlanetRing;

/// Marker for the light added to a focused planet.
#[derive(Clone, Copy, Debug)]
pub struct EmphasisLight;
