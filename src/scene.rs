//! One-time construction of the solar system into an ECS world.

use glam::Vec3;
use hecs::{Entity, World};

use crate::bodies::{
    ORBIT_RING_HALF_WIDTH, PLANETS, RING_INNER_SCALE, RING_OUTER_SCALE, RING_TEXTURE, STARFIELD,
    SUN,
};
use crate::draw2d::Color;
use crate::ecs::{
    AttachedTo, Light, Material, OrbitRing, PlanetRing, Shape, Side, Starfield, Sun, Visible,
};
use crate::kinematics::{Planet, PlanetState, initial_phase};
use crate::mesh::Transform;
use crate::picking::Collider;

/// Entities created by [`build_scene`] that the simulation refers to later.
#[derive(Clone, Debug)]
pub struct SceneHandles {
    pub starfield: Entity,
    pub sun: Entity,
    /// Planet entities in [`PLANETS`] order.
    pub planets: Vec<Entity>,
}

/// Populate `world` with the starfield, the sun, scene lights and every
/// planet with its orbit indicator, fill light and optional ring.
///
/// `seed` spreads the planets' starting orbit angles.
pub fn build_scene(world: &mut World, seed: u32) -> SceneHandles {
    let starfield = world.spawn((
        Starfield,
        Transform::new(),
        Shape::Sphere {
            radius: STARFIELD.radius,
        },
        Material::unlit(Color::WHITE)
            .with_texture(STARFIELD.texture)
            .with_side(Side::Back),
        Visible(true),
    ));

    let sun = world.spawn((
        Sun,
        Transform::new(),
        Shape::Sphere { radius: SUN.radius },
        Material::unlit(Color::WHITE)
            .with_texture(SUN.texture)
            .with_emissive(Color::from_hex(0xffff00), 1.0),
        Visible(true),
    ));

    world.spawn((Light::point(Color::WHITE, 10.0, 1000.0), Transform::new()));
    world.spawn((Light::ambient(Color::from_hex(0x404040), 0.5), Transform::new()));
    world.spawn((
        Light::hemisphere(Color::from_hex(0x0099ff), Color::from_hex(0xaa5500), 1.0),
        Transform::new(),
    ));

    let mut planets = Vec::with_capacity(PLANETS.len());
    for (index, body) in PLANETS.iter().enumerate() {
        let state = PlanetState::new(initial_phase(seed, index));
        let transform = Transform {
            position: state.position(body),
            rotation: state.spin(),
            scale: Vec3::ONE,
        };

        let planet = world.spawn((
            Planet(index),
            state,
            transform,
            Shape::Sphere {
                radius: body.radius,
            },
            Material::standard(Color::WHITE).with_texture(body.texture),
            Collider::sphere(body.radius),
            Visible(true),
        ));

        world.spawn((
            OrbitRing(index),
            Transform::new(),
            Shape::Annulus {
                inner: body.orbital_distance - ORBIT_RING_HALF_WIDTH,
                outer: body.orbital_distance + ORBIT_RING_HALF_WIDTH,
            },
            Material::unlit(Color::WHITE)
                .with_opacity(0.3)
                .with_side(Side::Double),
            Visible(true),
        ));

        world.spawn((
            Light::hemisphere(body.tint_color(), Color::BLACK, 0.9),
            Transform::from_position(transform.position),
            AttachedTo::new(planet),
        ));

        if body.has_ring {
            world.spawn((
                PlanetRing,
                Transform::from_position(transform.position),
                Shape::Annulus {
                    inner: body.radius * RING_INNER_SCALE,
                    outer: body.radius * RING_OUTER_SCALE,
                },
                Material::unlit(Color::WHITE)
                    .with_texture(RING_TEXTURE)
                    .with_opacity(0.8)
                    .with_side(Side::Double),
                Visible(true),
                AttachedTo::new(planet),
            ));
        }

        planets.push(planet);
    }

    tracing::info!(
        planets = planets.len(),
        entities = world.len(),
        seed,
        "Scene built"
    );

    SceneHandles {
        starfield,
        sun,
        planets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_body() {
        let mut world = World::new();
        let handles = build_scene(&mut world, 1);

        assert_eq!(handles.planets.len(), PLANETS.len());
        assert_eq!(world.query::<&OrbitRing>().iter().count(), PLANETS.len());
        assert_eq!(world.query::<&PlanetRing>().iter().count(), 1);
        assert!(world.get::<&Starfield>(handles.starfield).is_ok());
        assert!(world.get::<&Sun>(handles.sun).is_ok());
    }

    #[test]
    fn planets_start_on_their_orbits() {
        let mut world = World::new();
        let handles = build_scene(&mut world, 9);

        for (index, &entity) in handles.planets.iter().enumerate() {
            let transform = world.get::<&Transform>(entity).unwrap();
            let p = transform.position;
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - PLANETS[index].orbital_distance).abs() < 1e-3);
            assert_eq!(*world.get::<&Planet>(entity).unwrap(), Planet(index));
        }
    }

    #[test]
    fn each_planet_has_a_fill_light() {
        let mut world = World::new();
        let handles = build_scene(&mut world, 0);

        for (index, &planet) in handles.planets.iter().enumerate() {
            let mut query = world.query::<(&Light, &AttachedTo)>();
            let lights: Vec<Light> = query
                .iter()
                .filter(|(_, (_, attached))| attached.parent == planet)
                .map(|(_, (light, _))| *light)
                .collect();
            assert_eq!(
                lights,
                [Light::hemisphere(PLANETS[index].tint_color(), Color::BLACK, 0.9)]
            );
        }
    }

    #[test]
    fn only_planets_are_pickable() {
        let mut world = World::new();
        build_scene(&mut world, 0);

        let mut query = world.query::<(&Collider, Option<&Planet>)>();
        assert!(query.iter().all(|(_, (_, planet))| planet.is_some()));
    }
}
