//! Per-frame orbital and rotational motion.
//!
//! Time convention: one real second advances the simulation by
//! `days_per_second` days, and every period in the body table is in days.
//! A planet completes one orbit every `orbital_period` simulated days and,
//! before `spin_scale` is applied, one spin every `rotation_period` days.
//! Both angles are wrapped each step so they never grow without bound.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::bodies::{CelestialBodyConfig, PLANETS};
use crate::ecs::AttachedTo;
use crate::mesh::Transform;

/// Links a planet entity to its row in [`PLANETS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Planet(pub usize);

impl Planet {
    pub fn body(&self) -> &'static CelestialBodyConfig {
        &PLANETS[self.0]
    }
}

/// Mutable runtime state of one planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetState {
    /// Angle around the sun in `[0, 2π)`, measured from +X toward +Z.
    pub orbit_angle: f32,
    /// Spin about the planet's Y axis in `(-2π, 2π)`.
    pub rotation: f32,
    /// Frozen while the camera is focused on this planet.
    pub focus_stopped: bool,
}

impl PlanetState {
    pub fn new(orbit_angle: f32) -> Self {
        Self {
            orbit_angle: orbit_angle.rem_euclid(TAU),
            rotation: 0.0,
            focus_stopped: false,
        }
    }

    /// Advance by `days` of simulated time. No-op while focus-stopped.
    pub fn advance(&mut self, body: &CelestialBodyConfig, days: f32, spin_scale: f32) {
        if self.focus_stopped {
            return;
        }
        self.orbit_angle = (self.orbit_angle + days / body.orbital_period * TAU).rem_euclid(TAU);
        self.rotation = (self.rotation + days / body.rotation_period * TAU * spin_scale) % TAU;
    }

    /// Position on the circular orbit in the XZ plane.
    pub fn position(&self, body: &CelestialBodyConfig) -> Vec3 {
        let (sin, cos) = self.orbit_angle.sin_cos();
        Vec3::new(body.orbital_distance * cos, 0.0, body.orbital_distance * sin)
    }

    pub fn spin(&self) -> Quat {
        Quat::from_rotation_y(self.rotation)
    }
}

/// Starting orbit angle for a planet, spread over `[0, 2π)` by `seed`.
pub fn initial_phase(seed: u32, index: usize) -> f32 {
    let mut h = seed;
    h = h.wrapping_add((index as u32).wrapping_mul(374761393));
    h = h.wrapping_add(0x9e37_79b9u32.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    (h as f32 / u32::MAX as f32) * TAU % TAU
}

/// Advance every planet by `dt` real seconds and move attached entities
/// along with their parents.
pub fn step(world: &mut hecs::World, dt: f32, days_per_second: f32, spin_scale: f32) {
    let days = dt * days_per_second;

    for (_, (planet, state, transform)) in
        world.query_mut::<(&Planet, &mut PlanetState, &mut Transform)>()
    {
        let body = planet.body();
        state.advance(body, days, spin_scale);
        transform.position = state.position(body);
        transform.rotation = state.spin();
    }

    follow_parents(world);
}

/// Move each attached entity to its parent's position plus its offset.
pub fn follow_parents(world: &mut hecs::World) {
    let moves: Vec<(hecs::Entity, Vec3)> = world
        .query::<(&AttachedTo, &Transform)>()
        .iter()
        .filter_map(|(entity, (attached, _))| {
            world
                .get::<&Transform>(attached.parent)
                .ok()
                .map(|parent| (entity, parent.position + attached.offset))
        })
        .collect();

    for (entity, position) in moves {
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            transform.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn angle_diff(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn position_stays_on_orbit() {
        for (i, body) in PLANETS.iter().enumerate() {
            let mut state = PlanetState::new(initial_phase(7, i));
            for _ in 0..500 {
                state.advance(body, 3.7, 0.01);
                let p = state.position(body);
                let r = (p.x * p.x + p.z * p.z).sqrt();
                assert!((r - body.orbital_distance).abs() < EPS * body.orbital_distance);
                assert_eq!(p.y, 0.0);
            }
        }
    }

    #[test]
    fn full_period_returns_to_start() {
        for (i, body) in PLANETS.iter().enumerate() {
            let start = initial_phase(42, i);
            let mut state = PlanetState::new(start);
            let steps = 100;
            for _ in 0..steps {
                state.advance(body, body.orbital_period / steps as f32, 0.01);
            }
            assert!(angle_diff(state.orbit_angle, start) < EPS, "{}", body.name);
        }
    }

    #[test]
    fn retrograde_spins_opposite_with_same_magnitude() {
        let prograde = CelestialBodyConfig {
            rotation_period: 0.72,
            ..PLANETS[6]
        };
        let retrograde = PLANETS[6];
        assert!(retrograde.rotation_period < 0.0);

        let mut a = PlanetState::new(0.0);
        let mut b = PlanetState::new(0.0);
        a.advance(&prograde, 1.5, 0.01);
        b.advance(&retrograde, 1.5, 0.01);

        assert!(a.rotation > 0.0);
        assert!(b.rotation < 0.0);
        assert!((a.rotation + b.rotation).abs() < 1e-6);
    }

    #[test]
    fn angles_stay_wrapped() {
        let body = &PLANETS[4];
        let mut state = PlanetState::new(0.0);
        for _ in 0..10_000 {
            state.advance(body, 500.0, 1.0);
            assert!((0.0..TAU).contains(&state.orbit_angle));
            assert!(state.rotation.abs() < TAU);
        }
    }

    #[test]
    fn focus_stopped_freezes_motion() {
        let body = &PLANETS[2];
        let mut state = PlanetState::new(1.0);
        state.focus_stopped = true;
        let before = state;
        state.advance(body, 100.0, 0.01);
        assert_eq!(state, before);
    }

    #[test]
    fn initial_phase_in_range_and_varies() {
        let phases: Vec<f32> = (0..PLANETS.len()).map(|i| initial_phase(3, i)).collect();
        assert!(phases.iter().all(|p| (0.0..TAU).contains(p)));
        assert!(phases.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn step_moves_attachments_with_parent() {
        let mut world = hecs::World::new();
        let earth = world.spawn((
            Planet(2),
            PlanetState::new(0.0),
            Transform::from_position(Vec3::new(40.0, 0.0, 0.0)),
        ));
        let ring = world.spawn((Transform::new(), AttachedTo::new(earth)));
        let offset = Vec3::new(1.0, 2.0, 3.0);
        let light = world.spawn((Transform::new(), AttachedTo::new(earth).with_offset(offset)));

        step(&mut world, 10.0, 1.0, 0.01);

        let planet_pos = world.get::<&Transform>(earth).unwrap().position;
        assert_eq!(world.get::<&Transform>(ring).unwrap().position, planet_pos);
        assert_eq!(
            world.get::<&Transform>(light).unwrap().position,
            planet_pos + offset
        );
        assert!(planet_pos.z > 0.0);
    }
}
