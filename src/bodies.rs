//! Static parameters for the sun, the starfield and the eight planets.
//!
//! Distances and radii are scene units; periods are in simulated days.
//! Nothing in this module is mutated at runtime: per-planet state lives in
//! [`PlanetState`](crate::PlanetState).

use crate::draw2d::Color;

/// Immutable description of one planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialBodyConfig {
    pub name: &'static str,
    /// Sphere radius in scene units.
    pub radius: f32,
    /// Radius of the circular orbit around the origin.
    pub orbital_distance: f32,
    /// Days for one full revolution.
    pub orbital_period: f32,
    /// Days for one full spin. Negative values spin retrograde.
    pub rotation_period: f32,
    /// Surface texture, relative to the texture root.
    pub texture: &'static str,
    /// Color of the fill light attached to the planet, as `0xRRGGBB`.
    pub tint: u32,
    pub has_ring: bool,
}

impl CelestialBodyConfig {
    /// Fill-light color.
    pub fn tint_color(&self) -> Color {
        Color::from_hex(self.tint)
    }

    /// Per-axis offset of the focus camera from the body, scaled by `factor`.
    pub fn view_distance(&self, factor: f32) -> f32 {
        self.radius * factor
    }

    /// Lines shown in the info panel while this body is selected.
    pub fn info_lines(&self) -> [String; 4] {
        [
            self.name.to_string(),
            format!("Distance from Sun: {} million km", self.orbital_distance),
            format!("Orbital Period: {} days", self.orbital_period),
            format!("Rotation Period: {} days", self.rotation_period),
        ]
    }
}

/// A textured sphere with no orbit (sun, starfield).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackdropConfig {
    pub radius: f32,
    pub texture: &'static str,
}

pub const STARFIELD: BackdropConfig = BackdropConfig {
    radius: 1000.0,
    texture: "MOON/8k_stars_milky_way.jpg",
};

pub const SUN: BackdropConfig = BackdropConfig {
    radius: 5.0,
    texture: "Planets/8k_sun.jpg",
};

/// Alpha map used for the ringed planet.
pub const RING_TEXTURE: &str = "Planets/8k_saturn_ring_alpha.png";

/// Ring inner and outer radii as multiples of the planet radius.
pub const RING_INNER_SCALE: f32 = 1.4;
pub const RING_OUTER_SCALE: f32 = 2.0;

/// Half width of the orbit indicator annulus.
pub const ORBIT_RING_HALF_WIDTH: f32 = 0.1;

pub const PLANETS: [CelestialBodyConfig; 8] = [
    CelestialBodyConfig {
        name: "Mercury",
        radius: 1.0,
        orbital_distance: 20.0,
        orbital_period: 88.0,
        rotation_period: 58.65,
        texture: "Planets/8k_mercury.jpg",
        tint: 0xaaaaaa,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Venus",
        radius: 1.5,
        orbital_distance: 30.0,
        orbital_period: 224.7,
        rotation_period: -243.0,
        texture: "Planets/8k_venus_surface.jpg",
        tint: 0xffd700,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Earth",
        radius: 2.0,
        orbital_distance: 40.0,
        orbital_period: 365.25,
        rotation_period: 1.0,
        texture: "Earth/8k_earth_daymap.jpg",
        tint: 0x00ff00,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Mars",
        radius: 1.7,
        orbital_distance: 55.0,
        orbital_period: 687.0,
        rotation_period: 1.03,
        texture: "Planets/8k_mars.jpg",
        tint: 0xff4500,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Jupiter",
        radius: 11.2,
        orbital_distance: 100.0,
        orbital_period: 4333.0,
        rotation_period: 0.41,
        texture: "Planets/8k_jupiter.jpg",
        tint: 0xffa500,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Saturn",
        radius: 6.0,
        orbital_distance: 138.0,
        orbital_period: 10759.0,
        rotation_period: 0.44,
        texture: "Planets/8k_saturn.jpg",
        tint: 0xffd700,
        has_ring: true,
    },
    CelestialBodyConfig {
        name: "Uranus",
        radius: 4.0,
        orbital_distance: 176.0,
        orbital_period: 30687.0,
        rotation_period: -0.72,
        texture: "Planets/2k_uranus.jpg",
        tint: 0x00ffff,
        has_ring: false,
    },
    CelestialBodyConfig {
        name: "Neptune",
        radius: 3.88,
        orbital_distance: 200.0,
        orbital_period: 60190.0,
        rotation_period: 0.67,
        texture: "Planets/2k_neptune.jpg",
        tint: 0x0000ff,
        has_ring: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_ringed_planet() {
        let ringed: Vec<_> = PLANETS.iter().filter(|p| p.has_ring).collect();
        assert_eq!(ringed.len(), 1);
        assert_eq!(ringed[0].name, "Saturn");
    }

    #[test]
    fn orbits_are_ordered_and_clear_the_sun() {
        let mut previous = SUN.radius;
        for planet in &PLANETS {
            assert!(planet.orbital_distance - planet.radius > previous);
            previous = planet.orbital_distance;
        }
        assert!(previous < STARFIELD.radius);
    }

    #[test]
    fn retrograde_bodies() {
        let retrograde: Vec<_> = PLANETS
            .iter()
            .filter(|p| p.rotation_period < 0.0)
            .map(|p| p.name)
            .collect();
        assert_eq!(retrograde, ["Venus", "Uranus"]);
    }

    #[test]
    fn info_lines_format() {
        let lines = PLANETS[2].info_lines();
        assert_eq!(lines[0], "Earth");
        assert_eq!(lines[1], "Distance from Sun: 40 million km");
        assert_eq!(lines[2], "Orbital Period: 365.25 days");
        assert_eq!(lines[3], "Rotation Period: 1 days");
    }
}
