//! CPU-side geometry generators.
//!
//! Every shape in the scene is either a UV sphere or a flat annulus lying in
//! the XZ plane. Geometry is generated here as [`RawGeometry`] and uploaded
//! later by [`Mesh::from_raw`](crate::Mesh::from_raw), which keeps the
//! generators testable without a GPU.
//!
//! ```
//! use orrery::RawGeometry;
//!
//! let planet = RawGeometry::sphere(2.0, 64, 64);
//! let orbit = RawGeometry::annulus(39.9, 40.1, 64);
//! assert_eq!(orbit.triangle_count(), 128);
//! # let _ = planet;
//! ```

use crate::mesh::Vertex3d;

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices, counter-clockwise when seen from the front.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// A latitude/longitude sphere centered at the origin.
    ///
    /// UVs are equirectangular (u = longitude, v = latitude from the north
    /// pole), which is the layout of the planet surface maps.
    ///
    /// Produces `(segments + 1) × (rings + 1)` vertices and
    /// `segments × rings × 2` triangles.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                // Negated x keeps the surface map unmirrored when seen from outside.
                let x = -ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                vertices.push(Vertex3d::new(
                    [x * radius, y * radius, z * radius],
                    [x, y, z],
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, next, current + 1]);
                indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }

        Self::new(vertices, indices)
    }

    /// A flat ring between `inner` and `outer` radius in the XZ plane.
    ///
    /// Normals point up (+Y). UVs are radial: `u` runs from the inner edge
    /// (0) to the outer edge (1) and `v` runs once around the ring, so a
    /// one-dimensional ring strip texture maps onto it directly.
    pub fn annulus(inner: f32, outer: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(((segments + 1) * 2) as usize);
        let mut indices = Vec::with_capacity((segments * 6) as usize);

        for seg in 0..=segments {
            let t = seg as f32 / segments as f32;
            let theta = std::f32::consts::TAU * t;
            let (sin, cos) = theta.sin_cos();

            vertices.push(Vertex3d::new(
                [cos * inner, 0.0, sin * inner],
                [0.0, 1.0, 0.0],
                [0.0, t],
            ));
            vertices.push(Vertex3d::new(
                [cos * outer, 0.0, sin * outer],
                [0.0, 1.0, 0.0],
                [1.0, t],
            ));
        }

        for seg in 0..segments {
            let i = seg * 2;
            let o = i + 1;
            let next_i = i + 2;
            let next_o = i + 3;

            // Front face is +Y: (inner, next_inner, outer) winds CCW seen from above.
            indices.extend_from_slice(&[i, next_i, o]);
            indices.extend_from_slice(&[o, next_i, next_o]);
        }

        Self::new(vertices, indices)
    }

    /// Number of triangles described by the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let geom = RawGeometry::sphere(11.2, 32, 16);
        for v in &geom.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 11.2).abs() < 1e-3, "vertex at distance {len}");
        }
        assert_eq!(geom.vertices.len(), 33 * 17);
        assert_eq!(geom.triangle_count(), 32 * 16 * 2);
    }

    #[test]
    fn sphere_normals_point_outward() {
        let geom = RawGeometry::sphere(3.0, 16, 8);
        for v in &geom.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!(p.dot(n) >= 0.0);
        }
    }

    #[test]
    fn sphere_front_faces_wind_outward() {
        let geom = RawGeometry::sphere(1.0, 16, 8);
        for tri in geom.indices.chunks(3) {
            let a = Vec3::from(geom.vertices[tri[0] as usize].position);
            let b = Vec3::from(geom.vertices[tri[1] as usize].position);
            let c = Vec3::from(geom.vertices[tri[2] as usize].position);
            let face_normal = (b - a).cross(c - a);
            // Degenerate triangles at the poles have no direction.
            if face_normal.length() > 1e-6 {
                let centroid = (a + b + c) / 3.0;
                assert!(face_normal.dot(centroid) > 0.0);
            }
        }
    }

    #[test]
    fn annulus_radii() {
        let geom = RawGeometry::annulus(39.9, 40.1, 64);
        for v in &geom.vertices {
            let p = Vec3::from(v.position);
            assert_eq!(p.y, 0.0);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - 39.9).abs() < 1e-3 || (r - 40.1).abs() < 1e-3);
        }
        assert_eq!(geom.triangle_count(), 128);
    }

    #[test]
    fn annulus_front_face_is_up() {
        let geom = RawGeometry::annulus(1.0, 2.0, 8);
        for tri in geom.indices.chunks(3) {
            let a = Vec3::from(geom.vertices[tri[0] as usize].position);
            let b = Vec3::from(geom.vertices[tri[1] as usize].position);
            let c = Vec3::from(geom.vertices[tri[2] as usize].position);
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }
}
