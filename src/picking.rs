//! Mouse picking against planet colliders.
//!
//! A click is unprojected into a world-space [`Ray`] and tested against
//! every visible entity carrying a [`Collider`]. Colliders are spheres
//! matching the planet radius, which is exact for the UV-sphere meshes up to
//! tessellation error.
//!
//! ```
//! use orrery::{Ray, Vec3};
//!
//! let ray = Ray::new(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z);
//! let hit = ray.intersect_sphere(Vec3::ZERO, 5.0);
//! assert_eq!(hit, Some(45.0));
//! ```

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::ecs::Visible;
use crate::mesh::Transform;

/// A ray in 3D space, used for raycasting and picking.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with the given origin and direction.
    ///
    /// The direction will be normalized automatically.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from a cursor position using the camera's view-projection.
    ///
    /// `screen` is in window pixels with the origin at the top-left corner.
    pub fn from_screen(screen: Vec2, viewport: Vec2, view_projection: Mat4) -> Self {
        let ndc = screen_to_ndc(screen, viewport);

        let near_clip = Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let inv_view_proj = view_projection.inverse();
        let near_world = inv_view_proj * near_clip;
        let far_world = inv_view_proj * far_clip;

        // Perspective divide
        let near_point = near_world.truncate() / near_world.w;
        let far_point = far_world.truncate() / far_world.w;

        Self {
            origin: near_point,
            direction: (far_point - near_point).normalize_or_zero(),
        }
    }

    /// Get a point along the ray at the given distance from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the nearest sphere intersection in front of
    /// the origin, if any.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        if a <= f32::EPSILON {
            return None;
        }
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        // Return the nearest positive intersection
        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// Window pixels to normalized device coordinates (`[-1, 1]`, +Y up).
pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
    let viewport = viewport.max(Vec2::ONE);
    Vec2::new(
        2.0 * screen.x / viewport.x - 1.0,
        1.0 - 2.0 * screen.y / viewport.y,
    )
}

/// A sphere collider centered on the entity's [`Transform`] position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        Self { radius }
    }

    /// Test the ray against this collider placed at `transform`.
    ///
    /// Uses the largest scale axis so the collider always encloses the mesh.
    pub fn intersect(&self, ray: &Ray, transform: &Transform) -> Option<f32> {
        let scale = transform.scale.max_element();
        ray.intersect_sphere(transform.position, self.radius * scale)
    }
}

/// Information about a ray-collider intersection.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// The entity that was hit.
    pub entity: hecs::Entity,
    /// Distance from ray origin to the hit point.
    pub distance: f32,
    /// World-space position of the hit point.
    pub point: Vec3,
}

/// Cast a ray against every visible collider and return the closest hit.
pub fn raycast(world: &hecs::World, ray: &Ray) -> Option<RayHit> {
    let mut query = world.query::<(&Transform, &Collider, &Visible)>();
    query
        .iter()
        .filter(|(_, (_, _, visible))| visible.0)
        .filter_map(|(entity, (transform, collider, _))| {
            collider.intersect(ray, transform).map(|distance| RayHit {
                entity,
                distance,
                point: ray.point_at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn ray_misses_sphere_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 50.0), Vec3::Z);
        assert_eq!(ray.intersect_sphere(Vec3::ZERO, 5.0), None);
    }

    #[test]
    fn ray_from_inside_sphere_hits_far_side() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_sphere(Vec3::ZERO, 1000.0).unwrap();
        assert!((t - 1000.0).abs() < 1e-2);
    }

    #[test]
    fn screen_center_maps_to_ndc_origin() {
        let ndc = screen_to_ndc(Vec2::new(640.0, 360.0), Vec2::new(1280.0, 720.0));
        assert_eq!(ndc, Vec2::ZERO);
        let corner = screen_to_ndc(Vec2::ZERO, Vec2::new(1280.0, 720.0));
        assert_eq!(corner, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn center_ray_follows_camera_forward() {
        // Home pose: (0, 50, 150) looking at the origin.
        let camera = Camera::default();
        let viewport = Vec2::new(1280.0, 720.0);
        let ray = Ray::from_screen(viewport * 0.5, viewport, camera.view_projection(16.0 / 9.0));
        assert!((ray.direction - camera.forward).length() < 1e-3);
        assert!(ray.intersect_sphere(Vec3::ZERO, 5.0).is_some());
    }

    #[test]
    fn raycast_picks_closest_visible() {
        let mut world = hecs::World::new();
        let near = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, 10.0)),
            Collider::sphere(1.0),
            Visible(true),
        ));
        let far = world.spawn((
            Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
            Collider::sphere(1.0),
            Visible(true),
        ));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z);

        assert_eq!(raycast(&world, &ray).map(|h| h.entity), Some(near));

        world.get::<&mut Visible>(near).unwrap().0 = false;
        assert_eq!(raycast(&world, &ray).map(|h| h.entity), Some(far));
    }
}
