use glam::{Mat4, Vec3};

/// A perspective camera for the 3D scene.
///
/// Produced each frame by [`OrbitCamera::camera`](crate::OrbitCamera::camera)
/// and consumed by the mesh pass and the picking ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 50.0, 150.0),
            forward: Vec3::new(0.0, -50.0, -150.0).normalize(),
            up: Vec3::Y,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl Camera {
    /// World-to-view transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// View-to-clip transform with wgpu's `[0, 1]` depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    /// Combined projection × view matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
