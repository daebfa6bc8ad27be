use glam::Vec3;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::input::Input;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// A damped camera controller that orbits around a target point.
///
/// Dragging with the left mouse button and scrolling feed pending deltas
/// that are applied a fraction (`damping`) at a time, so the camera keeps
/// gliding briefly after input stops.
///
/// While disabled, input is ignored and the pose is driven externally with
/// [`look_from`](Self::look_from).
///
/// # Example
/// ```ignore
/// let mut orbit = OrbitCamera::new()
///     .target(Vec3::ZERO)
///     .distance_limits(10.0, 500.0)
///     .looking_from(Vec3::new(0.0, 50.0, 150.0));
///
/// // In frame loop:
/// orbit.update(&input);
/// let camera = orbit.camera();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Whether mouse input moves the camera.
    pub enabled: bool,
    /// Fraction of the pending motion applied per update, in `(0, 1]`.
    pub damping: f32,
    /// Mouse sensitivity in radians per pixel.
    pub sensitivity: f32,
    /// Scroll zoom sensitivity (fraction of distance per wheel line).
    pub zoom_sensitivity: f32,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_elevation: f32,
    pending_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.3,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            enabled: true,
            damping: 0.05,
            sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_distance: 0.5,
            max_distance: 100.0,
            pending_azimuth: 0.0,
            pending_elevation: 0.0,
            pending_zoom: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set the near and far clip planes.
    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the damping factor. `1.0` disables smoothing.
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.001, 1.0);
        self
    }

    /// Set mouse sensitivity for interactive mode.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set scroll zoom sensitivity.
    pub fn zoom_sensitivity(mut self, sensitivity: f32) -> Self {
        self.zoom_sensitivity = sensitivity;
        self
    }

    /// Set distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// Builder form of [`look_from`](Self::look_from).
    pub fn looking_from(mut self, position: Vec3) -> Self {
        let target = self.target;
        self.look_from(position, target);
        self
    }

    /// Place the camera at `position` looking at `target`.
    ///
    /// Distance limits are not applied, and any pending drag or zoom motion
    /// is discarded.
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        let distance = offset.length();

        self.target = target;
        if distance > f32::EPSILON {
            self.distance = distance;
            self.elevation = (offset.y / distance)
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
            self.azimuth = offset.x.atan2(offset.z);
        }
        self.stop();
    }

    /// Discard pending motion.
    pub fn stop(&mut self) {
        self.pending_azimuth = 0.0;
        self.pending_elevation = 0.0;
        self.pending_zoom = 0.0;
    }

    /// Current camera position in world space.
    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        self.target + offset
    }

    /// Update the camera from this frame's input.
    pub fn update(&mut self, input: &Input) {
        if !self.enabled {
            return;
        }

        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta();
            self.pending_azimuth -= delta.x * self.sensitivity;
            self.pending_elevation += delta.y * self.sensitivity;
        }

        let scroll = input.scroll_delta();
        if scroll.y.abs() > 0.0 {
            self.pending_zoom -= scroll.y * self.zoom_sensitivity;
        }

        self.apply_pending();
    }

    fn apply_pending(&mut self) {
        let step = self.damping;

        self.azimuth += self.pending_azimuth * step;
        self.elevation = (self.elevation + self.pending_elevation * step)
            .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self.distance = (self.distance * (1.0 + self.pending_zoom * step))
            .clamp(self.min_distance, self.max_distance);

        let keep = 1.0 - step;
        self.pending_azimuth *= keep;
        self.pending_elevation *= keep;
        self.pending_zoom *= keep;
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        let position = self.position();

        Camera {
            position,
            forward: (self.target - position).normalize_or(Vec3::NEG_Z),
            up: Vec3::Y,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_from_round_trips_position() {
        let mut orbit = OrbitCamera::new();
        let position = Vec3::new(30.0, 7.5, -12.0);
        let target = Vec3::new(20.0, 0.0, -2.0);
        orbit.look_from(position, target);
        assert!((orbit.position() - position).length() < 1e-3);
        assert_eq!(orbit.target, target);
    }

    #[test]
    fn look_from_ignores_distance_limits() {
        let mut orbit = OrbitCamera::new().distance_limits(10.0, 500.0);
        orbit.look_from(Vec3::new(5.0, 2.5, 5.0), Vec3::ZERO);
        assert!(orbit.distance < 10.0);
    }

    #[test]
    fn disabled_camera_ignores_input() {
        let mut orbit = OrbitCamera::new().looking_from(Vec3::new(0.0, 50.0, 150.0));
        orbit.enabled = false;
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.move_mouse(glam::Vec2::new(200.0, 0.0));
        let before = orbit.position();
        orbit.update(&input);
        assert_eq!(orbit.position(), before);
    }

    #[test]
    fn drag_glides_with_damping() {
        let mut orbit = OrbitCamera::new()
            .distance_limits(10.0, 500.0)
            .looking_from(Vec3::new(0.0, 50.0, 150.0));
        let start = orbit.azimuth;

        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.move_mouse(glam::Vec2::new(-100.0, 0.0));
        orbit.update(&input);
        let after_drag = orbit.azimuth;
        assert!(after_drag > start);

        // Motion continues after the input stops.
        input.begin_frame();
        orbit.update(&input);
        assert!(orbit.azimuth > after_drag);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut orbit = OrbitCamera::new()
            .distance_limits(10.0, 500.0)
            .damping(1.0)
            .looking_from(Vec3::new(0.0, 0.0, 20.0));
        let mut input = Input::new();
        for _ in 0..50 {
            input.scroll(glam::Vec2::new(0.0, 10.0));
            orbit.update(&input);
            input.begin_frame();
        }
        assert_eq!(orbit.distance, 10.0);
    }
}
