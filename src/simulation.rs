//! Per-frame orchestration: motion, picking, and the focus animation.
//!
//! [`SimulationContext`] owns everything the renderer reads: the ECS world,
//! the camera rig and the current [`FocusPhase`]. It never touches the GPU,
//! so the whole click-to-focus flow runs headless in tests.

use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use winit::keyboard::KeyCode;

use crate::bodies::{CelestialBodyConfig, PLANETS};
use crate::camera::Camera;
use crate::config::{CameraConfig, Config, SimulationConfig};
use crate::draw2d::Color;
use crate::ecs::{AttachedTo, EmphasisLight, Light, Material, Starfield, Visible};
use crate::focus::{FocusEvent, FocusPhase, FocusTiming, focus_pose, lerp_pose};
use crate::input::Input;
use crate::kinematics::{self, Planet, PlanetState};
use crate::mesh::Transform;
use crate::orbit_camera::OrbitCamera;
use crate::picking::{Ray, raycast};
use crate::scene::{SceneHandles, build_scene};

/// Emissive applied to the focused planet's material.
const FOCUS_EMISSIVE: u32 = 0x222222;

/// Intensity of the camera-side light added on arrival.
const EMPHASIS_INTENSITY: f32 = 2.0;

/// The running solar system.
pub struct SimulationContext {
    pub world: World,
    pub orbit: OrbitCamera,
    pub handles: SceneHandles,
    phase: FocusPhase,
    settings: SimulationConfig,
    home_position: Vec3,
    /// Entities hidden on arrival, restored on reset.
    hidden: Vec<Entity>,
    emphasis: Option<Entity>,
    /// Focused planet and its material emissive before the boost.
    saved_emissive: Option<(Entity, Color, f32)>,
    /// Planet shown in the info panel.
    info: Option<usize>,
}

impl SimulationContext {
    /// Build the scene and place the camera at its home pose.
    pub fn new(config: &Config) -> Self {
        let seed = config.simulation.phase_seed.unwrap_or_else(clock_seed);
        let mut world = World::new();
        let handles = build_scene(&mut world, seed);
        let home_position = Vec3::from_array(config.camera.home_position);

        Self {
            world,
            orbit: orbit_from_config(&config.camera, home_position),
            handles,
            phase: FocusPhase::Overview,
            settings: config.simulation.clone(),
            home_position,
            hidden: Vec::new(),
            emphasis: None,
            saved_emissive: None,
            info: None,
        }
    }

    pub fn phase(&self) -> &FocusPhase {
        &self.phase
    }

    pub fn camera(&self) -> Camera {
        self.orbit.camera()
    }

    /// Body whose details the info panel shows, if any.
    pub fn info_panel(&self) -> Option<&'static CelestialBodyConfig> {
        self.info.map(|index| &PLANETS[index])
    }

    fn timing(&self) -> FocusTiming {
        FocusTiming {
            travel: self.settings.travel_duration,
            hold: self.settings.focus_hold,
        }
    }

    /// Advance the simulation by `dt` seconds using this frame's input.
    ///
    /// `viewport` is the window size in pixels, used to unproject clicks.
    pub fn update(&mut self, dt: f32, input: &Input, viewport: Vec2) {
        if input.key_pressed(KeyCode::Escape) {
            self.reset_view();
        }
        if let Some(screen) = input.left_click() {
            self.handle_click(screen, viewport);
        }

        kinematics::step(
            &mut self.world,
            dt,
            self.settings.days_per_second,
            self.settings.spin_scale,
        );

        self.orbit.update(input);
        self.update_focus(dt);
    }

    /// Try to select the planet under `screen` (window pixels).
    ///
    /// Only honored in the overview. Returns the selected planet.
    pub fn handle_click(&mut self, screen: Vec2, viewport: Vec2) -> Option<Entity> {
        if !self.phase.is_overview() {
            return None;
        }

        let aspect = viewport.x / viewport.y.max(1.0);
        let ray = Ray::from_screen(screen, viewport, self.camera().view_projection(aspect));
        let hit = raycast(&self.world, &ray)?;
        let index = self.world.get::<&Planet>(hit.entity).ok()?.0;

        self.phase = FocusPhase::begin(hit.entity, index, self.orbit.position(), self.orbit.target);
        self.orbit.enabled = false;
        self.orbit.stop();
        self.info = Some(index);

        tracing::info!(planet = PLANETS[index].name, "Focusing");
        Some(hit.entity)
    }

    fn update_focus(&mut self, dt: f32) {
        let timing = self.timing();
        let event = self.phase.step(dt, timing);

        if let FocusPhase::Focusing {
            target,
            progress,
            start_position,
            start_target,
            ..
        } = self.phase
        {
            self.move_camera_toward(target, (start_position, start_target), progress);
        }

        match event {
            Some(FocusEvent::Arrived) => self.arrive(),
            Some(FocusEvent::Expired) => {
                tracing::info!("Focus hold expired");
                self.reset_view();
            }
            None => {}
        }
    }

    fn target_pose(&self, target: Entity) -> Option<(Vec3, Vec3)> {
        let index = self.world.get::<&Planet>(target).ok()?.0;
        let position = self.world.get::<&Transform>(target).ok()?.position;
        Some(focus_pose(
            position,
            PLANETS[index].view_distance(self.settings.view_distance_factor),
        ))
    }

    fn move_camera_toward(&mut self, target: Entity, start: (Vec3, Vec3), progress: f32) {
        if let Some(end) = self.target_pose(target) {
            let (position, look_at) = lerp_pose(start, end, progress);
            self.orbit.look_from(position, look_at);
        }
    }

    /// Camera reached the target: isolate and freeze it.
    fn arrive(&mut self) {
        let Some((target, index)) = self.phase.selected() else {
            return;
        };

        if let Some((position, look_at)) = self.target_pose(target) {
            self.orbit.look_from(position, look_at);
        }

        for (entity, (visible, starfield, attached)) in self
            .world
            .query_mut::<(&mut Visible, Option<&Starfield>, Option<&AttachedTo>)>()
        {
            let keep = entity == target
                || starfield.is_some()
                || attached.is_some_and(|a| a.parent == target);
            if !keep && visible.0 {
                visible.0 = false;
                self.hidden.push(entity);
            }
        }

        if let Ok(mut state) = self.world.get::<&mut PlanetState>(target) {
            state.focus_stopped = true;
        }

        if let Ok(mut material) = self.world.get::<&mut Material>(target) {
            self.saved_emissive = Some((target, material.emissive, material.emissive_intensity));
            material.emissive = Color::from_hex(FOCUS_EMISSIVE);
            material.emissive_intensity = 1.0;
        }

        // Lit from the camera's side of the planet, with no range cutoff.
        let position = self.orbit.position();
        let center = self
            .world
            .get::<&Transform>(target)
            .map(|t| t.position)
            .unwrap_or(position);
        self.emphasis = Some(self.world.spawn((
            EmphasisLight,
            Light::point(Color::WHITE, EMPHASIS_INTENSITY, 0.0),
            Transform::from_position(position),
            AttachedTo::new(target).with_offset(position - center),
        )));

        tracing::info!(
            planet = PLANETS[index].name,
            hidden = self.hidden.len(),
            "Focused"
        );
    }

    /// Return to the overview: everything visible and moving, camera home.
    pub fn reset_view(&mut self) {
        for entity in self.hidden.drain(..) {
            if let Ok(mut visible) = self.world.get::<&mut Visible>(entity) {
                visible.0 = true;
            }
        }

        if let Some(light) = self.emphasis.take() {
            let _ = self.world.despawn(light);
        }

        if let Some((entity, emissive, intensity)) = self.saved_emissive.take()
            && let Ok(mut material) = self.world.get::<&mut Material>(entity)
        {
            material.emissive = emissive;
            material.emissive_intensity = intensity;
        }

        for (_, state) in self.world.query_mut::<&mut PlanetState>() {
            state.focus_stopped = false;
        }

        self.orbit.enabled = true;
        self.orbit.look_from(self.home_position, Vec3::ZERO);
        self.phase = FocusPhase::Overview;
        self.info = None;

        tracing::info!("View reset");
    }
}

fn orbit_from_config(camera: &CameraConfig, home: Vec3) -> OrbitCamera {
    OrbitCamera::new()
        .fov(camera.fov_degrees)
        .clip(camera.near, camera.far)
        .damping(camera.damping)
        .sensitivity(camera.rotate_sensitivity)
        .zoom_sensitivity(camera.zoom_sensitivity)
        .distance_limits(camera.min_distance, camera.max_distance)
        .target(Vec3::ZERO)
        .looking_from(home)
}

fn clock_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
    const EARTH: usize = 2;

    fn context() -> SimulationContext {
        let mut config = Config::default();
        config.simulation.phase_seed = Some(5);
        let mut sim = SimulationContext::new(&config);

        // Spread planets evenly so Earth sits alone between the camera and the sun.
        for (_, (planet, state)) in sim.world.query_mut::<(&Planet, &mut PlanetState)>() {
            state.orbit_angle = planet.0 as f32 * FRAC_PI_2 / 2.0;
        }
        kinematics::step(&mut sim.world, 0.0, 1.0, 0.01);
        sim
    }

    fn screen_position(sim: &SimulationContext, entity: Entity) -> Vec2 {
        let position = sim.world.get::<&Transform>(entity).unwrap().position;
        let clip = sim.camera().view_projection(VIEWPORT.x / VIEWPORT.y) * position.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * VIEWPORT.x,
            (1.0 - ndc.y) * 0.5 * VIEWPORT.y,
        )
    }

    fn focus_stopped(sim: &SimulationContext, entity: Entity) -> bool {
        sim.world.get::<&PlanetState>(entity).unwrap().focus_stopped
    }

    fn all_visible(sim: &SimulationContext) -> bool {
        sim.world.query::<&Visible>().iter().all(|(_, v)| v.0)
    }

    #[test]
    fn click_on_empty_space_stays_in_overview() {
        let mut sim = context();
        assert_eq!(sim.handle_click(Vec2::new(5.0, 5.0), VIEWPORT), None);
        assert!(sim.phase().is_overview());
        assert!(sim.info_panel().is_none());
        assert!(sim.orbit.enabled);
    }

    #[test]
    fn click_selects_planet_under_cursor() {
        let mut sim = context();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);

        assert_eq!(sim.handle_click(screen, VIEWPORT), Some(earth));
        assert!(matches!(sim.phase(), FocusPhase::Focusing { target, .. } if *target == earth));
        assert_eq!(sim.info_panel().map(|b| b.name), Some("Earth"));
        assert!(!sim.orbit.enabled);
    }

    #[test]
    fn full_focus_cycle() {
        let mut sim = context();
        let input = Input::new();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);
        sim.handle_click(screen, VIEWPORT);

        sim.update(1.0, &input, VIEWPORT);
        assert!(matches!(sim.phase(), FocusPhase::Focusing { .. }));
        assert!(!focus_stopped(&sim, earth));

        sim.update(1.1, &input, VIEWPORT);
        assert!(sim.phase().is_focused());
        assert!(focus_stopped(&sim, earth));
        assert!(sim.world.get::<&Visible>(earth).unwrap().0);
        assert!(sim.world.get::<&Visible>(sim.handles.starfield).unwrap().0);
        assert!(!sim.world.get::<&Visible>(sim.handles.sun).unwrap().0);
        assert!(!sim.world.get::<&Visible>(sim.handles.planets[0]).unwrap().0);
        assert_eq!(sim.world.query::<&EmphasisLight>().iter().count(), 1);

        // Parked at the focus pose.
        let position = sim.world.get::<&Transform>(earth).unwrap().position;
        assert!((sim.orbit.target - position).length() < 1e-3);
        let expected = position + Vec3::new(10.0, 5.0, 10.0);
        assert!((sim.orbit.position() - expected).length() < 1e-2);

        // Frozen while focused.
        sim.update(4.0, &input, VIEWPORT);
        assert!(sim.phase().is_focused());
        assert_eq!(sim.world.get::<&Transform>(earth).unwrap().position, position);

        sim.update(1.5, &input, VIEWPORT);
        assert!(sim.phase().is_overview());
        assert!(!focus_stopped(&sim, earth));
        assert!(all_visible(&sim));
        assert!(sim.info_panel().is_none());
        assert_eq!(sim.world.query::<&EmphasisLight>().iter().count(), 0);
        assert!(sim.orbit.enabled);
    }

    #[test]
    fn clicks_ignored_while_focusing() {
        let mut sim = context();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);
        sim.handle_click(screen, VIEWPORT);

        assert_eq!(sim.handle_click(screen, VIEWPORT), None);
        assert!(matches!(sim.phase(), FocusPhase::Focusing { progress, .. } if *progress == 0.0));
    }

    #[test]
    fn clicks_ignored_while_focused() {
        let mut sim = context();
        let input = Input::new();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);
        sim.handle_click(screen, VIEWPORT);
        sim.update(2.5, &input, VIEWPORT);
        assert!(sim.phase().is_focused());

        let phase = *sim.phase();
        let screen = screen_position(&sim, earth);
        assert_eq!(sim.handle_click(screen, VIEWPORT), None);
        assert_eq!(*sim.phase(), phase);
    }

    #[test]
    fn escape_while_focused_returns_to_overview() {
        let mut sim = context();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);
        sim.handle_click(screen, VIEWPORT);
        sim.update(2.1, &Input::new(), VIEWPORT);
        assert!(sim.phase().is_focused());

        let mut input = Input::new();
        input.press_key(KeyCode::Escape);
        sim.update(0.1, &input, VIEWPORT);

        assert!(sim.phase().is_overview());
        assert!(all_visible(&sim));
        assert!(!focus_stopped(&sim, earth));
        assert_eq!(sim.world.query::<&EmphasisLight>().iter().count(), 0);
        assert!(sim.info_panel().is_none());
        assert!(sim.orbit.enabled);

        // A fresh focus gets the full hold.
        let screen = screen_position(&sim, earth);
        assert_eq!(sim.handle_click(screen, VIEWPORT), Some(earth));
        sim.update(2.1, &Input::new(), VIEWPORT);
        assert!(matches!(
            sim.phase(),
            FocusPhase::Focused { target, remaining, .. } if *target == earth && *remaining == 5.0
        ));
    }

    #[test]
    fn emphasis_light_reaches_every_focused_planet() {
        for (index, body) in PLANETS.iter().enumerate() {
            let mut sim = context();
            let planet = sim.handles.planets[index];
            sim.phase = FocusPhase::begin(planet, index, sim.orbit.position(), sim.orbit.target);
            sim.update(2.5, &Input::new(), VIEWPORT);
            assert!(sim.phase().is_focused(), "{} not focused", body.name);

            let center = sim.world.get::<&Transform>(planet).unwrap().position;
            let mut lights = sim.world.query::<(&EmphasisLight, &Light, &Transform)>();
            let (_, (_, light, transform)) = lights.iter().next().unwrap();
            let Light::Point { range, .. } = *light else {
                panic!("emphasis light is not a point light");
            };
            let gap = transform.position.distance(center) - body.radius;
            assert!(
                range == 0.0 || gap < range,
                "{}: surface {gap} beyond range {range}",
                body.name
            );
        }
    }

    #[test]
    fn reset_restores_scene() {
        let mut sim = context();
        let input = Input::new();
        let earth = sim.handles.planets[EARTH];
        let screen = screen_position(&sim, earth);
        sim.handle_click(screen, VIEWPORT);
        sim.update(3.0, &input, VIEWPORT);
        assert!(sim.phase().is_focused());
        let boosted = sim.world.get::<&Material>(earth).unwrap().emissive;
        assert_eq!(boosted, Color::from_hex(FOCUS_EMISSIVE));

        sim.reset_view();

        assert!(sim.phase().is_overview());
        assert!(all_visible(&sim));
        assert!(sim.handles.planets.iter().all(|&p| !focus_stopped(&sim, p)));
        assert_eq!(sim.world.get::<&Material>(earth).unwrap().emissive, Color::BLACK);
        assert!((sim.orbit.position() - Vec3::new(0.0, 50.0, 150.0)).length() < 1e-3);
        assert_eq!(sim.orbit.target, Vec3::ZERO);
    }

    #[test]
    fn planets_keep_their_orbit_radius() {
        let mut sim = context();
        let input = Input::new();
        for _ in 0..200 {
            sim.update(0.5, &input, VIEWPORT);
            for (_, (planet, transform)) in sim.world.query::<(&Planet, &Transform)>().iter() {
                let p = transform.position;
                let r = (p.x * p.x + p.z * p.z).sqrt();
                assert!((r - planet.body().orbital_distance).abs() < 1e-2);
            }
        }
    }
}
