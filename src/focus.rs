//! Phases of the click-to-focus camera animation.
//!
//! ```text
//! Overview --click hit--> Focusing --progress >= 1--> Focused --hold expires--> Overview
//! ```
//!
//! [`FocusPhase`] only tracks time. Applying the scene side effects
//! (hiding bodies, freezing the target, moving the camera) is the job of
//! [`SimulationContext`](crate::SimulationContext).

use glam::Vec3;

/// Durations driving the focus animation, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusTiming {
    pub travel: f32,
    pub hold: f32,
}

impl Default for FocusTiming {
    fn default() -> Self {
        Self {
            travel: 2.0,
            hold: 5.0,
        }
    }
}

/// Transition produced by [`FocusPhase::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusEvent {
    /// The camera reached the target; the phase is now `Focused`.
    Arrived,
    /// The hold ran out; the view should reset.
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FocusPhase {
    /// Free orbit controls, everything visible.
    Overview,
    /// Camera flying from its recorded start pose toward `target`.
    Focusing {
        target: hecs::Entity,
        /// Row of the target in [`PLANETS`](crate::bodies::PLANETS).
        planet: usize,
        /// Travel progress in `[0, 1]`.
        progress: f32,
        start_position: Vec3,
        start_target: Vec3,
    },
    /// Camera parked at the target for `remaining` more seconds.
    Focused {
        target: hecs::Entity,
        planet: usize,
        remaining: f32,
    },
}

impl FocusPhase {
    /// Begin travelling toward `target` from the given camera pose.
    pub fn begin(
        target: hecs::Entity,
        planet: usize,
        start_position: Vec3,
        start_target: Vec3,
    ) -> Self {
        FocusPhase::Focusing {
            target,
            planet,
            progress: 0.0,
            start_position,
            start_target,
        }
    }

    pub fn is_overview(&self) -> bool {
        matches!(self, FocusPhase::Overview)
    }

    pub fn is_focused(&self) -> bool {
        matches!(self, FocusPhase::Focused { .. })
    }

    /// Selected entity and its planet index, if any.
    pub fn selected(&self) -> Option<(hecs::Entity, usize)> {
        match *self {
            FocusPhase::Overview => None,
            FocusPhase::Focusing { target, planet, .. }
            | FocusPhase::Focused { target, planet, .. } => Some((target, planet)),
        }
    }

    /// Advance timers by `dt` seconds.
    ///
    /// Travel progress clamps at 1 on arrival. An expired hold leaves the
    /// phase as is; the caller resets the view.
    pub fn step(&mut self, dt: f32, timing: FocusTiming) -> Option<FocusEvent> {
        match self {
            FocusPhase::Overview => None,
            FocusPhase::Focusing {
                target,
                planet,
                progress,
                ..
            } => {
                *progress += dt / timing.travel.max(f32::EPSILON);
                if *progress >= 1.0 {
                    *progress = 1.0;
                    let (target, planet) = (*target, *planet);
                    *self = FocusPhase::Focused {
                        target,
                        planet,
                        remaining: timing.hold,
                    };
                    Some(FocusEvent::Arrived)
                } else {
                    None
                }
            }
            FocusPhase::Focused { remaining, .. } => {
                *remaining -= dt;
                (*remaining <= 0.0).then_some(FocusEvent::Expired)
            }
        }
    }
}

/// Camera position and look target for viewing a body at `center` from
/// `view_distance` away.
///
/// The camera sits above and off to the side at `center + (v, v/2, v)`.
pub fn focus_pose(center: Vec3, view_distance: f32) -> (Vec3, Vec3) {
    let v = view_distance;
    (center + Vec3::new(v, 0.5 * v, v), center)
}

/// Linear blend between two camera poses.
pub fn lerp_pose(start: (Vec3, Vec3), end: (Vec3, Vec3), t: f32) -> (Vec3, Vec3) {
    let t = t.clamp(0.0, 1.0);
    (start.0.lerp(end.0, t), start.1.lerp(end.1, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> hecs::Entity {
        hecs::World::new().spawn(())
    }

    #[test]
    fn travel_then_hold_then_expire() {
        let timing = FocusTiming::default();
        let mut phase = FocusPhase::begin(entity(), 2, Vec3::ZERO, Vec3::ZERO);

        assert_eq!(phase.step(1.0, timing), None);
        assert!(matches!(phase, FocusPhase::Focusing { progress, .. } if (progress - 0.5).abs() < 1e-6));

        assert_eq!(phase.step(1.5, timing), Some(FocusEvent::Arrived));
        assert!(phase.is_focused());

        assert_eq!(phase.step(4.0, timing), None);
        assert_eq!(phase.step(1.0, timing), Some(FocusEvent::Expired));
    }

    #[test]
    fn overview_ignores_time() {
        let mut phase = FocusPhase::Overview;
        assert_eq!(phase.step(100.0, FocusTiming::default()), None);
        assert!(phase.is_overview());
        assert_eq!(phase.selected(), None);
    }

    #[test]
    fn focus_pose_offsets_by_view_distance() {
        let (eye, target) = focus_pose(Vec3::new(40.0, 0.0, 0.0), 10.0);
        assert_eq!(target, Vec3::new(40.0, 0.0, 0.0));
        assert_eq!(eye, Vec3::new(50.0, 5.0, 10.0));
    }

    #[test]
    fn lerp_pose_endpoints() {
        let start = (Vec3::new(0.0, 50.0, 150.0), Vec3::ZERO);
        let end = (Vec3::new(10.0, 5.0, 10.0), Vec3::X);
        assert_eq!(lerp_pose(start, end, 0.0), start);
        assert_eq!(lerp_pose(start, end, 1.0), end);
        assert_eq!(lerp_pose(start, end, 2.0), end);
    }
}
