//! Camera Controller Module
//!
//! Mode-switchable camera state machine. Converts one frame of raw input
//! into a [`CameraPose`] plus an "is interacting" flag that drives the
//! temporal blend rate and the fast scene-pass variant.
//!
//! Modes:
//! - **Orbit**: look around from a fixed anchor while the pointer is dragged
//! - **FreeFly**: captured-pointer look + damped six-direction movement
//! - **BankedFlight**: FreeFly that rolls into turns
//!
//! Window-system agnostic; input arrives as a [`FrameInput`].

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::flight::{FlightInput, FlightKinematics, FlightStep};
use super::pose::{CameraPose, direction_from_angles, wrap_yaw};
use super::{FOV_MAX_DEGREES, FOV_MIN_DEGREES, PITCH_LIMIT};
use crate::input::FrameInput;
use crate::settings::FlightTuning;

/// Orbit yaw sensitivity in radians per (scaled) pixel
pub const ORBIT_YAW_SENSITIVITY: f32 = 0.005;
/// Orbit pitch sensitivity in radians per (scaled) pixel
pub const ORBIT_PITCH_SENSITIVITY: f32 = 0.004;
/// Where the orbit camera sits relative to the scene center
pub const ORBIT_ANCHOR_OFFSET: Vec3 = Vec3::new(0.0, 350.0, 0.0);
/// Field-of-view change per wheel notch
pub const FOV_ZOOM_STEP_DEGREES: f32 = 2.0;

/// Camera control mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    Orbit,
    FreeFly,
    BankedFlight,
}

impl CameraMode {
    pub fn is_flight(self) -> bool {
        matches!(self, CameraMode::FreeFly | CameraMode::BankedFlight)
    }
}

/// Orbit-mode look angles in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitAngles {
    /// Wrapped into [0, 2π)
    pub yaw: f32,
    /// Clamped to ±PITCH_LIMIT
    pub pitch: f32,
}

impl Default for OrbitAngles {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.12, // Slightly up toward the cloud deck
        }
    }
}

impl OrbitAngles {
    /// Apply a drag delta in pixels, scaled by `scale`.
    pub fn apply_drag(&mut self, delta: Vec2, scale: f32) {
        self.yaw = wrap_yaw(self.yaw + delta.x * ORBIT_YAW_SENSITIVITY * scale);
        // Dragging down tilts the view down
        self.pitch = (self.pitch - delta.y * ORBIT_PITCH_SENSITIVITY * scale)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

/// Result of one controller update
#[derive(Clone, Copy, Debug)]
pub struct CameraUpdate {
    pub pose: CameraPose,
    pub interacting: bool,
}

/// Camera controller state
#[derive(Clone, Debug)]
pub struct CameraController {
    mode: CameraMode,
    pub orbit: OrbitAngles,
    pub flight: FlightKinematics,
    /// Eye position used by the flight modes
    position: Vec3,
    /// Point the orbit anchor is offset from
    scene_center: Vec3,
    pointer_locked: bool,
    fov_degrees: f32,
    /// Last integration result (telemetry)
    last_step: FlightStep,
    pose: CameraPose,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraMode::Orbit, 60.0)
    }
}

impl CameraController {
    pub fn new(mode: CameraMode, fov_degrees: f32) -> Self {
        let mut controller = Self {
            mode,
            orbit: OrbitAngles::default(),
            flight: FlightKinematics::default(),
            position: Vec3::ZERO,
            scene_center: Vec3::ZERO,
            pointer_locked: false,
            fov_degrees: fov_degrees.clamp(FOV_MIN_DEGREES, FOV_MAX_DEGREES),
            last_step: FlightStep::default(),
            pose: CameraPose::default(),
        };
        controller.position = controller.orbit_position();
        if mode.is_flight() {
            controller.flight = FlightKinematics::from_angles(controller.orbit.yaw, controller.orbit.pitch);
        }
        controller.pose = controller.compose_pose();
        controller
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Pose produced by the most recent update.
    #[inline]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    #[inline]
    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    #[inline]
    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Last flight integration step (zeroed in orbit mode).
    #[inline]
    pub fn last_step(&self) -> &FlightStep {
        &self.last_step
    }

    pub fn set_scene_center(&mut self, center: Vec3) {
        self.scene_center = center;
    }

    /// Replace the field of view (e.g. from a new settings snapshot).
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        if fov_degrees.is_finite() {
            self.fov_degrees = fov_degrees.clamp(FOV_MIN_DEGREES, FOV_MAX_DEGREES);
        }
    }

    /// Switch camera mode on an explicit request.
    ///
    /// Returns `true` if the mode actually changed; the caller must then
    /// force an accumulation reset since the pose jumps.
    pub fn request_mode(&mut self, mode: CameraMode) -> bool {
        if mode == self.mode {
            return false;
        }

        if mode.is_flight() && !self.mode.is_flight() {
            // Take off from wherever the orbit camera was looking
            self.position = self.pose.position;
            self.flight = FlightKinematics::from_angles(self.orbit.yaw, self.orbit.pitch);
        } else if mode.is_flight() {
            // FreeFly <-> BankedFlight keeps momentum but levels the wings
            self.flight.look.roll = 0.0;
            self.flight.roll_rate = 0.0;
        }

        log::info!("Camera mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.last_step = FlightStep::default();
        self.pose = self.compose_pose();
        true
    }

    /// Return to the default orientation for the current mode.
    pub fn reset(&mut self) {
        self.orbit = OrbitAngles::default();
        self.position = self.orbit_position();
        self.flight = FlightKinematics::from_angles(self.orbit.yaw, self.orbit.pitch);
        self.last_step = FlightStep::default();
        self.pose = self.compose_pose();
    }

    /// Advance one frame.
    pub fn update(&mut self, input: &FrameInput, tuning: &FlightTuning, dt: f32) -> CameraUpdate {
        self.pointer_locked = input.pointer_locked;

        let zooming = input.wheel != 0.0 && input.wheel.is_finite();
        if zooming {
            self.set_fov_degrees(self.fov_degrees - input.wheel * FOV_ZOOM_STEP_DEGREES);
        }

        let interacting = match self.mode {
            CameraMode::Orbit => {
                self.last_step = FlightStep::default();
                if input.pointer_held {
                    self.orbit.apply_drag(input.drag_delta, input.pointer_scale);
                }
                input.pointer_held || zooming
            }
            CameraMode::FreeFly | CameraMode::BankedFlight => {
                let flight_input = FlightInput {
                    // Look input only counts while the pointer is captured
                    look_delta: if self.pointer_locked {
                        input.look_delta
                    } else {
                        Vec2::ZERO
                    },
                    movement: input.actions.movement_axes(),
                    boost: input.actions.boost,
                    brake: input.actions.brake,
                    banking: self.mode == CameraMode::BankedFlight && tuning.banking_enabled,
                };
                let step = self.flight.step(&flight_input, tuning, dt);
                self.position += step.displacement;
                self.last_step = step;
                step.interacting || zooming
            }
        };

        self.pose = self.compose_pose();
        CameraUpdate {
            pose: self.pose,
            interacting,
        }
    }

    fn orbit_position(&self) -> Vec3 {
        self.scene_center + ORBIT_ANCHOR_OFFSET
    }

    fn compose_pose(&self) -> CameraPose {
        match self.mode {
            CameraMode::Orbit => CameraPose {
                position: self.orbit_position(),
                forward: direction_from_angles(self.orbit.yaw, self.orbit.pitch),
                up: Vec3::Y,
                fov_degrees: self.fov_degrees,
            },
            CameraMode::FreeFly | CameraMode::BankedFlight => {
                let basis = self.flight.banked_basis();
                CameraPose {
                    position: self.position,
                    forward: basis.forward,
                    up: basis.up,
                    fov_degrees: self.fov_degrees,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_orbit_at_anchor() {
        let camera = CameraController::default();
        assert_eq!(camera.mode(), CameraMode::Orbit);
        assert_eq!(camera.position(), ORBIT_ANCHOR_OFFSET);
    }

    #[test]
    fn test_request_same_mode_is_noop() {
        let mut camera = CameraController::default();
        assert!(!camera.request_mode(CameraMode::Orbit));
        assert!(camera.request_mode(CameraMode::FreeFly));
        assert!(!camera.request_mode(CameraMode::FreeFly));
    }

    #[test]
    fn test_take_off_from_orbit_pose() {
        let mut camera = CameraController::default();
        let before = camera.pose();
        camera.request_mode(CameraMode::FreeFly);
        let after = camera.pose();
        assert!((after.position - before.position).length() < 1e-4);
        assert!((after.forward - before.forward).length() < 1e-4);
        assert_eq!(camera.flight.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_orbit_ignores_drag_when_not_held() {
        let mut camera = CameraController::default();
        let input = FrameInput {
            drag_delta: Vec2::new(100.0, 40.0),
            ..Default::default()
        };
        let update = camera.update(&input, &FlightTuning::default(), 0.016);
        assert!(!update.interacting);
        assert_eq!(camera.orbit, OrbitAngles::default());
    }

    #[test]
    fn test_wheel_zooms_fov_within_limits() {
        let mut camera = CameraController::default();
        let input = FrameInput {
            wheel: 1.0,
            ..Default::default()
        };
        camera.update(&input, &FlightTuning::default(), 0.016);
        assert!((camera.fov_degrees() - (60.0 - FOV_ZOOM_STEP_DEGREES)).abs() < 1e-5);

        let input = FrameInput {
            wheel: -1000.0,
            ..Default::default()
        };
        camera.update(&input, &FlightTuning::default(), 0.016);
        assert_eq!(camera.fov_degrees(), FOV_MAX_DEGREES);
    }

    #[test]
    fn test_flight_look_requires_capture() {
        let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
        let yaw = camera.flight.look.yaw;
        let input = FrameInput {
            look_delta: Vec2::new(50.0, 0.0),
            pointer_locked: false,
            ..Default::default()
        };
        let update = camera.update(&input, &FlightTuning::default(), 0.016);
        assert_eq!(camera.flight.look.yaw, yaw);
        assert!(!update.interacting);
    }
}
