//! Frame Telemetry
//!
//! FPS and flight data published once per frame for the host to display.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::camera::{CameraController, CameraPose};
use crate::settings::FlightTuning;

/// Standard gravity (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Frames-per-second averaged over a fixed window
#[derive(Clone, Debug)]
pub struct FpsCounter {
    window: f32,
    elapsed: f32,
    frames: u32,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FpsCounter {
    pub fn new(window_seconds: f32) -> Self {
        Self {
            window: window_seconds.max(0.01),
            elapsed: 0.0,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one frame. Returns the new average when a window completes.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.window {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Flight instruments, present only in the flight modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightData {
    /// m/s
    pub airspeed: f32,
    /// Meters above the ground plane
    pub altitude: f32,
    /// Degrees in [0, 360), 0 = -Z, 90 = +X
    pub heading_deg: f32,
    pub pitch_deg: f32,
    /// Positive = right wing down
    pub roll_deg: f32,
    /// Commanded speed over the maximum boosted speed, in [0, 1]
    pub throttle: f32,
    /// |acceleration - gravity| / g
    pub g_force: f32,
}

impl FlightData {
    pub fn from_controller(controller: &CameraController, tuning: &FlightTuning, ground_height: f32) -> Self {
        let flight = &controller.flight;
        let step = controller.last_step();
        let max_speed = tuning.speed * tuning.boost_multiplier.max(1.0);
        let throttle = if max_speed > 0.0 {
            (step.commanded_speed / max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            airspeed: flight.velocity.length(),
            altitude: controller.position().y - ground_height,
            heading_deg: flight.look.yaw.rem_euclid(TAU).to_degrees(),
            pitch_deg: flight.look.pitch.to_degrees(),
            roll_deg: flight.look.roll.to_degrees(),
            throttle,
            g_force: g_force(step.acceleration),
        }
    }
}

/// Load factor felt by the pilot: 1 at rest, 0 in free fall.
pub fn g_force(acceleration: Vec3) -> f32 {
    (acceleration + Vec3::new(0.0, GRAVITY, 0.0)).length() / GRAVITY
}

/// Everything published after a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTelemetry {
    pub fps: f32,
    pub camera_position: Vec3,
    pub flight: Option<FlightData>,
}

impl FrameTelemetry {
    pub fn new(fps: f32, pose: &CameraPose, flight: Option<FlightData>) -> Self {
        Self {
            fps,
            camera_position: pose.position,
            flight,
        }
    }

    /// One-line summary for a window title.
    pub fn summary(&self) -> String {
        match &self.flight {
            Some(flight) => format!(
                "FPS: {:.0} | {:.0} m/s | Alt {:.0} m | Hdg {:03.0} | Pitch {:+.0} | Roll {:+.0} | Thr {:.0}% | {:.1} g",
                self.fps,
                flight.airspeed,
                flight.altitude,
                flight.heading_deg,
                flight.pitch_deg,
                flight.roll_deg,
                flight.throttle * 100.0,
                flight.g_force
            ),
            None => format!(
                "FPS: {:.0} | Camera ({:.0}, {:.0}, {:.0})",
                self.fps, self.camera_position.x, self.camera_position.y, self.camera_position.z
            ),
        }
    }
}
