//! Camera Module
//!
//! Camera control for the sky renderer: an orbit/free-fly/banked-flight
//! state machine that produces one [`CameraPose`] per frame.
//! This module is window-system agnostic - it only deals with camera state and math.

pub mod controller;
pub mod flight;
pub mod pose;

/// Pitch limit in radians, strictly inside ±1
pub const PITCH_LIMIT: f32 = 1.0 - 1e-3;
/// Narrowest field of view reachable by zooming
pub const FOV_MIN_DEGREES: f32 = 20.0;
/// Widest field of view reachable by zooming
pub const FOV_MAX_DEGREES: f32 = 110.0;

pub use controller::{
    CameraController, CameraMode, CameraUpdate, OrbitAngles, FOV_ZOOM_STEP_DEGREES,
    ORBIT_ANCHOR_OFFSET, ORBIT_PITCH_SENSITIVITY, ORBIT_YAW_SENSITIVITY,
};
pub use flight::{FlightInput, FlightKinematics, FlightStep, LookAngles, INTERACTION_SPEED_EPSILON};
pub use pose::{CameraBasis, CameraPose, direction_from_angles, wrap_yaw};
