//! Camera Tests - Orbit, Free-Fly and Banked Flight
//!
//! Drives the CameraController through FrameInput the way a host would.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use skyflight_engine::camera::{
    CameraController, CameraMode, OrbitAngles, ORBIT_YAW_SENSITIVITY, PITCH_LIMIT,
};
use skyflight_engine::input::{ActionState, FrameInput};
use skyflight_engine::settings::FlightTuning;

const DT: f32 = 1.0 / 60.0;

fn forward_held() -> ActionState {
    ActionState {
        forward: true,
        ..Default::default()
    }
}

// ============================================================================
// Orbit
// ============================================================================

#[test]
fn test_orbit_horizontal_drag_changes_yaw_only() {
    let mut camera = CameraController::default();
    let before = camera.orbit;

    let input = FrameInput {
        drag_delta: Vec2::new(100.0, 0.0),
        pointer_held: true,
        ..Default::default()
    };
    let update = camera.update(&input, &FlightTuning::default(), DT);

    assert!(update.interacting);
    let expected_yaw = before.yaw + 100.0 * ORBIT_YAW_SENSITIVITY;
    assert!((camera.orbit.yaw - expected_yaw).abs() < 1e-5);
    assert_eq!(camera.orbit.pitch, before.pitch);
}

#[test]
fn test_orbit_pitch_clamped_and_yaw_wrapped() {
    let mut camera = CameraController::default();
    let input = FrameInput {
        drag_delta: Vec2::new(5000.0, 100_000.0),
        pointer_held: true,
        ..Default::default()
    };
    camera.update(&input, &FlightTuning::default(), DT);

    assert_eq!(camera.orbit.pitch, -PITCH_LIMIT);
    assert!(camera.orbit.pitch.abs() < 1.0);
    assert!(camera.orbit.yaw >= 0.0 && camera.orbit.yaw < TAU);

    let forward = camera.pose().forward;
    assert!(forward.is_finite());
    assert!((forward.length() - 1.0).abs() < 1e-5);
}

#[test]
fn test_orbit_pointer_scale_applies() {
    let mut camera = CameraController::default();
    let input = FrameInput {
        drag_delta: Vec2::new(100.0, 0.0),
        pointer_held: true,
        pointer_scale: 0.5,
        ..Default::default()
    };
    camera.update(&input, &FlightTuning::default(), DT);
    let expected = OrbitAngles::default().yaw + 50.0 * ORBIT_YAW_SENSITIVITY;
    assert!((camera.orbit.yaw - expected).abs() < 1e-5);
}

#[test]
fn test_orbit_idle_is_not_interacting() {
    let mut camera = CameraController::default();
    let update = camera.update(&FrameInput::default(), &FlightTuning::default(), DT);
    assert!(!update.interacting);
}

// ============================================================================
// Free-fly
// ============================================================================

#[test]
fn test_free_fly_speed_approaches_cruise_exponentially() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
    let input = FrameInput {
        actions: forward_held(),
        ..Default::default()
    };

    // One second of held forward
    for _ in 0..60 {
        let update = camera.update(&input, &tuning, DT);
        assert!(update.interacting);
    }

    let expected = tuning.speed * (1.0 - (-tuning.response_rate * 1.0_f32).exp());
    let speed = camera.flight.velocity.length();
    assert!(
        (speed - expected).abs() < expected * 1e-3,
        "speed {} expected {}",
        speed,
        expected
    );
}

#[test]
fn test_free_fly_moves_along_forward() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
    let start = camera.position();
    let forward = camera.pose().forward;
    let input = FrameInput {
        actions: forward_held(),
        ..Default::default()
    };
    for _ in 0..30 {
        camera.update(&input, &tuning, DT);
    }
    let travelled = camera.position() - start;
    assert!(travelled.length() > 0.0);
    assert!(travelled.normalize().dot(forward) > 0.999);
}

#[test]
fn test_free_fly_look_bounds() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
    let input = FrameInput {
        look_delta: Vec2::new(1.0e6, -1.0e6),
        pointer_locked: true,
        ..Default::default()
    };
    camera.update(&input, &tuning, DT);

    assert_eq!(camera.flight.look.pitch, PITCH_LIMIT);
    assert!(camera.flight.look.pitch.abs() < 1.0);
    assert!(camera.flight.look.yaw >= 0.0 && camera.flight.look.yaw < TAU);
    assert!(camera.pose().forward.is_finite());
}

#[test]
fn test_free_fly_never_rolls() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
    let input = FrameInput {
        look_delta: Vec2::new(40.0, 0.0),
        pointer_locked: true,
        actions: forward_held(),
        ..Default::default()
    };
    for _ in 0..60 {
        camera.update(&input, &tuning, DT);
    }
    assert_eq!(camera.flight.look.roll, 0.0);
}

#[test]
fn test_coasting_to_rest_stops_interacting() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::FreeFly, 60.0);
    let input = FrameInput {
        actions: forward_held(),
        ..Default::default()
    };
    for _ in 0..30 {
        camera.update(&input, &tuning, DT);
    }

    let mut settled = false;
    for _ in 0..2000 {
        if !camera.update(&FrameInput::default(), &tuning, DT).interacting {
            settled = true;
            break;
        }
    }
    assert!(settled);
}

// ============================================================================
// Banked flight
// ============================================================================

#[test]
fn test_right_turn_banks_right() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::BankedFlight, 60.0);
    camera.flight.velocity = camera.pose().forward * tuning.bank_reference_speed;

    let input = FrameInput {
        look_delta: Vec2::new(20.0, 0.0),
        pointer_locked: true,
        actions: forward_held(),
        ..Default::default()
    };
    for _ in 0..30 {
        camera.update(&input, &tuning, DT);
    }

    let roll = camera.flight.look.roll;
    assert!(roll > 0.0);
    assert!(roll <= tuning.max_roll_degrees.to_radians() + 1e-5);

    // Banked right: the camera's up vector leans toward its right side
    let pose = camera.pose();
    let level_right = pose.forward.cross(Vec3::Y).normalize();
    assert!(pose.up.dot(level_right) > 0.0);
}

#[test]
fn test_banking_disabled_keeps_wings_level() {
    let tuning = FlightTuning {
        banking_enabled: false,
        ..Default::default()
    };
    let mut camera = CameraController::new(CameraMode::BankedFlight, 60.0);
    camera.flight.velocity = camera.pose().forward * tuning.speed;
    let input = FrameInput {
        look_delta: Vec2::new(20.0, 0.0),
        pointer_locked: true,
        ..Default::default()
    };
    for _ in 0..30 {
        camera.update(&input, &tuning, DT);
    }
    assert!(camera.flight.look.roll.abs() < 1e-6);
}

#[test]
fn test_switching_to_free_fly_levels_wings() {
    let tuning = FlightTuning::default();
    let mut camera = CameraController::new(CameraMode::BankedFlight, 60.0);
    camera.flight.look.roll = 0.5;
    assert!(camera.request_mode(CameraMode::FreeFly));
    assert_eq!(camera.flight.look.roll, 0.0);
    camera.update(&FrameInput::default(), &tuning, DT);
    assert!((camera.pose().up.dot(Vec3::Y)) > 0.0);
}
