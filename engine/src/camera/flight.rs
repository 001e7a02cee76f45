//! Flight Kinematics
//!
//! Integrator for the free-fly and banked-flight camera modes.
//!
//! - Look deltas rotate yaw/pitch directly (radians per pixel)
//! - Velocity follows the commanded velocity through an exponential low-pass:
//!   `v += (target - v) * (1 - exp(-rate * dt))`
//! - In banked flight, roll chases a target proportional to yaw rate and
//!   airspeed, and the up vector is rotated about forward by that roll

use glam::{Vec2, Vec3};

use super::pose::{CameraBasis, direction_from_angles, wrap_yaw};
use super::PITCH_LIMIT;
use crate::settings::FlightTuning;

/// Speed (m/s) below which a coasting camera counts as settled
pub const INTERACTION_SPEED_EPSILON: f32 = 0.05;

/// Yaw, pitch and roll in radians
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookAngles {
    /// Wrapped into [0, 2π)
    pub yaw: f32,
    /// Clamped to ±PITCH_LIMIT
    pub pitch: f32,
    /// Positive = banked right
    pub roll: f32,
}

/// Per-frame flight input, already filtered by pointer-capture state
#[derive(Clone, Copy, Debug, Default)]
pub struct FlightInput {
    /// Look delta in pixels (zero unless the pointer is captured)
    pub look_delta: Vec2,
    /// Camera-local movement request: x = right, y = up, z = forward
    pub movement: Vec3,
    pub boost: bool,
    pub brake: bool,
    /// Roll into turns this frame
    pub banking: bool,
}

/// What one integration step produced
#[derive(Clone, Copy, Debug, Default)]
pub struct FlightStep {
    /// Displacement to add to the camera position
    pub displacement: Vec3,
    /// Change in velocity divided by dt
    pub acceleration: Vec3,
    /// Magnitude of the commanded velocity
    pub commanded_speed: f32,
    /// Live look, live movement, or residual speed
    pub interacting: bool,
}

/// Flight state owned by the camera controller
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightKinematics {
    pub velocity: Vec3,
    pub look: LookAngles,
    /// Roll change per second during the last step
    pub roll_rate: f32,
}

impl FlightKinematics {
    /// Start from a heading with no motion and no roll.
    pub fn from_angles(yaw: f32, pitch: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            look: LookAngles {
                yaw: wrap_yaw(yaw),
                pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
                roll: 0.0,
            },
            roll_rate: 0.0,
        }
    }

    /// Unbanked basis from yaw/pitch.
    pub fn level_basis(&self) -> CameraBasis {
        let forward = direction_from_angles(self.look.yaw, self.look.pitch);
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        CameraBasis { right, up, forward }
    }

    /// Basis with the current roll applied about the forward axis.
    pub fn banked_basis(&self) -> CameraBasis {
        let level = self.level_basis();
        let (sin_r, cos_r) = self.look.roll.sin_cos();
        let up = level.up * cos_r + level.right * sin_r;
        let right = level.right * cos_r - level.up * sin_r;
        CameraBasis {
            right,
            up,
            forward: level.forward,
        }
    }

    /// Apply a look delta in pixels. Returns the (unwrapped) yaw change.
    pub fn apply_look(&mut self, delta: Vec2, sensitivity: f32) -> f32 {
        let yaw_change = delta.x * sensitivity;
        self.look.yaw = wrap_yaw(self.look.yaw + yaw_change);
        // Positive dy = pointer moved down = look down
        self.look.pitch = (self.look.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        yaw_change
    }

    /// Advance the integrator by `dt` seconds.
    pub fn step(&mut self, input: &FlightInput, tuning: &FlightTuning, dt: f32) -> FlightStep {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let yaw_change = self.apply_look(input.look_delta, tuning.look_sensitivity);
        let yaw_rate = if dt > 0.0 { yaw_change / dt } else { 0.0 };

        let basis = self.level_basis();
        let wish = basis.right * input.movement.x
            + basis.up * input.movement.y
            + basis.forward * input.movement.z;
        // Zero-length wish (no keys, or opposing keys) stays zero
        let wish_dir = wish.normalize_or_zero();

        let speed = if input.boost {
            tuning.speed * tuning.boost_multiplier
        } else {
            tuning.speed
        };
        let (target, rate) = if input.brake {
            (Vec3::ZERO, tuning.brake_response_rate)
        } else {
            (wish_dir * speed, tuning.response_rate)
        };

        let previous = self.velocity;
        self.velocity += (target - self.velocity) * response_blend(rate, dt);
        let acceleration = if dt > 0.0 {
            (self.velocity - previous) / dt
        } else {
            Vec3::ZERO
        };

        self.update_roll(input.banking, yaw_rate, tuning, dt);

        let airspeed = self.velocity.length();
        FlightStep {
            displacement: self.velocity * dt,
            acceleration,
            commanded_speed: target.length(),
            interacting: input.look_delta != Vec2::ZERO
                || wish_dir != Vec3::ZERO
                || airspeed > INTERACTION_SPEED_EPSILON,
        }
    }

    fn update_roll(&mut self, banking: bool, yaw_rate: f32, tuning: &FlightTuning, dt: f32) {
        let max_roll = tuning.max_roll_degrees.to_radians();
        let target_roll = if banking {
            // Faster flight banks harder; turning right (yaw increasing) banks right
            let speed_factor = (self.velocity.length() / tuning.bank_reference_speed).min(1.0);
            (yaw_rate * tuning.bank_strength * speed_factor).clamp(-max_roll, max_roll)
        } else {
            0.0
        };

        let previous = self.look.roll;
        self.look.roll += (target_roll - self.look.roll) * response_blend(tuning.bank_response_rate, dt);
        self.roll_rate = if dt > 0.0 {
            (self.look.roll - previous) / dt
        } else {
            0.0
        };
    }
}

/// Fraction of the remaining gap closed over `dt` at `rate` per second.
#[inline]
pub fn response_blend(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_stays_at_rest() {
        let mut flight = FlightKinematics::default();
        let step = flight.step(&FlightInput::default(), &FlightTuning::default(), 1.0 / 60.0);
        assert_eq!(flight.velocity, Vec3::ZERO);
        assert_eq!(step.displacement, Vec3::ZERO);
        assert!(!step.interacting);
    }

    #[test]
    fn test_opposing_keys_do_not_produce_nan() {
        let mut flight = FlightKinematics::default();
        let input = FlightInput {
            movement: Vec3::new(1.0, 0.0, 0.0) + Vec3::new(-1.0, 0.0, 0.0),
            ..Default::default()
        };
        flight.step(&input, &FlightTuning::default(), 0.016);
        assert!(flight.velocity.is_finite());
        assert_eq!(flight.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_brake_decays_velocity() {
        let mut flight = FlightKinematics::default();
        flight.velocity = Vec3::new(0.0, 0.0, -100.0);
        let input = FlightInput {
            movement: Vec3::Z,
            brake: true,
            ..Default::default()
        };
        let tuning = FlightTuning::default();
        flight.step(&input, &tuning, 0.5);
        let expected = 100.0 * (-tuning.brake_response_rate * 0.5).exp();
        assert!((flight.velocity.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_boost_raises_commanded_speed() {
        let tuning = FlightTuning::default();
        let mut flight = FlightKinematics::default();
        let step = flight.step(
            &FlightInput {
                movement: Vec3::Z,
                boost: true,
                ..Default::default()
            },
            &tuning,
            0.016,
        );
        assert!((step.commanded_speed - tuning.speed * tuning.boost_multiplier).abs() < 1e-3);
    }

    #[test]
    fn test_banked_basis_stays_orthonormal() {
        let mut flight = FlightKinematics::from_angles(0.7, 0.3);
        flight.look.roll = 0.4;
        let b = flight.banked_basis();
        assert!(b.up.dot(b.forward).abs() < 1e-5);
        assert!(b.right.dot(b.forward).abs() < 1e-5);
        assert!((b.up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_dt_is_harmless() {
        let mut flight = FlightKinematics::default();
        let step = flight.step(
            &FlightInput {
                movement: Vec3::Z,
                ..Default::default()
            },
            &FlightTuning::default(),
            0.0,
        );
        assert_eq!(step.acceleration, Vec3::ZERO);
        assert_eq!(flight.roll_rate, 0.0);
        assert!(flight.velocity.is_finite());
    }
}
