//! Camera Pose
//!
//! The per-frame output of the camera controller. Every downstream stage
//! (scene pass, reprojection, light projection) only reads poses.

use std::f32::consts::TAU;

use glam::Vec3;

/// Camera position and orientation for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// World-space eye position
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    /// Unit up vector (includes roll in banked flight)
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_degrees: 60.0,
        }
    }
}

/// Orthonormal right/up/forward frame derived from a pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl CameraPose {
    /// Tangent of half the vertical field of view.
    #[inline]
    pub fn tan_half_fov(&self) -> f32 {
        (self.fov_degrees.to_radians() * 0.5).tan()
    }

    /// Build an orthonormal basis from `forward` and `up`.
    ///
    /// Degenerate input (zero-length forward, or up parallel to forward)
    /// falls back to a valid frame instead of producing NaNs.
    pub fn basis(&self) -> CameraBasis {
        let forward = {
            let f = self.forward.normalize_or_zero();
            if f == Vec3::ZERO { Vec3::NEG_Z } else { f }
        };

        let mut right = forward.cross(self.up).normalize_or_zero();
        if right == Vec3::ZERO {
            // up is parallel to forward; any perpendicular will do
            right = forward.cross(Vec3::Z).normalize_or_zero();
            if right == Vec3::ZERO {
                right = forward.cross(Vec3::X).normalize_or_zero();
            }
        }
        let up = right.cross(forward);

        CameraBasis { right, up, forward }
    }
}

/// Unit direction for a yaw/pitch pair.
///
/// yaw = 0, pitch = 0 looks toward -Z; positive yaw turns toward +X,
/// positive pitch looks up.
#[inline]
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

/// Wrap an angle into [0, 2π).
#[inline]
pub fn wrap_yaw(yaw: f32) -> f32 {
    if !yaw.is_finite() {
        return 0.0;
    }
    let wrapped = yaw.rem_euclid(TAU);
    // rem_euclid of a tiny negative value can round up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_yaw_range() {
        for yaw in [-1e-9, -TAU, -100.0, 0.0, TAU, 3.0 * TAU + 0.5, 1e7] {
            let w = wrap_yaw(yaw);
            assert!((0.0..TAU).contains(&w), "yaw {yaw} wrapped to {w}");
        }
        assert_eq!(wrap_yaw(f32::NAN), 0.0);
    }

    #[test]
    fn test_basis_orthonormal() {
        let pose = CameraPose {
            forward: Vec3::new(0.3, -0.2, -1.0).normalize(),
            up: Vec3::new(0.1, 1.0, 0.0).normalize(),
            ..Default::default()
        };
        let b = pose.basis();
        assert!(b.right.dot(b.up).abs() < 1e-5);
        assert!(b.right.dot(b.forward).abs() < 1e-5);
        assert!(b.up.dot(b.forward).abs() < 1e-5);
        assert!((b.right.length() - 1.0).abs() < 1e-5);
        assert!((b.up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_basis_degenerate_inputs() {
        let pose = CameraPose {
            forward: Vec3::ZERO,
            up: Vec3::ZERO,
            ..Default::default()
        };
        let b = pose.basis();
        assert!(b.forward.is_finite() && b.right.is_finite() && b.up.is_finite());
        assert!((b.right.length() - 1.0).abs() < 1e-5);

        let looking_up = CameraPose {
            forward: Vec3::Y,
            up: Vec3::Y,
            ..Default::default()
        };
        let b = looking_up.basis();
        assert!((b.up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_direction_convention() {
        let d = direction_from_angles(0.0, 0.0);
        assert!((d - Vec3::NEG_Z).length() < 1e-6);
        let d = direction_from_angles(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((d - Vec3::X).length() < 1e-6);
    }
}
