//! Light Projection
//!
//! Projects the directional light into screen space for the light-shaft
//! pass. A light in front of the camera lands at its perspective position,
//! pulled in along the ray from the screen center when it lies too far out.
//! A light behind the camera sits on that same limiting circle, so the
//! shaft origin moves continuously as the light crosses the view plane.

use glam::{Vec2, Vec3};

use crate::camera::{CameraPose, direction_from_angles};
use crate::settings::GodraySettings;

/// Farthest a light UV may sit from the screen center. Lights behind the
/// camera are placed exactly on this radius.
pub const BEHIND_RADIUS: f32 = 1.5;
/// cos(angle) below zero at which shafts are already gone
pub const FADE_FORGIVENESS: f32 = 0.15;
/// cos(angle) at which shafts reach full strength
pub const FADE_FULL: f32 = 0.35;
/// Effective intensity below which the light-shaft pass is skipped
pub const GODRAY_SKIP_THRESHOLD: f32 = 0.01;

/// Screen-space light position for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightProjection {
    /// Light position in screen UV (origin top-left), may lie off-screen
    pub screen_uv: Vec2,
    /// 0 when the light is behind the camera, 1 when well in front
    pub visibility_fade: f32,
    /// Unit world direction toward the light
    pub direction: Vec3,
}

impl LightProjection {
    /// Whether the light-shaft pass is worth running.
    pub fn shafts_visible(&self, godrays: &GodraySettings) -> bool {
        godrays.enabled && godrays.intensity * self.visibility_fade >= GODRAY_SKIP_THRESHOLD
    }
}

/// Unit direction toward the light. Azimuth 0 points at -Z, 90 at +X.
pub fn light_direction(azimuth_degrees: f32, height_degrees: f32) -> Vec3 {
    direction_from_angles(azimuth_degrees.to_radians(), height_degrees.to_radians())
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Project the light for a camera pose and output size in pixels.
pub fn project(azimuth_degrees: f32, height_degrees: f32, pose: &CameraPose, output_size: (u32, u32)) -> LightProjection {
    let direction = light_direction(azimuth_degrees, height_degrees);
    let basis = pose.basis();
    let aspect = output_size.0.max(1) as f32 / output_size.1.max(1) as f32;
    let tan_half_fov = pose.tan_half_fov();

    let x = direction.dot(basis.right);
    let y = direction.dot(basis.up);
    let cos_theta = direction.dot(basis.forward);

    // Screen-space direction of the light; y grows downward
    let toward = Vec2::new(x / aspect, -y);
    let center = Vec2::splat(0.5);
    let screen_uv = if cos_theta > 1e-4 {
        let offset = toward * (0.5 / (cos_theta * tan_half_fov));
        center + offset.clamp_length_max(BEHIND_RADIUS)
    } else {
        center + toward.try_normalize().unwrap_or(Vec2::NEG_Y) * BEHIND_RADIUS
    };

    LightProjection {
        screen_uv,
        visibility_fade: smoothstep(-FADE_FORGIVENESS, FADE_FULL, cos_theta),
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_dead_ahead_is_centered() {
        let pose = CameraPose::default();
        let light = project(0.0, 0.0, &pose, (800, 600));
        assert!((light.screen_uv - Vec2::splat(0.5)).length() < 1e-4);
        assert!((light.visibility_fade - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_light_above_is_upper_half() {
        let pose = CameraPose::default();
        let light = project(0.0, 10.0, &pose, (800, 600));
        assert!(light.screen_uv.y < 0.5);
    }

    #[test]
    fn test_skip_when_disabled() {
        let pose = CameraPose::default();
        let light = project(0.0, 0.0, &pose, (800, 600));
        let mut godrays = GodraySettings::default();
        assert!(light.shafts_visible(&godrays));
        godrays.enabled = false;
        assert!(!light.shafts_visible(&godrays));
    }
}
