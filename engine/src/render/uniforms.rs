//! Uniform Structs for GPU Shaders
//!
//! One uniform block is shared by every pass of a frame. It must match the
//! `Frame` struct in `shaders/common.wgsl` exactly; every member is a
//! `vec4<f32>` so there is no implicit WGSL padding to get wrong.
//!
//! Layout (272 bytes):
//!   offset   0: camera_position   (xyz, w = tan(fov/2))
//!   offset  16: camera_forward    (xyz, w = aspect)
//!   offset  32: camera_right
//!   offset  48: camera_up
//!   offset  64: prev_position     (xyz, w = tan(fov/2))
//!   offset  80: prev_forward      (xyz, w = aspect)
//!   offset  96: prev_right
//!   offset 112: prev_up
//!   offset 128: resolution        (w, h, 1/w, 1/h)
//!   offset 144: time              (seconds, dt, frame index, interacting)
//!   offset 160: light_direction   (xyz, power)
//!   offset 176: light_color       (rgb, exposure)
//!   offset 192: clouds            (density, shape, detail, coverage scale)
//!   offset 208: layer             (base altitude, top altitude, terrain height, terrain enabled)
//!   offset 224: temporal          (reset, alpha, use reprojection, sky depth)
//!   offset 240: godrays           (light u, light v, fade, intensity)
//!   offset 256: godray_params     (decay, density, weight, samples)

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use static_assertions::const_assert_eq;

use super::light_projection::LightProjection;
use crate::camera::CameraPose;
use crate::settings::Settings;
use crate::temporal::{AccumulateParams, SKY_DEPTH};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub camera_position: [f32; 4],
    pub camera_forward: [f32; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub prev_position: [f32; 4],
    pub prev_forward: [f32; 4],
    pub prev_right: [f32; 4],
    pub prev_up: [f32; 4],
    pub resolution: [f32; 4],
    pub time: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub clouds: [f32; 4],
    pub layer: [f32; 4],
    pub temporal: [f32; 4],
    pub godrays: [f32; 4],
    pub godray_params: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<FrameUniforms>(), 272);

/// Everything a frame's uniforms are built from
#[derive(Clone, Copy, Debug)]
pub struct UniformSource<'a> {
    pub pose: &'a CameraPose,
    pub previous_pose: &'a CameraPose,
    /// Internal render size in pixels
    pub render_size: (u32, u32),
    pub settings: &'a Settings,
    pub time: f32,
    pub delta_time: f32,
    pub frame_index: u32,
    pub interacting: bool,
    pub accumulate: AccumulateParams,
    pub light: &'a LightProjection,
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

impl FrameUniforms {
    pub fn build(source: &UniformSource<'_>) -> Self {
        let (width, height) = (source.render_size.0.max(1) as f32, source.render_size.1.max(1) as f32);
        let aspect = width / height;
        let basis = source.pose.basis();
        let prev_basis = source.previous_pose.basis();
        let settings = source.settings;

        Self {
            camera_position: vec4(source.pose.position, source.pose.tan_half_fov()),
            camera_forward: vec4(basis.forward, aspect),
            camera_right: vec4(basis.right, 0.0),
            camera_up: vec4(basis.up, 0.0),
            prev_position: vec4(source.previous_pose.position, source.previous_pose.tan_half_fov()),
            prev_forward: vec4(prev_basis.forward, aspect),
            prev_right: vec4(prev_basis.right, 0.0),
            prev_up: vec4(prev_basis.up, 0.0),
            resolution: [width, height, 1.0 / width, 1.0 / height],
            time: [
                source.time,
                source.delta_time,
                source.frame_index as f32,
                flag(source.interacting),
            ],
            light_direction: vec4(source.light.direction, settings.light.power),
            light_color: vec4(settings.light.color, settings.light.exposure),
            clouds: [
                settings.clouds.density,
                settings.clouds.shape_strength,
                settings.clouds.detail_strength,
                settings.clouds.coverage_scale,
            ],
            layer: [
                settings.clouds.base_altitude,
                settings.clouds.top_altitude,
                settings.terrain.height,
                flag(settings.terrain.enabled),
            ],
            temporal: [
                flag(source.accumulate.reset),
                source.accumulate.alpha,
                flag(source.accumulate.use_reprojection),
                SKY_DEPTH,
            ],
            godrays: [
                source.light.screen_uv.x,
                source.light.screen_uv.y,
                source.light.visibility_fade,
                settings.godrays.intensity,
            ],
            godray_params: [
                settings.godrays.decay,
                settings.godrays.density,
                settings.godrays.weight,
                settings.godrays.samples as f32,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::light_projection::project;

    #[test]
    fn test_build_packs_flags_and_resolution() {
        let settings = Settings::default();
        let pose = CameraPose::default();
        let light = project(0.0, 20.0, &pose, (640, 480));
        let uniforms = FrameUniforms::build(&UniformSource {
            pose: &pose,
            previous_pose: &pose,
            render_size: (640, 480),
            settings: &settings,
            time: 2.0,
            delta_time: 0.016,
            frame_index: 7,
            interacting: true,
            accumulate: AccumulateParams {
                reset: true,
                alpha: 0.35,
                use_reprojection: false,
            },
            light: &light,
        });
        assert_eq!(uniforms.resolution[0], 640.0);
        assert_eq!(uniforms.resolution[1], 480.0);
        assert_eq!(uniforms.time[2], 7.0);
        assert_eq!(uniforms.time[3], 1.0);
        assert_eq!(uniforms.temporal, [1.0, 0.35, 0.0, SKY_DEPTH]);
        assert!((uniforms.camera_forward[3] - 640.0 / 480.0).abs() < 1e-6);
    }
}
