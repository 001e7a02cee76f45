//! Temporal Accumulation
//!
//! CPU side of the temporal filter:
//! - [`AccumulationState`]: the one-shot reset flag and the blend-rate policy
//! - [`ResetKey`]: the small subset of per-frame state whose change
//!   invalidates history
//! - reference reprojection math ([`reproject`], [`accumulate`]) that
//!   `shaders/accumulate.wgsl` mirrors per pixel
//!
//! The GPU pass does the actual per-pixel work every frame; the reference
//! implementation exists so the math can be checked without a device.

use glam::{Vec2, Vec3, Vec4};

use crate::camera::{CameraBasis, CameraMode, CameraPose};
use crate::settings::Settings;

/// Depth-proxy value written for pixels that hit nothing (sky)
pub const SKY_DEPTH: f32 = 1.0e6;
/// Depths at or beyond this are treated as sky
pub const SKY_DEPTH_THRESHOLD: f32 = 0.5 * SKY_DEPTH;
/// Relative depth difference above which reprojected history is rejected
pub const DEPTH_REJECT_TOLERANCE: f32 = 0.1;

// ============================================================================
// RESET POLICY
// ============================================================================

/// Why history was discarded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetCause {
    /// Nothing accumulated yet, or targets were reallocated
    NoHistory,
    ModeChanged,
    FieldOfViewChanged,
    FilterToggled,
    ReprojectionToggled,
    LightingChanged,
    CloudShapeChanged,
    /// Interaction started or stopped while reprojection-during-interaction is off
    InteractionEdge,
    /// Explicit external request
    Requested,
}

/// The reset-relevant subset of one frame's state.
///
/// Compared field by field each frame instead of deep-comparing settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetKey {
    pub camera_mode: CameraMode,
    pub fov_degrees: f32,
    pub temporal_filter_enabled: bool,
    pub reprojection_enabled: bool,
    pub light_azimuth_degrees: f32,
    pub cloud_density: f32,
    pub cloud_shape_strength: f32,
    pub cloud_detail_strength: f32,
}

impl ResetKey {
    pub fn capture(settings: &Settings, pose: &CameraPose, mode: CameraMode) -> Self {
        Self {
            camera_mode: mode,
            fov_degrees: pose.fov_degrees,
            temporal_filter_enabled: settings.temporal_filter_enabled,
            reprojection_enabled: settings.reprojection_enabled,
            light_azimuth_degrees: settings.light.azimuth_degrees,
            cloud_density: settings.clouds.density,
            cloud_shape_strength: settings.clouds.shape_strength,
            cloud_detail_strength: settings.clouds.detail_strength,
        }
    }

    /// First field that differs from `previous`, in priority order.
    pub fn diff(&self, previous: &ResetKey) -> Option<ResetCause> {
        if self.camera_mode != previous.camera_mode {
            Some(ResetCause::ModeChanged)
        } else if self.fov_degrees != previous.fov_degrees {
            Some(ResetCause::FieldOfViewChanged)
        } else if self.temporal_filter_enabled != previous.temporal_filter_enabled {
            Some(ResetCause::FilterToggled)
        } else if self.reprojection_enabled != previous.reprojection_enabled {
            Some(ResetCause::ReprojectionToggled)
        } else if self.light_azimuth_degrees != previous.light_azimuth_degrees {
            Some(ResetCause::LightingChanged)
        } else if self.cloud_density != previous.cloud_density
            || self.cloud_shape_strength != previous.cloud_shape_strength
            || self.cloud_detail_strength != previous.cloud_detail_strength
        {
            Some(ResetCause::CloudShapeChanged)
        } else {
            None
        }
    }
}

/// Parameters handed to the accumulation pass for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccumulateParams {
    pub reset: bool,
    pub alpha: f32,
    pub use_reprojection: bool,
}

/// Reset flag + blend policy that persists across frames.
#[derive(Clone, Debug)]
pub struct AccumulationState {
    needs_reset: bool,
    blend_alpha: f32,
    last_key: Option<ResetKey>,
    was_interacting: bool,
    /// Explicit request waiting to be reported by the next observe
    requested: Option<ResetCause>,
}

impl Default for AccumulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulationState {
    /// History starts out undefined, so the first frame always resets.
    pub fn new() -> Self {
        Self {
            needs_reset: true,
            blend_alpha: 1.0,
            last_key: None,
            was_interacting: false,
            requested: None,
        }
    }

    #[inline]
    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    #[inline]
    pub fn blend_alpha(&self) -> f32 {
        self.blend_alpha
    }

    /// Force the next accumulation to discard history.
    pub fn request_reset(&mut self, cause: ResetCause) {
        self.needs_reset = true;
        self.requested.get_or_insert(cause);
    }

    /// Compare this frame against the last one and arm the reset flag if
    /// any trigger fired. Also selects this frame's blend rate.
    pub fn observe(&mut self, key: ResetKey, interacting: bool, settings: &Settings) -> Option<ResetCause> {
        let mut cause = match &self.last_key {
            None => Some(ResetCause::NoHistory),
            Some(previous) => key.diff(previous),
        };
        if let Some(requested) = self.requested.take() {
            cause = cause.or(Some(requested));
        }

        if cause.is_none()
            && interacting != self.was_interacting
            && !settings.reproject_while_interacting
        {
            cause = Some(ResetCause::InteractionEdge);
        }

        self.last_key = Some(key);
        self.was_interacting = interacting;
        self.blend_alpha = settings.temporal_alpha(interacting);

        if cause.is_some() {
            self.needs_reset = true;
        }
        cause
    }

    /// Parameters for this frame's accumulation pass (does not consume the flag).
    pub fn params(&self, settings: &Settings) -> AccumulateParams {
        AccumulateParams {
            reset: self.needs_reset,
            alpha: self.blend_alpha,
            use_reprojection: settings.reprojection_enabled,
        }
    }

    /// The reset was honored by a completed accumulation; clear it.
    pub fn mark_accumulated(&mut self) {
        self.needs_reset = false;
    }
}

// ============================================================================
// REPROJECTION
// ============================================================================

/// Camera frame prepared for pixel ↔ world conversion
#[derive(Clone, Copy, Debug)]
pub struct ProjectionView {
    pub position: Vec3,
    pub basis: CameraBasis,
    pub tan_half_fov: f32,
    /// width / height
    pub aspect: f32,
}

impl ProjectionView {
    pub fn new(pose: &CameraPose, aspect: f32) -> Self {
        Self {
            position: pose.position,
            basis: pose.basis(),
            tan_half_fov: pose.tan_half_fov(),
            aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
        }
    }

    /// Unit world-space ray through a screen UV (origin top-left).
    pub fn ray(&self, uv: Vec2) -> Vec3 {
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
        (self.basis.forward
            + self.basis.right * (ndc.x * self.tan_half_fov * self.aspect)
            + self.basis.up * (ndc.y * self.tan_half_fov))
            .normalize()
    }

    /// Screen UV of a camera-relative direction, or `None` if behind the camera.
    pub fn project_direction(&self, relative: Vec3) -> Option<Vec2> {
        let z = relative.dot(self.basis.forward);
        if z <= 1e-6 {
            return None;
        }
        let x = relative.dot(self.basis.right) / (z * self.tan_half_fov * self.aspect);
        let y = relative.dot(self.basis.up) / (z * self.tan_half_fov);
        Some(Vec2::new(x * 0.5 + 0.5, 0.5 - y * 0.5))
    }
}

/// Where a pixel's surface was in the previous frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reprojection {
    pub uv: Vec2,
    /// Depth the previous frame should have recorded there if it saw the same surface
    pub expected_depth: f32,
}

#[inline]
pub fn is_sky(depth: f32) -> bool {
    depth >= SKY_DEPTH_THRESHOLD
}

/// Map a current-frame pixel to the previous frame's screen.
///
/// Sky pixels reproject by direction only (they are infinitely far).
/// Returns `None` when the point was behind the previous camera or off-screen.
pub fn reproject(uv: Vec2, depth: f32, current: &ProjectionView, previous: &ProjectionView) -> Option<Reprojection> {
    let ray = current.ray(uv);
    let (relative, expected_depth) = if is_sky(depth) {
        (ray, SKY_DEPTH)
    } else {
        let world = current.position + ray * depth;
        let relative = world - previous.position;
        (relative, relative.length())
    };

    let prev_uv = previous.project_direction(relative)?;
    if !(0.0..=1.0).contains(&prev_uv.x) || !(0.0..=1.0).contains(&prev_uv.y) {
        return None;
    }
    Some(Reprojection {
        uv: prev_uv,
        expected_depth,
    })
}

/// Whether the previous frame's depth confirms the same surface (no disocclusion).
pub fn history_matches(expected_depth: f32, previous_depth: f32) -> bool {
    match (is_sky(expected_depth), is_sky(previous_depth)) {
        (true, true) => true,
        (false, false) => {
            (expected_depth - previous_depth).abs() <= DEPTH_REJECT_TOLERANCE * expected_depth.max(1e-3)
        }
        _ => false,
    }
}

// ============================================================================
// REFERENCE ACCUMULATION
// ============================================================================

/// Minimal row-major image used by the reference implementation
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<T>,
}

impl<T: Copy> Image<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            texels: vec![value; (width * height) as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        self.texels[(y.min(self.height - 1) * self.width + x.min(self.width - 1)) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let index = (y * self.width + x) as usize;
        self.texels[index] = value;
    }

    /// UV of a texel center.
    #[inline]
    pub fn texel_uv(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }

    /// Nearest texel at a UV (clamp to edge).
    pub fn sample_nearest(&self, uv: Vec2) -> T {
        let x = (uv.x * self.width as f32).floor().max(0.0) as u32;
        let y = (uv.y * self.height as f32).floor().max(0.0) as u32;
        self.get(x, y)
    }
}

impl Image<Vec4> {
    /// Bilinear sample at a UV (clamp to edge), like a linear GPU sampler.
    pub fn sample_linear(&self, uv: Vec2) -> Vec4 {
        let px = uv.x * self.width as f32 - 0.5;
        let py = uv.y * self.height as f32 - 0.5;
        let x0 = px.floor();
        let y0 = py.floor();
        let fx = px - x0;
        let fy = py - y0;
        let clamp_x = |v: f32| v.clamp(0.0, (self.width - 1) as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, (self.height - 1) as f32) as u32;
        let (xa, xb) = (clamp_x(x0), clamp_x(x0 + 1.0));
        let (ya, yb) = (clamp_y(y0), clamp_y(y0 + 1.0));
        let top = self.get(xa, ya).lerp(self.get(xb, ya), fx);
        let bottom = self.get(xa, yb).lerp(self.get(xb, yb), fx);
        top.lerp(bottom, fy)
    }
}

/// Inputs of one accumulation step
#[derive(Clone, Copy, Debug)]
pub struct TemporalFrame<'a> {
    pub current: &'a Image<Vec4>,
    pub current_depth: &'a Image<f32>,
    pub previous_depth: &'a Image<f32>,
    pub history: &'a Image<Vec4>,
    pub pose_current: &'a CameraPose,
    pub pose_previous: &'a CameraPose,
}

/// Blend one pixel. `history` is `None` when no valid history exists.
#[inline]
pub fn blend(current: Vec4, history: Option<Vec4>, reset: bool, alpha: f32) -> Vec4 {
    match history {
        Some(history) if !reset => history * (1.0 - alpha) + current * alpha,
        _ => current,
    }
}

/// Reference accumulation over a whole image.
pub fn accumulate(frame: &TemporalFrame<'_>, params: AccumulateParams) -> Image<Vec4> {
    let width = frame.current.width;
    let height = frame.current.height;
    let mut out = frame.current.clone();
    if params.reset {
        return out;
    }

    let aspect = width as f32 / height as f32;
    let current_view = ProjectionView::new(frame.pose_current, aspect);
    let previous_view = ProjectionView::new(frame.pose_previous, aspect);

    for y in 0..height {
        for x in 0..width {
            let uv = frame.current.texel_uv(x, y);
            let history = if params.use_reprojection {
                reproject(uv, frame.current_depth.get(x, y), &current_view, &previous_view)
                    .filter(|r| history_matches(r.expected_depth, frame.previous_depth.sample_nearest(r.uv)))
                    .map(|r| frame.history.sample_linear(r.uv))
            } else {
                Some(frame.history.get(x, y))
            };
            out.set(x, y, blend(frame.current.get(x, y), history, false, params.alpha));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_formula() {
        let out = blend(Vec4::ONE, Some(Vec4::ZERO), false, 0.25);
        assert!((out - Vec4::splat(0.25)).length() < 1e-6);
    }

    #[test]
    fn test_blend_without_history_is_current() {
        let current = Vec4::new(0.2, 0.4, 0.6, 1.0);
        assert_eq!(blend(current, None, false, 0.1), current);
        assert_eq!(blend(current, Some(Vec4::ONE), true, 0.1), current);
    }

    #[test]
    fn test_history_match_rules() {
        assert!(history_matches(SKY_DEPTH, SKY_DEPTH));
        assert!(!history_matches(SKY_DEPTH, 100.0));
        assert!(!history_matches(100.0, SKY_DEPTH));
        assert!(history_matches(100.0, 105.0));
        assert!(!history_matches(100.0, 130.0));
    }

    #[test]
    fn test_behind_previous_camera_is_miss() {
        let current = CameraPose::default();
        let previous = CameraPose {
            forward: Vec3::Z,
            ..Default::default()
        };
        let cv = ProjectionView::new(&current, 1.0);
        let pv = ProjectionView::new(&previous, 1.0);
        assert!(reproject(Vec2::splat(0.5), 50.0, &cv, &pv).is_none());
    }

    #[test]
    fn test_observe_first_frame_resets() {
        let settings = Settings::default();
        let pose = CameraPose::default();
        let mut state = AccumulationState::new();
        let key = ResetKey::capture(&settings, &pose, CameraMode::Orbit);
        assert_eq!(state.observe(key, false, &settings), Some(ResetCause::NoHistory));
        state.mark_accumulated();
        assert_eq!(state.observe(key, false, &settings), None);
        assert!(!state.needs_reset());
    }

    #[test]
    fn test_interaction_edge_policy() {
        let settings = Settings {
            reproject_while_interacting: false,
            ..Default::default()
        };
        let pose = CameraPose::default();
        let key = ResetKey::capture(&settings, &pose, CameraMode::Orbit);
        let mut state = AccumulationState::new();
        state.observe(key, false, &settings);
        state.mark_accumulated();

        assert_eq!(state.observe(key, true, &settings), Some(ResetCause::InteractionEdge));
        state.mark_accumulated();
        assert_eq!(state.observe(key, true, &settings), None);
        state.mark_accumulated();
        assert_eq!(state.observe(key, false, &settings), Some(ResetCause::InteractionEdge));

        // With reprojection during interaction the edges are ignored
        let lenient = Settings::default();
        let mut state = AccumulationState::new();
        state.observe(key, false, &lenient);
        state.mark_accumulated();
        assert_eq!(state.observe(key, true, &lenient), None);
    }

    #[test]
    fn test_alpha_follows_interaction() {
        let settings = Settings::default();
        let pose = CameraPose::default();
        let key = ResetKey::capture(&settings, &pose, CameraMode::Orbit);
        let mut state = AccumulationState::new();
        state.observe(key, true, &settings);
        assert_eq!(state.blend_alpha(), settings.temporal_alpha_interacting);
        state.observe(key, false, &settings);
        assert_eq!(state.blend_alpha(), settings.temporal_alpha_static);
    }

    #[test]
    fn test_requested_reset_reported_once() {
        let settings = Settings::default();
        let key = ResetKey::capture(&settings, &CameraPose::default(), CameraMode::Orbit);
        let mut state = AccumulationState::new();
        state.observe(key, false, &settings);
        state.mark_accumulated();

        state.request_reset(ResetCause::Requested);
        assert!(state.needs_reset());
        assert_eq!(state.observe(key, false, &settings), Some(ResetCause::Requested));
        assert!(state.params(&settings).reset);
        state.mark_accumulated();
        assert_eq!(state.observe(key, false, &settings), None);
        assert!(!state.params(&settings).reset);
    }
}
