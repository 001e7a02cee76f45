//! Temporal Accumulation Tests
//!
//! Reprojection math, the reference accumulation, and the reset policy as
//! seen through RendererState's plan/commit cycle.

use glam::{Vec2, Vec3, Vec4};
use skyflight_engine::camera::{CameraMode, CameraPose};
use skyflight_engine::input::FrameInput;
use skyflight_engine::render::RendererState;
use skyflight_engine::settings::Settings;
use skyflight_engine::temporal::{
    accumulate, reproject, AccumulateParams, Image, ProjectionView, ResetCause, TemporalFrame, SKY_DEPTH,
};

const DT: f32 = 1.0 / 60.0;
const SIZE: (u32, u32) = (64, 36);

fn plan(state: &mut RendererState, settings: &Settings) -> skyflight_engine::render::FrameRecord {
    state.plan_frame(&FrameInput::default(), settings, DT, false, SIZE, SIZE)
}

/// Plan and commit one idle frame, returning its reset cause.
fn run_frame(state: &mut RendererState, settings: &Settings) -> (bool, Option<ResetCause>) {
    let record = plan(state, settings);
    state.commit_frame(&record, settings, DT);
    (record.plan.accumulate.reset, record.reset_cause)
}

// ============================================================================
// Reprojection
// ============================================================================

#[test]
fn test_identity_reprojection_returns_same_uv() {
    let pose = CameraPose {
        position: Vec3::new(10.0, 200.0, -30.0),
        forward: Vec3::new(0.3, 0.2, -1.0).normalize(),
        ..Default::default()
    };
    let view = ProjectionView::new(&pose, 16.0 / 9.0);

    for uv in [Vec2::new(0.5, 0.5), Vec2::new(0.1, 0.8), Vec2::new(0.93, 0.07)] {
        for depth in [25.0, 1800.0, SKY_DEPTH] {
            let hit = reproject(uv, depth, &view, &view).expect("on screen");
            assert!((hit.uv - uv).length() < 1e-4, "uv {:?} -> {:?}", uv, hit.uv);
        }
    }
}

#[test]
fn test_sky_reprojection_ignores_translation() {
    let current = CameraPose {
        position: Vec3::new(500.0, 300.0, 0.0),
        ..Default::default()
    };
    let previous = CameraPose::default();
    let cv = ProjectionView::new(&current, 1.0);
    let pv = ProjectionView::new(&previous, 1.0);

    let uv = Vec2::new(0.3, 0.6);
    let hit = reproject(uv, SKY_DEPTH, &cv, &pv).expect("on screen");
    assert!((hit.uv - uv).length() < 1e-4);
}

#[test]
fn test_rotation_moves_sky_the_other_way() {
    let previous = CameraPose::default();
    // Turned right a little
    let current = CameraPose {
        forward: Vec3::new(0.1, 0.0, -1.0).normalize(),
        ..Default::default()
    };
    let cv = ProjectionView::new(&current, 1.0);
    let pv = ProjectionView::new(&previous, 1.0);
    let hit = reproject(Vec2::splat(0.5), SKY_DEPTH, &cv, &pv).expect("on screen");
    assert!(hit.uv.x > 0.5);
    assert!((hit.uv.y - 0.5).abs() < 1e-4);
}

// ============================================================================
// Reference accumulation
// ============================================================================

#[test]
fn test_reset_output_equals_current() {
    let current = Image::filled(8, 8, Vec4::new(0.2, 0.3, 0.4, 1.0));
    let history = Image::filled(8, 8, Vec4::ONE);
    let depth = Image::filled(8, 8, SKY_DEPTH);
    let pose = CameraPose::default();
    let frame = TemporalFrame {
        current: &current,
        current_depth: &depth,
        previous_depth: &depth,
        history: &history,
        pose_current: &pose,
        pose_previous: &pose,
    };

    let out = accumulate(
        &frame,
        AccumulateParams {
            reset: true,
            alpha: 0.1,
            use_reprojection: true,
        },
    );
    assert_eq!(out, current);
}

#[test]
fn test_static_camera_converges_toward_current() {
    let target = Vec4::new(0.8, 0.6, 0.4, 1.0);
    let current = Image::filled(8, 8, target);
    let depth = Image::filled(8, 8, 900.0);
    let pose = CameraPose::default();
    let mut history = Image::filled(8, 8, Vec4::ZERO);

    let params = AccumulateParams {
        reset: false,
        alpha: 0.1,
        use_reprojection: true,
    };
    for _ in 0..60 {
        let frame = TemporalFrame {
            current: &current,
            current_depth: &depth,
            previous_depth: &depth,
            history: &history,
            pose_current: &pose,
            pose_previous: &pose,
        };
        history = accumulate(&frame, params);
    }

    // (1 - alpha)^60 of the gap remains
    let remaining = 0.9_f32.powi(60);
    let texel = history.get(3, 4);
    assert!((texel - target * (1.0 - remaining)).length() < 1e-3);
}

#[test]
fn test_disocclusion_falls_back_to_current() {
    let current = Image::filled(4, 4, Vec4::splat(0.5));
    let history = Image::filled(4, 4, Vec4::ONE);
    let current_depth = Image::filled(4, 4, 100.0);
    // Previous frame saw something much farther away
    let previous_depth = Image::filled(4, 4, 400.0);
    let pose = CameraPose::default();
    let frame = TemporalFrame {
        current: &current,
        current_depth: &current_depth,
        previous_depth: &previous_depth,
        history: &history,
        pose_current: &pose,
        pose_previous: &pose,
    };
    let out = accumulate(
        &frame,
        AccumulateParams {
            reset: false,
            alpha: 0.1,
            use_reprojection: true,
        },
    );
    assert_eq!(out, current);
}

// ============================================================================
// Reset policy through the frame cycle
// ============================================================================

#[test]
fn test_first_frame_resets_then_clears() {
    let settings = Settings::default();
    let mut state = RendererState::new(&settings);

    assert_eq!(run_frame(&mut state, &settings), (true, Some(ResetCause::NoHistory)));
    assert_eq!(run_frame(&mut state, &settings), (false, None));
}

#[test]
fn test_mode_switch_resets_exactly_once() {
    let settings = Settings::default();
    let mut state = RendererState::new(&settings);
    run_frame(&mut state, &settings);
    run_frame(&mut state, &settings);

    assert!(state.request_mode(CameraMode::FreeFly));
    assert_eq!(run_frame(&mut state, &settings), (true, Some(ResetCause::ModeChanged)));
    assert_eq!(run_frame(&mut state, &settings), (false, None));
    assert_eq!(run_frame(&mut state, &settings), (false, None));
}

#[test]
fn test_settings_mode_change_acts_as_request() {
    let mut settings = Settings::default();
    let mut state = RendererState::new(&settings);
    run_frame(&mut state, &settings);

    settings.camera_mode = CameraMode::BankedFlight;
    assert_eq!(run_frame(&mut state, &settings), (true, Some(ResetCause::ModeChanged)));
    assert_eq!(state.controller.mode(), CameraMode::BankedFlight);
    assert_eq!(run_frame(&mut state, &settings), (false, None));
}

#[test]
fn test_uncommitted_reset_carries_over() {
    let settings = Settings::default();
    let mut state = RendererState::new(&settings);
    run_frame(&mut state, &settings);

    state.request_mode(CameraMode::FreeFly);
    // Planned but never submitted (e.g. the surface was lost)
    let skipped = plan(&mut state, &settings);
    assert!(skipped.plan.accumulate.reset);

    let (reset, _) = run_frame(&mut state, &settings);
    assert!(reset);
    assert_eq!(run_frame(&mut state, &settings), (false, None));
}

#[test]
fn test_setting_changes_trigger_resets() {
    let mut settings = Settings::default();
    let mut state = RendererState::new(&settings);
    run_frame(&mut state, &settings);

    settings.field_of_view_degrees = 75.0;
    assert_eq!(run_frame(&mut state, &settings).1, Some(ResetCause::FieldOfViewChanged));

    settings.light.azimuth_degrees += 10.0;
    assert_eq!(run_frame(&mut state, &settings).1, Some(ResetCause::LightingChanged));

    settings.clouds.density *= 2.0;
    assert_eq!(run_frame(&mut state, &settings).1, Some(ResetCause::CloudShapeChanged));

    settings.temporal_filter_enabled = false;
    assert_eq!(run_frame(&mut state, &settings).1, Some(ResetCause::FilterToggled));

    settings.reprojection_enabled = false;
    assert_eq!(run_frame(&mut state, &settings).1, Some(ResetCause::ReprojectionToggled));

    assert_eq!(run_frame(&mut state, &settings), (false, None));
}

#[test]
fn test_target_reallocation_resets() {
    let settings = Settings::default();
    let mut state = RendererState::new(&settings);
    run_frame(&mut state, &settings);

    state.targets_reallocated();
    assert_eq!(run_frame(&mut state, &settings), (true, Some(ResetCause::NoHistory)));
}

#[test]
fn test_filter_disabled_uses_alpha_one() {
    let settings = Settings {
        temporal_filter_enabled: false,
        ..Default::default()
    };
    let mut state = RendererState::new(&settings);
    let record = plan(&mut state, &settings);
    assert_eq!(record.plan.accumulate.alpha, 1.0);
}

#[test]
fn test_previous_pose_follows_commits() {
    let settings = Settings::default();
    let mut state = RendererState::new(&settings);
    state.request_mode(CameraMode::FreeFly);

    let input = FrameInput {
        actions: skyflight_engine::input::ActionState {
            forward: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let record = state.plan_frame(&input, &settings, DT, false, SIZE, SIZE);
    state.commit_frame(&record, &settings, DT);
    assert_eq!(state.previous_pose(), record.pose);
    assert_eq!(state.frame_index(), 1);

    let next = state.plan_frame(&input, &settings, DT, false, SIZE, SIZE);
    // The uniforms carry last frame's camera for reprojection
    assert_eq!(next.uniforms.prev_position[0], record.pose.position.x);
    assert_eq!(next.uniforms.prev_position[2], record.pose.position.z);
}
