//! Sky Renderer
//!
//! [`RendererState`] owns every piece of per-frame mutable state (camera,
//! accumulation policy, previous pose, clock) and plans frames without
//! touching the GPU. [`SkyRenderer`] pairs it with the device, the pass
//! programs and the render targets, and records/submits the planned passes.
//!
//! # Frame flow
//!
//! ```text
//! resize targets if needed -> acquire surface -> plan (camera, reset, light)
//!   -> upload uniforms -> record passes -> submit -> present -> commit
//! ```
//!
//! Anything that fails before submission skips the frame without committing,
//! so pending resets and the static rebuild carry over to the next frame.

use std::sync::Arc;

use bytemuck::Zeroable;
use winit::window::Window;

use super::gpu_context::{GpuContext, GpuContextConfig};
use super::light_projection::{self, LightProjection};
use super::passes::{AccumulatePass, BlitPass, LightShaftPass, ScenePass, StatePass, StaticNoisePass};
use super::pipeline::{self, Composite, FramePlan, PassKind, PassRecorder};
use super::targets::{GpuAllocator, RenderTarget, ResourceManager, TargetBundle};
use super::uniforms::{FrameUniforms, UniformSource};
use super::weather::WeatherMaps;
use crate::camera::{CameraController, CameraMode, CameraPose};
use crate::error::{FrameError, InitError};
use crate::input::FrameInput;
use crate::settings::Settings;
use crate::telemetry::{FlightData, FpsCounter, FrameTelemetry};
use crate::temporal::{AccumulationState, ResetCause, ResetKey};

/// Longest frame step fed to the simulation (seconds)
pub const MAX_FRAME_DT: f32 = 0.1;

/// A planned frame, ready to record
#[derive(Clone, Copy, Debug)]
pub struct FrameRecord {
    pub plan: FramePlan,
    pub uniforms: FrameUniforms,
    pub pose: CameraPose,
    pub interacting: bool,
    pub light: LightProjection,
    pub reset_cause: Option<ResetCause>,
}

/// All mutable per-frame state, GPU-free
#[derive(Clone, Debug)]
pub struct RendererState {
    pub controller: CameraController,
    pub accumulation: AccumulationState,
    previous_pose: CameraPose,
    frame_index: u32,
    time: f32,
    fps: FpsCounter,
    /// Last settings values that were applied to the controller
    applied_mode: CameraMode,
    applied_fov: f32,
}

impl RendererState {
    pub fn new(settings: &Settings) -> Self {
        let controller = CameraController::new(settings.camera_mode, settings.field_of_view_degrees);
        let pose = controller.pose();
        Self {
            controller,
            accumulation: AccumulationState::new(),
            previous_pose: pose,
            frame_index: 0,
            time: 0.0,
            fps: FpsCounter::default(),
            applied_mode: settings.camera_mode,
            applied_fov: settings.field_of_view_degrees,
        }
    }

    #[inline]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn previous_pose(&self) -> CameraPose {
        self.previous_pose
    }

    /// Explicit mode request from the host (hotkey or UI action).
    pub fn request_mode(&mut self, mode: CameraMode) -> bool {
        self.controller.request_mode(mode)
    }

    /// Put the camera back at its default pose and drop history.
    pub fn reset_camera(&mut self) {
        self.controller.reset();
        self.accumulation.request_reset(ResetCause::Requested);
    }

    /// Target reallocation invalidates history.
    pub fn targets_reallocated(&mut self) {
        self.accumulation.request_reset(ResetCause::NoHistory);
    }

    /// Plan one frame: advance the camera, detect resets, project the light
    /// and build the uniform block. Nothing is committed until
    /// [`Self::commit_frame`].
    pub fn plan_frame(
        &mut self,
        input: &FrameInput,
        settings: &Settings,
        dt: f32,
        static_pending: bool,
        output_size: (u32, u32),
        render_size: (u32, u32),
    ) -> FrameRecord {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

        // A changed snapshot value acts like an explicit request
        if settings.camera_mode != self.applied_mode {
            self.applied_mode = settings.camera_mode;
            self.controller.request_mode(settings.camera_mode);
        }
        if settings.field_of_view_degrees != self.applied_fov {
            self.applied_fov = settings.field_of_view_degrees;
            self.controller.set_fov_degrees(settings.field_of_view_degrees);
        }

        let update = self.controller.update(input, &settings.flight, dt);
        let key = ResetKey::capture(settings, &update.pose, self.controller.mode());
        let reset_cause = self.accumulation.observe(key, update.interacting, settings);
        if let Some(cause) = reset_cause {
            log::debug!("Accumulation reset: {:?}", cause);
        }

        let light = light_projection::project(
            settings.light.azimuth_degrees,
            settings.light.height_degrees,
            &update.pose,
            output_size,
        );
        let accumulate = self.accumulation.params(settings);
        let plan = FramePlan::new(static_pending, update.interacting, settings, &light, accumulate);

        let uniforms = FrameUniforms::build(&UniformSource {
            pose: &update.pose,
            previous_pose: &self.previous_pose,
            render_size,
            settings,
            time: self.time + dt * settings.time_scale,
            delta_time: dt * settings.time_scale,
            frame_index: self.frame_index,
            interacting: update.interacting,
            accumulate,
            light: &light,
        });

        FrameRecord {
            plan,
            uniforms,
            pose: update.pose,
            interacting: update.interacting,
            light,
            reset_cause,
        }
    }

    /// The planned frame was submitted: advance the clock and history.
    pub fn commit_frame(&mut self, record: &FrameRecord, settings: &Settings, dt: f32) -> FrameTelemetry {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.previous_pose = record.pose;
        self.accumulation.mark_accumulated();
        self.time += dt * settings.time_scale;
        self.frame_index = self.frame_index.wrapping_add(1);
        self.fps.tick(dt);

        let flight = self
            .controller
            .mode()
            .is_flight()
            .then(|| FlightData::from_controller(&self.controller, &settings.flight, settings.terrain.height));
        FrameTelemetry::new(self.fps.fps(), &record.pose, flight)
    }
}

/// Every pass program, built once
struct PassPrograms {
    state: StatePass,
    static_noise: StaticNoisePass,
    scene: ScenePass,
    accumulate: AccumulatePass,
    light_shaft: LightShaftPass,
    blit: BlitPass,
}

impl PassPrograms {
    fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            state: StatePass::new(device),
            static_noise: StaticNoisePass::new(device),
            scene: ScenePass::new(device),
            accumulate: AccumulatePass::new(device),
            light_shaft: LightShaftPass::new(device, surface_format),
            blit: BlitPass::new(device, surface_format),
        }
    }
}

/// Records passes into a command encoder
struct GpuRecorder<'a> {
    device: &'a wgpu::Device,
    encoder: &'a mut wgpu::CommandEncoder,
    programs: &'a PassPrograms,
    uniforms: &'a wgpu::Buffer,
    weather: &'a WeatherMaps,
    output: &'a wgpu::TextureView,
}

impl PassRecorder<RenderTarget> for GpuRecorder<'_> {
    fn record(&mut self, pass: PassKind, targets: &TargetBundle<RenderTarget>) {
        let (device, uniforms) = (self.device, self.uniforms);
        match pass {
            PassKind::State => self.programs.state.record(device, self.encoder, uniforms, &targets.state),
            PassKind::Static => self
                .programs
                .static_noise
                .record(device, self.encoder, uniforms, &targets.noise),
            PassKind::Scene(variant) => {
                self.programs
                    .scene
                    .record(device, self.encoder, variant, uniforms, targets, self.weather)
            }
            PassKind::Accumulation => self.programs.accumulate.record(device, self.encoder, uniforms, targets),
            PassKind::Composite(Composite::LightShaft) => self.programs.light_shaft.record(
                device,
                self.encoder,
                uniforms,
                &targets.history.read,
                self.output,
            ),
            PassKind::Composite(Composite::Blit) => {
                self.programs
                    .blit
                    .record(device, self.encoder, uniforms, &targets.history.read, self.output)
            }
        }
    }
}

/// The GPU-side renderer
pub struct SkyRenderer {
    gpu: GpuContext,
    programs: PassPrograms,
    weather: WeatherMaps,
    uniform_buffer: wgpu::Buffer,
    resources: ResourceManager<RenderTarget>,
    state: RendererState,
}

impl SkyRenderer {
    /// Bring up the device and build every pass program.
    ///
    /// Any shader or pipeline validation failure is session-fatal.
    pub async fn new(window: Arc<Window>, config: &GpuContextConfig, settings: &Settings) -> Result<Self, InitError> {
        let gpu = GpuContext::new(window, config).await?;

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let programs = PassPrograms::new(&gpu.device, gpu.format());
        if let Some(error) = gpu.device.pop_error_scope().await {
            return Err(InitError::PipelineBuildFailed {
                label: "pass programs",
                message: error.to_string(),
            });
        }

        let weather = WeatherMaps::new(&gpu.device, &gpu.queue);
        let uniform_buffer = gpu.create_uniform_buffer("Frame Uniform Buffer", &FrameUniforms::zeroed());
        log::info!("Sky renderer initialized");

        Ok(Self {
            gpu,
            programs,
            weather,
            uniform_buffer,
            resources: ResourceManager::new(),
            state: RendererState::new(settings),
        })
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RendererState {
        &mut self.state
    }

    /// Weather maps, for the painting collaborator.
    pub fn weather(&self) -> (&WeatherMaps, &wgpu::Queue) {
        (&self.weather, &self.gpu.queue)
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Surface resize. Targets follow lazily on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Reconfigure after a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    /// Request a static noise rebuild on the next frame.
    pub fn invalidate_static(&mut self) {
        self.resources.mark_static_dirty();
    }

    /// Render one frame.
    pub fn render_frame(&mut self, input: &FrameInput, settings: &Settings, dt: f32) -> Result<FrameTelemetry, FrameError> {
        let (width, height) = self.gpu.dimensions();
        let mut allocator = GpuAllocator::new(&self.gpu.device);
        if self
            .resources
            .resize(&mut allocator, width, height, settings.resolution_scale)?
        {
            self.state.targets_reallocated();
        }
        let static_pending = self.resources.static_pending();
        let (Some(layout), Some(targets)) = (self.resources.layout(), self.resources.bundle_mut()) else {
            return Err(FrameError::Allocation {
                width,
                height,
                message: "render targets unavailable".to_string(),
            });
        };

        let surface_texture = self.gpu.get_current_texture()?;
        let output = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Nothing below fails, so input is consumed only by frames that present
        let record = self
            .state
            .plan_frame(input, settings, dt, static_pending, layout.output, layout.internal);
        self.gpu.write_buffer(&self.uniform_buffer, &record.uniforms);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let mut recorder = GpuRecorder {
            device: &self.gpu.device,
            encoder: &mut encoder,
            programs: &self.programs,
            uniforms: &self.uniform_buffer,
            weather: &self.weather,
            output: &output,
        };
        pipeline::execute(&record.plan, targets, &mut recorder);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        if record.plan.run_static {
            self.resources.mark_static_done();
        }
        Ok(self.state.commit_frame(&record, settings, dt))
    }
}
