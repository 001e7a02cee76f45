//! Scene pass: sky, ground and ray-marched clouds into the frame color and
//! depth-proxy targets.
//!
//! Two pipelines are built from the same module, differing only in the
//! `FAST_MODE` override constant; [`SceneVariant`] picks one per frame.

use super::{BindingKind, FullscreenProgram, ProgramDesc};
use crate::render::pipeline::SceneVariant;
use crate::render::shader_loader::{self, embedded};
use crate::render::targets::{RenderTarget, TargetBundle, TargetFormat};
use crate::render::weather::WeatherMaps;

const SCENE_BINDINGS: &[BindingKind] = &[
    BindingKind::Uniform,
    BindingKind::Texture, // state
    BindingKind::Texture, // noise
    BindingKind::Sampler, // noise (repeat)
    BindingKind::Texture, // weather coverage
    BindingKind::Texture, // weather layer
    BindingKind::Sampler, // weather
];

const SCENE_TARGETS: &[wgpu::TextureFormat] = &[wgpu::TextureFormat::Rgba16Float, wgpu::TextureFormat::R32Float];

pub struct ScenePass {
    full: FullscreenProgram,
    fast: FullscreenProgram,
    noise_sampler: wgpu::Sampler,
}

impl ScenePass {
    pub fn new(device: &wgpu::Device) -> Self {
        debug_assert_eq!(SCENE_TARGETS[0], TargetFormat::Color.wgpu());
        debug_assert_eq!(SCENE_TARGETS[1], TargetFormat::Depth.wgpu());

        let module = shader_loader::create_shader_module(device, "Scene Pass", embedded::CLOUDS);
        let full = FullscreenProgram::with_module(
            device,
            &module,
            &ProgramDesc {
                label: "Scene Pass",
                bindings: SCENE_BINDINGS,
                targets: SCENE_TARGETS,
                constants: &[("FAST_MODE", 0.0)],
            },
        );
        let fast = FullscreenProgram::with_module(
            device,
            &module,
            &ProgramDesc {
                label: "Scene Pass (Fast)",
                bindings: SCENE_BINDINGS,
                targets: SCENE_TARGETS,
                constants: &[("FAST_MODE", 1.0)],
            },
        );

        // The noise field tiles, so it is sampled with wrapping
        let noise_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Noise Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            full,
            fast,
            noise_sampler,
        }
    }

    fn program(&self, variant: SceneVariant) -> &FullscreenProgram {
        match variant {
            SceneVariant::Full => &self.full,
            SceneVariant::Fast => &self.fast,
        }
    }

    /// Reads state and noise, writes `frame_color` + `frame_depth`.
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        variant: SceneVariant,
        uniforms: &wgpu::Buffer,
        targets: &TargetBundle<RenderTarget>,
        weather: &WeatherMaps,
    ) {
        let program = self.program(variant);
        let bind_group = program.bind_group(
            device,
            &[
                uniforms.as_entire_binding(),
                wgpu::BindingResource::TextureView(&targets.state.read.view),
                wgpu::BindingResource::TextureView(&targets.noise.read.view),
                wgpu::BindingResource::Sampler(&self.noise_sampler),
                wgpu::BindingResource::TextureView(weather.coverage_view()),
                wgpu::BindingResource::TextureView(weather.layer_view()),
                wgpu::BindingResource::Sampler(weather.sampler()),
            ],
        );
        program.draw(
            encoder,
            &bind_group,
            &[&targets.frame_color.view, &targets.frame_depth.view],
        );
    }
}
