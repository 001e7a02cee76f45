//! Accumulation pass: reprojects history and blends the new scene output in.
//! Writes `history.write` and `depth.write` in one draw.

use super::{BindingKind, FullscreenProgram, ProgramDesc};
use crate::render::shader_loader::embedded;
use crate::render::targets::{RenderTarget, TargetBundle, TargetFormat};

pub struct AccumulatePass {
    program: FullscreenProgram,
}

impl AccumulatePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let program = FullscreenProgram::new(
            device,
            embedded::ACCUMULATE,
            &ProgramDesc {
                label: "Accumulation Pass",
                bindings: &[
                    BindingKind::Uniform,
                    BindingKind::Texture,             // frame color
                    BindingKind::UnfilterableTexture, // frame depth
                    BindingKind::Texture,             // history
                    BindingKind::Sampler,             // history
                    BindingKind::UnfilterableTexture, // history depth
                ],
                targets: &[TargetFormat::Color.wgpu(), TargetFormat::Depth.wgpu()],
                constants: &[],
            },
        );
        Self { program }
    }

    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        uniforms: &wgpu::Buffer,
        targets: &TargetBundle<RenderTarget>,
    ) {
        let bind_group = self.program.bind_group(
            device,
            &[
                uniforms.as_entire_binding(),
                wgpu::BindingResource::TextureView(&targets.frame_color.view),
                wgpu::BindingResource::TextureView(&targets.frame_depth.view),
                wgpu::BindingResource::TextureView(&targets.history.read.view),
                wgpu::BindingResource::Sampler(&targets.history.read.sampler),
                wgpu::BindingResource::TextureView(&targets.depth.read.view),
            ],
        );
        self.program.draw(
            encoder,
            &bind_group,
            &[&targets.history.write.view, &targets.depth.write.view],
        );
    }
}
