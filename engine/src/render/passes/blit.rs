//! Blit composite: tonemapped copy of the accumulated image, used whenever
//! the light-shaft pass is skipped.

use super::{BindingKind, FullscreenProgram, ProgramDesc};
use crate::render::shader_loader::embedded;
use crate::render::targets::RenderTarget;

pub struct BlitPass {
    program: FullscreenProgram,
}

impl BlitPass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let program = FullscreenProgram::new(
            device,
            embedded::BLIT,
            &ProgramDesc {
                label: "Blit Pass",
                bindings: &[BindingKind::Uniform, BindingKind::Texture, BindingKind::Sampler],
                targets: &[surface_format],
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
        history: &RenderTarget,
        output: &wgpu::TextureView,
    ) {
        let bind_group = self.program.bind_group(
            device,
            &[
                uniforms.as_entire_binding(),
                wgpu::BindingResource::TextureView(&history.view),
                wgpu::BindingResource::Sampler(&history.sampler),
            ],
        );
        self.program.draw(encoder, &bind_group, &[output]);
    }
}
