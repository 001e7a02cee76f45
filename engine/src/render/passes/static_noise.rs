//! Static pass: bakes the tileable cloud noise field into `noise.write`.
//!
//! The field only depends on the target resolution, so it runs on the first
//! frame after the targets were (re)allocated or after an explicit request.

use super::{BindingKind, FullscreenProgram, ProgramDesc};
use crate::render::shader_loader::embedded;
use crate::render::targets::{PingPong, RenderTarget, TargetFormat};

pub struct StaticNoisePass {
    program: FullscreenProgram,
}

impl StaticNoisePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let program = FullscreenProgram::new(
            device,
            embedded::NOISE,
            &ProgramDesc {
                label: "Static Noise Pass",
                bindings: &[BindingKind::Uniform],
                targets: &[TargetFormat::Color.wgpu()],
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
        noise: &PingPong<RenderTarget>,
    ) {
        let bind_group = self.program.bind_group(device, &[uniforms.as_entire_binding()]);
        self.program.draw(encoder, &bind_group, &[&noise.write.view]);
    }
}
