//! State pass: advances the 4x1 simulation-state target (wind offset,
//! elapsed time, light and camera snapshots) by one frame.

use super::{BindingKind, FullscreenProgram, ProgramDesc};
use crate::render::shader_loader::embedded;
use crate::render::targets::{PingPong, RenderTarget, TargetFormat};

pub struct StatePass {
    program: FullscreenProgram,
}

impl StatePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let program = FullscreenProgram::new(
            device,
            embedded::STATE,
            &ProgramDesc {
                label: "State Pass",
                bindings: &[BindingKind::Uniform, BindingKind::Texture],
                targets: &[TargetFormat::Color.wgpu()],
                constants: &[],
            },
        );
        Self { program }
    }

    /// Reads `state.read`, writes `state.write`.
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        uniforms: &wgpu::Buffer,
        state: &PingPong<RenderTarget>,
    ) {
        let bind_group = self.program.bind_group(
            device,
            &[
                uniforms.as_entire_binding(),
                wgpu::BindingResource::TextureView(&state.read.view),
            ],
        );
        self.program.draw(encoder, &bind_group, &[&state.write.view]);
    }
}
