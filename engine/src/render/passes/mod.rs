//! Pass Programs
//!
//! Every pass is a fullscreen triangle over its output target(s): no vertex
//! buffers, one bind group rebuilt per frame from the current read sides of
//! the double buffers, `draw(0..3)`.
//!
//! [`FullscreenProgram`] holds what all of them share; the pass modules
//! only describe their bindings and which targets they read and write.

pub mod accumulate;
pub mod blit;
pub mod light_shaft;
pub mod scene;
pub mod state;
pub mod static_noise;

use super::shader_loader;

pub use accumulate::AccumulatePass;
pub use blit::BlitPass;
pub use light_shaft::LightShaftPass;
pub use scene::ScenePass;
pub use state::StatePass;
pub use static_noise::StaticNoisePass;

/// Binding slot types used by the pass programs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// The shared frame uniform block (always binding 0)
    Uniform,
    /// Filterable float texture
    Texture,
    /// Non-filterable float texture (R32Float depth proxies), read with textureLoad
    UnfilterableTexture,
    /// Filtering sampler
    Sampler,
}

impl BindingKind {
    fn layout_entry(self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        let ty = match self {
            BindingKind::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::UnfilterableTexture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        };
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty,
            count: None,
        }
    }
}

/// Description of one fullscreen pass program
pub struct ProgramDesc<'a> {
    pub label: &'static str,
    /// Binding kinds in binding-index order
    pub bindings: &'a [BindingKind],
    /// Output formats, one per color attachment
    pub targets: &'a [wgpu::TextureFormat],
    /// Pipeline-overridable constants
    pub constants: &'a [(&'a str, f64)],
}

/// A fullscreen-triangle render pipeline plus its bind group layout
pub struct FullscreenProgram {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl FullscreenProgram {
    /// Compile `body` (with the shared preamble) into a program.
    pub fn new(device: &wgpu::Device, body: &str, desc: &ProgramDesc<'_>) -> Self {
        let module = shader_loader::create_shader_module(device, desc.label, body);
        Self::with_module(device, &module, desc)
    }

    /// Build a program from an already compiled module (variants share one).
    pub fn with_module(device: &wgpu::Device, module: &wgpu::ShaderModule, desc: &ProgramDesc<'_>) -> Self {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .bindings
            .iter()
            .enumerate()
            .map(|(index, kind)| kind.layout_entry(index as u32))
            .collect();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(desc.label),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let targets: Vec<Option<wgpu::ColorTargetState>> = desc
            .targets
            .iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format: *format,
                    blend: None, // Every pass overwrites its target
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[], // Fullscreen triangle, no vertex buffer
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: desc.constants,
                    ..Default::default()
                },
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // No culling for fullscreen triangle
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            label: desc.label,
            pipeline,
            bind_group_layout,
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Bind `resources` in binding-index order.
    pub fn bind_group(&self, device: &wgpu::Device, resources: &[wgpu::BindingResource<'_>]) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = resources
            .iter()
            .enumerate()
            .map(|(index, resource)| wgpu::BindGroupEntry {
                binding: index as u32,
                resource: resource.clone(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Record one fullscreen draw into `outputs`, clearing them first.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, outputs: &[&wgpu::TextureView]) {
        let attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = outputs
            .iter()
            .map(|view| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect();

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &attachments,
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
