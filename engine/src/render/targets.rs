//! Render Targets
//!
//! Owns every offscreen target the frame pipeline reads and writes.
//! Targets that are read and written in the same frame come as a
//! [`PingPong`] pair: passes read `read`, write `write`, and the pipeline
//! swaps the pair after the writing pass so the next reader sees the new
//! content.
//!
//! Allocation goes through the [`TargetAllocator`] trait so resize and
//! swap behavior can be exercised without a GPU.

use crate::error::FrameError;

/// Width/height of the per-frame state target (one texel per slot)
pub const STATE_TARGET_WIDTH: u32 = 4;
pub const STATE_TARGET_HEIGHT: u32 = 1;

/// Sampler filtering for a target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerFilter {
    Nearest,
    Linear,
}

/// Texel format of a target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetFormat {
    /// Half-float RGBA color
    Color,
    /// Single-channel f32 depth proxy
    Depth,
}

impl TargetFormat {
    pub const fn wgpu(self) -> wgpu::TextureFormat {
        match self {
            TargetFormat::Color => wgpu::TextureFormat::Rgba16Float,
            TargetFormat::Depth => wgpu::TextureFormat::R32Float,
        }
    }
}

/// What to allocate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
    pub filter: SamplerFilter,
}

/// Backend that turns a [`TargetDesc`] into a concrete target.
pub trait TargetAllocator {
    type Target;

    fn allocate(&mut self, desc: &TargetDesc) -> Result<Self::Target, FrameError>;
}

/// Double-buffered target pair
#[derive(Debug)]
pub struct PingPong<T> {
    pub read: T,
    pub write: T,
}

impl<T> PingPong<T> {
    pub fn new(read: T, write: T) -> Self {
        Self { read, write }
    }

    /// Exchange roles: what was just written becomes readable.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    fn allocate<A>(allocator: &mut A, desc: TargetDesc) -> Result<PingPong<T>, FrameError>
    where
        A: TargetAllocator<Target = T>,
    {
        let read = allocator.allocate(&desc)?;
        let write = allocator.allocate(&desc)?;
        Ok(PingPong { read, write })
    }
}

/// Target sizes derived from an output size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetLayout {
    /// Surface size
    pub output: (u32, u32),
    /// Internal render size (output scaled by the resolution scale)
    pub internal: (u32, u32),
}

impl TargetLayout {
    pub fn for_output(width: u32, height: u32, resolution_scale: f32) -> Self {
        let scale = if resolution_scale.is_finite() && resolution_scale > 0.0 {
            resolution_scale
        } else {
            1.0
        };
        let output = (width.max(1), height.max(1));
        let scaled = |v: u32| ((v as f32 * scale).round() as u32).max(1);
        Self {
            output,
            internal: (scaled(output.0), scaled(output.1)),
        }
    }

    pub fn descriptors(&self) -> TargetDescriptors {
        let (w, h) = self.internal;
        TargetDescriptors {
            state: TargetDesc {
                label: "State Target",
                width: STATE_TARGET_WIDTH,
                height: STATE_TARGET_HEIGHT,
                format: TargetFormat::Color,
                filter: SamplerFilter::Nearest,
            },
            noise: TargetDesc {
                label: "Static Noise Target",
                width: w,
                height: h,
                format: TargetFormat::Color,
                filter: SamplerFilter::Linear,
            },
            history: TargetDesc {
                label: "History Target",
                width: w,
                height: h,
                format: TargetFormat::Color,
                filter: SamplerFilter::Linear,
            },
            depth: TargetDesc {
                label: "Depth Proxy Target",
                width: w,
                height: h,
                format: TargetFormat::Depth,
                filter: SamplerFilter::Nearest,
            },
            frame_color: TargetDesc {
                label: "Frame Color Target",
                width: w,
                height: h,
                format: TargetFormat::Color,
                filter: SamplerFilter::Linear,
            },
            frame_depth: TargetDesc {
                label: "Frame Depth Target",
                width: w,
                height: h,
                format: TargetFormat::Depth,
                filter: SamplerFilter::Nearest,
            },
        }
    }
}

/// Descriptors of the full target set
#[derive(Clone, Copy, Debug)]
pub struct TargetDescriptors {
    pub state: TargetDesc,
    pub noise: TargetDesc,
    pub history: TargetDesc,
    pub depth: TargetDesc,
    pub frame_color: TargetDesc,
    pub frame_depth: TargetDesc,
}

/// The full set of frame targets
#[derive(Debug)]
pub struct TargetBundle<T> {
    /// Per-frame simulation state (4x1)
    pub state: PingPong<T>,
    /// Procedural noise/advection field, rebuilt only when flagged dirty
    pub noise: PingPong<T>,
    /// Accumulated color
    pub history: PingPong<T>,
    /// Accumulated depth proxy, written alongside history
    pub depth: PingPong<T>,
    /// Scene pass output color
    pub frame_color: T,
    /// Scene pass output depth proxy
    pub frame_depth: T,
}

impl<T> TargetBundle<T> {
    pub fn allocate<A>(allocator: &mut A, layout: &TargetLayout) -> Result<Self, FrameError>
    where
        A: TargetAllocator<Target = T>,
    {
        let desc = layout.descriptors();
        Ok(Self {
            state: PingPong::allocate(allocator, desc.state)?,
            noise: PingPong::allocate(allocator, desc.noise)?,
            history: PingPong::allocate(allocator, desc.history)?,
            depth: PingPong::allocate(allocator, desc.depth)?,
            frame_color: allocator.allocate(&desc.frame_color)?,
            frame_depth: allocator.allocate(&desc.frame_depth)?,
        })
    }
}

/// Owns the target bundle and tracks when it must be rebuilt.
#[derive(Debug)]
pub struct ResourceManager<T> {
    bundle: Option<TargetBundle<T>>,
    layout: Option<TargetLayout>,
    static_dirty: bool,
}

impl<T> Default for ResourceManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceManager<T> {
    pub fn new() -> Self {
        Self {
            bundle: None,
            layout: None,
            static_dirty: true,
        }
    }

    /// (Re)allocate every target for a new output size.
    ///
    /// Returns `Ok(true)` if targets were rebuilt, `Ok(false)` if the size is
    /// unchanged. On allocation failure the old bundle is dropped, so the
    /// frame must be skipped until a later resize succeeds.
    pub fn resize<A>(
        &mut self,
        allocator: &mut A,
        width: u32,
        height: u32,
        resolution_scale: f32,
    ) -> Result<bool, FrameError>
    where
        A: TargetAllocator<Target = T>,
    {
        let layout = TargetLayout::for_output(width, height, resolution_scale);
        if self.bundle.is_some() && self.layout == Some(layout) {
            return Ok(false);
        }

        self.bundle = None;
        self.layout = None;
        self.static_dirty = true;

        let bundle = TargetBundle::allocate(allocator, &layout)?;
        log::info!(
            "Allocated frame targets: output {}x{}, internal {}x{}",
            layout.output.0,
            layout.output.1,
            layout.internal.0,
            layout.internal.1
        );
        self.bundle = Some(bundle);
        self.layout = Some(layout);
        Ok(true)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.bundle.is_some()
    }

    #[inline]
    pub fn layout(&self) -> Option<TargetLayout> {
        self.layout
    }

    pub fn bundle(&self) -> Option<&TargetBundle<T>> {
        self.bundle.as_ref()
    }

    pub fn bundle_mut(&mut self) -> Option<&mut TargetBundle<T>> {
        self.bundle.as_mut()
    }

    /// Whether the static pass must run this frame.
    #[inline]
    pub fn static_pending(&self) -> bool {
        self.static_dirty
    }

    /// Request a static rebuild (e.g. after a settings change that affects noise).
    pub fn mark_static_dirty(&mut self) {
        self.static_dirty = true;
    }

    /// The static pass completed; clear the flag.
    pub fn mark_static_done(&mut self) {
        self.static_dirty = false;
    }

    /// Drop every target (device lost or shutdown).
    pub fn release(&mut self) {
        self.bundle = None;
        self.layout = None;
        self.static_dirty = true;
    }
}

// ============================================================================
// GPU BACKEND
// ============================================================================

/// A GPU texture with its default view and sampler
#[derive(Debug)]
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

/// Allocates [`RenderTarget`]s on a device, reporting out-of-memory as a
/// [`FrameError::Allocation`] instead of a panic.
pub struct GpuAllocator<'a> {
    pub device: &'a wgpu::Device,
}

impl<'a> GpuAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }
}

impl TargetAllocator for GpuAllocator<'_> {
    type Target = RenderTarget;

    fn allocate(&mut self, desc: &TargetDesc) -> Result<RenderTarget, FrameError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width.max(1),
                height: desc.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format.wgpu(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(FrameError::Allocation {
                width: desc.width,
                height: desc.height,
                message: error.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let filter = match desc.filter {
            SamplerFilter::Nearest => wgpu::FilterMode::Nearest,
            SamplerFilter::Linear => wgpu::FilterMode::Linear,
        };
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(desc.label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(RenderTarget {
            texture,
            view,
            sampler,
            width: desc.width.max(1),
            height: desc.height.max(1),
        })
    }
}
