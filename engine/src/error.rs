//! Error Types
//!
//! Errors fall into two tiers:
//! - [`InitError`]: fatal for the whole session (no partial rendering)
//! - [`FrameError`]: local to one frame, the next display frame retries
//!
//! Settings files have their own [`ConfigError`].

use thiserror::Error;

/// Session-fatal failures raised while bringing up the GPU and pass programs.
#[derive(Error, Debug)]
pub enum InitError {
    /// No adapter compatible with the surface was found.
    #[error("Failed to request GPU adapter: {0}")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The window could not be turned into a presentable surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable texture format for this adapter.
    #[error("Surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    /// A pass program failed shader validation or pipeline creation.
    #[error("Pass program '{label}' failed to build: {message}")]
    PipelineBuildFailed {
        /// Which pass program failed
        label: &'static str,
        /// Validation message reported by wgpu
        message: String,
    },
}

/// Frame-local failures. The frame is skipped; nothing is swapped.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Render targets could not be allocated at the requested size.
    #[error("Render target allocation failed at {width}x{height}: {message}")]
    Allocation {
        width: u32,
        height: u32,
        message: String,
    },

    /// Acquiring the swapchain image failed.
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl FrameError {
    /// Whether the surface must be reconfigured before the next frame.
    pub fn needs_reconfigure(&self) -> bool {
        matches!(
            self,
            FrameError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }

    /// Whether continuing is pointless (device is out of memory).
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::Surface(wgpu::SurfaceError::OutOfMemory))
    }
}

/// Failures while loading a settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
