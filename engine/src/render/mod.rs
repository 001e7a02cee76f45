//! Render Module
//!
//! GPU side of the sky renderer: render targets, the fixed pass pipeline,
//! the uniform block shared by every pass, light projection and the weather
//! maps. The pure planning pieces ([`pipeline`], [`targets`],
//! [`light_projection`], [`uniforms`]) never touch a device and are tested on
//! the CPU.

pub mod gpu_context;
pub mod light_projection;
pub mod passes;
pub mod pipeline;
pub mod renderer;
pub mod shader_loader;
pub mod targets;
pub mod uniforms;
pub mod weather;

pub use gpu_context::{GpuContext, GpuContextConfig};
pub use light_projection::{LightProjection, GODRAY_SKIP_THRESHOLD};
pub use pipeline::{Composite, FramePlan, PassKind, PassRecorder, SceneVariant};
pub use renderer::{FrameRecord, RendererState, SkyRenderer};
pub use targets::{
    PingPong, RenderTarget, ResourceManager, TargetAllocator, TargetBundle, TargetDesc, TargetFormat, TargetLayout,
};
pub use uniforms::FrameUniforms;
pub use weather::{WeatherMaps, WEATHER_MAP_SIZE};
