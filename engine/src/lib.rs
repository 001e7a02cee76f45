//! Skyflight Engine Library
//!
//! A real-time volumetric sky renderer: ray-marched clouds over a ground
//! plane, refined over frames by temporal accumulation, viewed through an
//! orbit or flight camera, with optional light shafts toward the sun.
//!
//! # Modules
//!
//! - [`render`] - Render targets, the per-frame pass pipeline and the wgpu renderer
//! - [`temporal`] - Accumulation reset policy and reprojection math
//! - [`camera`] - Orbit, free-fly and banked-flight camera controller
//! - [`input`] - Platform-agnostic keyboard and pointer capture
//! - [`settings`] - Per-frame settings snapshot, loadable from JSON
//! - [`telemetry`] - FPS and flight instruments
//!
//! # Example
//!
//! ```ignore
//! use skyflight_engine::render::{GpuContextConfig, SkyRenderer};
//! use skyflight_engine::input::InputState;
//! use skyflight_engine::settings::Settings;
//!
//! let settings = Settings::default();
//! let mut renderer = pollster::block_on(SkyRenderer::new(window, &GpuContextConfig::default(), &settings))?;
//! let mut input = InputState::new();
//!
//! // Once per frame
//! let telemetry = renderer.render_frame(&input.take_frame(), &settings, dt)?;
//! window.set_title(&telemetry.summary());
//! ```

pub mod camera;
pub mod error;
pub mod input;
pub mod render;
pub mod settings;
pub mod telemetry;
pub mod temporal;

pub use camera::{CameraController, CameraMode, CameraPose};
pub use error::{ConfigError, FrameError, InitError};
pub use input::{FrameInput, InputState, KeyCode};
pub use settings::Settings;
pub use telemetry::FrameTelemetry;
