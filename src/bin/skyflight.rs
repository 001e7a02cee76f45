//! Skyflight
//!
//! Run with: `cargo run --bin skyflight -- [settings.json]`
//!
//! Volumetric sky viewer. Starts in orbit mode around the scene center.
//!
//! Controls:
//! - Left-drag: Orbit (orbit mode)
//! - Click: Capture pointer for mouse look (flight modes)
//! - WASD / Arrows: Fly, Space/E: Up, Q: Down
//! - Shift: Boost, Ctrl: Brake
//! - Scroll: Zoom
//! - 1/2/3: Orbit / Free-fly / Banked flight
//! - R: Reset camera
//! - ESC: Release pointer, or exit when not captured

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use skyflight_engine::camera::CameraMode;
use skyflight_engine::input::{InputState, KeyCode};
use skyflight_engine::render::{GpuContextConfig, SkyRenderer};
use skyflight_engine::settings::Settings;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

/// Pixels per wheel notch for touchpads that report pixel deltas
const PIXELS_PER_NOTCH: f32 = 40.0;

fn map_key(key: WinitKeyCode) -> KeyCode {
    match key {
        WinitKeyCode::KeyW => KeyCode::W,
        WinitKeyCode::KeyA => KeyCode::A,
        WinitKeyCode::KeyS => KeyCode::S,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::KeyQ => KeyCode::Q,
        WinitKeyCode::KeyE => KeyCode::E,
        WinitKeyCode::KeyR => KeyCode::R,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::ShiftLeft => KeyCode::ShiftLeft,
        WinitKeyCode::ShiftRight => KeyCode::ShiftRight,
        WinitKeyCode::ControlLeft => KeyCode::ControlLeft,
        WinitKeyCode::ControlRight => KeyCode::ControlRight,
        WinitKeyCode::ArrowUp => KeyCode::ArrowUp,
        WinitKeyCode::ArrowDown => KeyCode::ArrowDown,
        WinitKeyCode::ArrowLeft => KeyCode::ArrowLeft,
        WinitKeyCode::ArrowRight => KeyCode::ArrowRight,
        WinitKeyCode::Digit1 => KeyCode::Digit1,
        WinitKeyCode::Digit2 => KeyCode::Digit2,
        WinitKeyCode::Digit3 => KeyCode::Digit3,
        WinitKeyCode::Escape => KeyCode::Escape,
        _ => KeyCode::Unknown,
    }
}

struct AppState {
    window: Arc<Window>,
    renderer: SkyRenderer,
    input: InputState,
    settings: Settings,
    last_frame: Instant,
}

impl AppState {
    fn new(window: Arc<Window>, settings: Settings) -> Result<Self, skyflight_engine::InitError> {
        let renderer = pollster::block_on(SkyRenderer::new(
            Arc::clone(&window),
            &GpuContextConfig::default(),
            &settings,
        ))?;
        let mut input = InputState::new();
        input.set_pointer_scale(1.0 / window.scale_factor() as f32);

        Ok(Self {
            window,
            renderer,
            input,
            settings,
            last_frame: Instant::now(),
        })
    }

    /// Hide and lock the cursor. Falls back to confining it where locking
    /// is unsupported.
    fn set_pointer_captured(&mut self, captured: bool) {
        if captured {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("Pointer capture unavailable: {}", e);
                return;
            }
            self.window.set_cursor_visible(false);
        } else {
            if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("Pointer release failed: {}", e);
            }
            self.window.set_cursor_visible(true);
        }
        self.input.pointer.set_captured(captured);
    }

    /// Returns `false` when the app should exit.
    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if pressed {
            let mode = match key {
                KeyCode::Digit1 => Some(CameraMode::Orbit),
                KeyCode::Digit2 => Some(CameraMode::FreeFly),
                KeyCode::Digit3 => Some(CameraMode::BankedFlight),
                _ => None,
            };
            if let Some(mode) = mode {
                self.renderer.state_mut().request_mode(mode);
                if !mode.is_flight() && self.input.pointer.is_captured() {
                    self.set_pointer_captured(false);
                }
                return true;
            }

            match key {
                KeyCode::R => {
                    self.renderer.state_mut().reset_camera();
                    return true;
                }
                KeyCode::Escape => {
                    if self.input.pointer.is_captured() {
                        self.set_pointer_captured(false);
                        return true;
                    }
                    return false;
                }
                _ => {}
            }
        }

        self.input.handle_key(key, pressed);
        true
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        let flying = self.renderer.state().controller.mode().is_flight();
        if flying && pressed && !self.input.pointer.is_captured() {
            self.set_pointer_captured(true);
        }
        self.input.pointer.set_held(pressed && !flying);
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
        };
        self.input.handle_wheel(notches);
    }

    /// Returns `false` on a fatal error.
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let frame = self.input.take_frame();
        match self.renderer.render_frame(&frame, &self.settings, dt) {
            Ok(telemetry) => {
                self.window.set_title(&format!("Skyflight | {}", telemetry.summary()));
                true
            }
            Err(e) if e.is_fatal() => {
                log::error!("{}", e);
                false
            }
            Err(e) => {
                // The frame never reached the camera; keep its motion for the next one
                self.input.restore_frame(&frame);
                if e.needs_reconfigure() {
                    log::warn!("{}; reconfiguring surface", e);
                    self.renderer.reconfigure();
                } else {
                    log::warn!("Frame skipped: {}", e);
                }
                true
            }
        }
    }
}

struct App {
    settings: Settings,
    state: Option<AppState>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("Skyflight")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        match AppState::new(window, self.settings) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
                log::info!("Ready. 1/2/3 switch camera mode, click to capture the pointer in flight, R resets, ESC exits");
            }
            Err(e) => {
                log::error!("Renderer initialization failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.renderer.resize(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.input.set_pointer_scale(1.0 / scale_factor as f32);
            }
            WindowEvent::Focused(false) => {
                if state.input.pointer.is_captured() {
                    state.set_pointer_captured(false);
                }
                state.input.reset();
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if repeat && pressed {
                    return;
                }
                if !state.handle_key(map_key(key), pressed) {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput { button, state: btn_state, .. } => {
                state.handle_mouse_button(button, btn_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.input.pointer.move_to(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state.handle_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                if !state.redraw() {
                    event_loop.exit();
                    return;
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (&mut self.state, event) {
            state.input.pointer.accumulate_look(delta.0 as f32, delta.1 as f32);
        }
    }
}

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        return Settings::default();
    };
    match Settings::load(&path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("{}: {}; using defaults", path.display(), e);
            Settings::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Event loop creation failed: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        settings: load_settings(),
        state: None,
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
