//! Input Module
//!
//! Platform-agnostic input capture. The host forwards events as they
//! arrive; the renderer drains them once per frame with
//! [`InputState::take_frame`], so a frame sees the same input no matter how
//! events were spread across it.
//!
//! # Example
//!
//! ```rust,ignore
//! use skyflight_engine::input::{InputState, KeyCode};
//!
//! let mut input = InputState::new();
//!
//! // Event loop
//! input.handle_key(KeyCode::W, true);
//! input.pointer.accumulate_look(4.0, -1.0);
//!
//! // Once per frame
//! let frame = input.take_frame();
//! if frame.actions.forward {
//!     // fly forward
//! }
//! ```

pub mod bindings;
pub mod keyboard;
pub mod mouse_state;

use std::collections::HashSet;

use glam::Vec2;

pub use bindings::KeyBindings;
pub use keyboard::{ActionState, FlightAction, KeyCode};
pub use mouse_state::PointerState;

/// Everything the camera controller reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Cursor motion while the primary button was held (pixels)
    pub drag_delta: Vec2,
    /// Raw motion while the pointer was captured (pixels)
    pub look_delta: Vec2,
    pub pointer_held: bool,
    pub pointer_locked: bool,
    /// Pixel-to-drag scale (1 / device pixel ratio on HiDPI hosts)
    pub pointer_scale: f32,
    /// Wheel notches, positive = away from the user
    pub wheel: f32,
    pub actions: ActionState,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            drag_delta: Vec2::ZERO,
            look_delta: Vec2::ZERO,
            pointer_held: false,
            pointer_locked: false,
            pointer_scale: 1.0,
            wheel: 0.0,
            actions: ActionState::default(),
        }
    }
}

/// Combined input state accumulated between frames.
#[derive(Debug, Clone)]
pub struct InputState {
    pub pointer: PointerState,
    pub bindings: KeyBindings,
    held_keys: HashSet<KeyCode>,
    actions: ActionState,
    wheel: f32,
    pointer_scale: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: PointerState::new(),
            bindings: KeyBindings::new(),
            held_keys: HashSet::new(),
            actions: ActionState::new(),
            wheel: 0.0,
            pointer_scale: 1.0,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release.
    ///
    /// Returns `true` if the key is bound to a flight action.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if pressed {
            self.held_keys.insert(key);
        } else {
            self.held_keys.remove(&key);
        }

        let Some(action) = self.bindings.get_action(key) else {
            return false;
        };
        // Another key bound to the same action may still be held
        let held = self
            .held_keys
            .iter()
            .any(|k| self.bindings.get_action(*k) == Some(action));
        self.actions.set(action, held);
        true
    }

    /// Record wheel motion in notches.
    pub fn handle_wheel(&mut self, notches: f32) {
        if notches.is_finite() {
            self.wheel += notches;
        }
    }

    pub fn set_pointer_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.pointer_scale = scale;
        }
    }

    /// Current held actions (not consumed).
    pub fn actions(&self) -> ActionState {
        self.actions
    }

    /// Drain the per-frame deltas. Held state (keys, buttons, capture) persists.
    pub fn take_frame(&mut self) -> FrameInput {
        FrameInput {
            drag_delta: self.pointer.consume_drag(),
            look_delta: self.pointer.consume_look(),
            pointer_held: self.pointer.is_held(),
            pointer_locked: self.pointer.is_captured(),
            pointer_scale: self.pointer_scale,
            wheel: std::mem::take(&mut self.wheel),
            actions: self.actions,
        }
    }

    /// Return a drained frame's deltas after the frame was skipped, ahead of
    /// anything accumulated since.
    pub fn restore_frame(&mut self, frame: &FrameInput) {
        self.pointer.restore(frame.drag_delta, frame.look_delta);
        self.handle_wheel(frame.wheel);
    }

    /// Release all keys and buttons (focus loss).
    pub fn reset(&mut self) {
        self.held_keys.clear();
        self.actions.reset();
        self.pointer.reset();
        self.wheel = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_frame_drains_deltas() {
        let mut input = InputState::new();
        input.handle_wheel(2.0);
        input.pointer.set_captured(true);
        input.pointer.accumulate_look(5.0, 0.0);

        let frame = input.take_frame();
        assert_eq!(frame.wheel, 2.0);
        assert_eq!(frame.look_delta, Vec2::new(5.0, 0.0));
        assert!(frame.pointer_locked);

        let next = input.take_frame();
        assert_eq!(next.wheel, 0.0);
        assert_eq!(next.look_delta, Vec2::ZERO);
        assert!(next.pointer_locked);
    }

    #[test]
    fn test_skipped_frame_deltas_are_restored() {
        let mut input = InputState::new();
        input.handle_wheel(1.0);
        input.pointer.set_captured(true);
        input.pointer.accumulate_look(3.0, -2.0);

        let skipped = input.take_frame();
        input.pointer.accumulate_look(1.0, 1.0);
        input.restore_frame(&skipped);

        let frame = input.take_frame();
        assert_eq!(frame.look_delta, Vec2::new(4.0, -1.0));
        assert_eq!(frame.wheel, 1.0);
    }

    #[test]
    fn test_restore_drops_look_after_capture_lost() {
        let mut input = InputState::new();
        input.pointer.set_held(true);
        input.pointer.move_to(0.0, 0.0);
        input.pointer.move_to(10.0, 5.0);
        input.pointer.set_captured(true);
        input.pointer.accumulate_look(7.0, 0.0);

        let skipped = input.take_frame();
        input.pointer.set_captured(false);
        input.restore_frame(&skipped);

        let frame = input.take_frame();
        assert_eq!(frame.look_delta, Vec2::ZERO);
        assert_eq!(frame.drag_delta, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_keys_persist_across_frames() {
        let mut input = InputState::new();
        assert!(input.handle_key(KeyCode::W, true));
        assert!(input.take_frame().actions.forward);
        assert!(input.take_frame().actions.forward);

        input.handle_key(KeyCode::W, false);
        assert!(!input.take_frame().actions.forward);
    }

    #[test]
    fn test_two_keys_same_action() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::W, true);
        input.handle_key(KeyCode::ArrowUp, true);
        input.handle_key(KeyCode::W, false);
        assert!(input.actions().forward);

        input.handle_key(KeyCode::ArrowUp, false);
        assert!(!input.actions().forward);
    }

    #[test]
    fn test_unbound_key_ignored() {
        let mut input = InputState::new();
        assert!(!input.handle_key(KeyCode::Escape, true));
        assert_eq!(input.actions(), ActionState::default());
    }
}
