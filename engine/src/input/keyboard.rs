//! Keyboard Input Module
//!
//! Generic key codes and the held-state of the named flight actions.
//! Decoupled from winit; the host maps its own key codes onto [`KeyCode`].

use glam::Vec3;

/// Generic key codes, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Q,
    E,
    R,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Digit1,
    Digit2,
    Digit3,
    Escape,
    /// Catch-all for unhandled keys
    Unknown,
}

/// Named actions the camera controller understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightAction {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Up,
    Down,
    Boost,
    Brake,
}

/// Held state of every flight action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
    pub brake: bool,
}

impl ActionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release of an action.
    pub fn set(&mut self, action: FlightAction, pressed: bool) {
        match action {
            FlightAction::Forward => self.forward = pressed,
            FlightAction::Back => self.back = pressed,
            FlightAction::StrafeLeft => self.left = pressed,
            FlightAction::StrafeRight => self.right = pressed,
            FlightAction::Up => self.up = pressed,
            FlightAction::Down => self.down = pressed,
            FlightAction::Boost => self.boost = pressed,
            FlightAction::Brake => self.brake = pressed,
        }
    }

    pub fn is_pressed(&self, action: FlightAction) -> bool {
        match action {
            FlightAction::Forward => self.forward,
            FlightAction::Back => self.back,
            FlightAction::StrafeLeft => self.left,
            FlightAction::StrafeRight => self.right,
            FlightAction::Up => self.up,
            FlightAction::Down => self.down,
            FlightAction::Boost => self.boost,
            FlightAction::Brake => self.brake,
        }
    }

    /// Sum of the held direction keys in camera-local axes
    /// (x = right, y = up, z = forward). Not normalized.
    pub fn movement_axes(&self) -> Vec3 {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        Vec3::new(
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.forward, self.back),
        )
    }

    /// Check if any direction key is held.
    pub fn any_movement(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }

    /// Release everything (e.g. on focus loss).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_all_released() {
        let state = ActionState::new();
        assert!(!state.any_movement());
        assert_eq!(state.movement_axes(), Vec3::ZERO);
    }

    #[test]
    fn test_movement_axes() {
        let mut state = ActionState::new();
        state.set(FlightAction::Forward, true);
        state.set(FlightAction::StrafeRight, true);
        assert_eq!(state.movement_axes(), Vec3::new(1.0, 0.0, 1.0));

        state.set(FlightAction::Back, true);
        assert_eq!(state.movement_axes(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_boost_is_not_movement() {
        let mut state = ActionState::new();
        state.set(FlightAction::Boost, true);
        assert!(!state.any_movement());
        assert!(state.is_pressed(FlightAction::Boost));
    }

    #[test]
    fn test_reset() {
        let mut state = ActionState::new();
        state.set(FlightAction::Up, true);
        state.reset();
        assert!(!state.is_pressed(FlightAction::Up));
    }
}
