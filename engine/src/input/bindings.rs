//! Input Bindings Module
//!
//! Maps physical keys to flight actions. Several keys may drive the same
//! action (WASD and the arrow keys both steer), but each key drives at most
//! one action.

use std::collections::HashMap;

use super::{FlightAction, KeyCode};

/// Key → action table with customizable bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    key_to_action: HashMap<KeyCode, FlightAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Default bindings:
    /// - W / ArrowUp = Forward, S / ArrowDown = Back
    /// - A / ArrowLeft = StrafeLeft, D / ArrowRight = StrafeRight
    /// - E / Space = Up, Q = Down
    /// - Shift = Boost, Ctrl = Brake
    pub fn new() -> Self {
        let mut bindings = Self {
            key_to_action: HashMap::new(),
        };

        bindings.bind(KeyCode::W, FlightAction::Forward);
        bindings.bind(KeyCode::ArrowUp, FlightAction::Forward);
        bindings.bind(KeyCode::S, FlightAction::Back);
        bindings.bind(KeyCode::ArrowDown, FlightAction::Back);
        bindings.bind(KeyCode::A, FlightAction::StrafeLeft);
        bindings.bind(KeyCode::ArrowLeft, FlightAction::StrafeLeft);
        bindings.bind(KeyCode::D, FlightAction::StrafeRight);
        bindings.bind(KeyCode::ArrowRight, FlightAction::StrafeRight);
        bindings.bind(KeyCode::E, FlightAction::Up);
        bindings.bind(KeyCode::Space, FlightAction::Up);
        bindings.bind(KeyCode::Q, FlightAction::Down);
        bindings.bind(KeyCode::ShiftLeft, FlightAction::Boost);
        bindings.bind(KeyCode::ShiftRight, FlightAction::Boost);
        bindings.bind(KeyCode::ControlLeft, FlightAction::Brake);
        bindings.bind(KeyCode::ControlRight, FlightAction::Brake);

        bindings
    }

    /// Bind a key to an action, replacing whatever the key drove before.
    pub fn bind(&mut self, key: KeyCode, action: FlightAction) {
        self.key_to_action.insert(key, action);
    }

    /// Remove the binding for a specific key.
    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_to_action.remove(&key);
    }

    /// Remove every key bound to an action.
    pub fn unbind_action(&mut self, action: FlightAction) {
        self.key_to_action.retain(|_, bound| *bound != action);
    }

    /// Get the action bound to a physical key, if any.
    pub fn get_action(&self, key: KeyCode) -> Option<FlightAction> {
        self.key_to_action.get(&key).copied()
    }

    /// All keys bound to an action (unordered).
    pub fn keys_for(&self, action: FlightAction) -> Vec<KeyCode> {
        self.key_to_action
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
            .collect()
    }
}
