//! Pointer State Tracker
//!
//! Accumulates pointer motion between frames so the camera controller reads
//! it exactly once per frame, regardless of when events arrived.
//!
//! Two independent channels are tracked:
//! - **drag**: cursor motion while the primary button is held (orbit mode)
//! - **look**: raw device motion while the pointer is captured (flight modes)

use glam::Vec2;

/// Pointer state with per-frame delta accumulation.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Last known cursor position in physical pixels
    position: Option<Vec2>,
    /// Accumulated cursor motion while held
    drag_delta: Vec2,
    /// Accumulated raw motion while captured
    look_delta: Vec2,
    /// Primary button held
    held: bool,
    /// Pointer captured (hidden and locked to the window)
    captured: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an absolute cursor position. Motion counts toward the drag
    /// channel only while the button is held.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let next = Vec2::new(x, y);
        if let (Some(previous), true) = (self.position, self.held) {
            self.drag_delta += next - previous;
        }
        self.position = Some(next);
    }

    /// Record raw device motion. Discarded unless the pointer is captured.
    #[inline]
    pub fn accumulate_look(&mut self, dx: f32, dy: f32) {
        if self.captured {
            self.look_delta += Vec2::new(dx, dy);
        }
    }

    pub fn set_held(&mut self, held: bool) {
        self.held = held;
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Set whether the pointer is captured.
    ///
    /// Losing capture clears the accumulated look delta immediately so a
    /// stale delta never leaks into the next frame.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
        if !captured {
            self.look_delta = Vec2::ZERO;
        }
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Return the accumulated drag delta and reset it.
    pub fn consume_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.drag_delta)
    }

    /// Return the accumulated look delta and reset it.
    pub fn consume_look(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Put back deltas from a frame that was never rendered. Look motion is
    /// dropped if capture was lost in the meantime.
    pub fn restore(&mut self, drag: Vec2, look: Vec2) {
        self.drag_delta += drag;
        if self.captured {
            self.look_delta += look;
        }
    }

    /// Current accumulated (drag, look) deltas without consuming them.
    pub fn peek(&self) -> (Vec2, Vec2) {
        (self.drag_delta, self.look_delta)
    }

    /// Reset all state to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
