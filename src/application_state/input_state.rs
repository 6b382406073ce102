//! # Input State
//!
//! Per-frame views of keyboard and mouse state used by the input manager.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// The state of a key or button this frame, relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Whether the input is down (pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Whether the input went down this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Whether the input came up this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the transition from last frame's and this frame's raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of input transitions for one frame.
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// State of every tracked keyboard key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// State of every tracked mouse button
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Accumulated mouse movement since the last frame (x right, y down)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the state of a mouse button
    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    /// Gets the mouse movement since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}

/// Tracks mouse buttons and movement.
#[derive(Debug, Clone, Default)]
pub struct MouseInput {
    /// Previous state of each mouse button (pressed/released)
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current state of each mouse button (pressed/released)
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,

    /// Accumulated mouse movement since the last frame
    pub mouse_delta: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Released.is_active());
    }

    #[test]
    fn test_untracked_key_is_not_pressed() {
        let state = ProcessedInputState::default();
        assert_eq!(state.get_key_state(KeyCode::KeyQ), RawInputState::NotPressed);
    }
}
