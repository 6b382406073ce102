//! # Input Manager
//!
//! Collects raw keyboard and mouse events between frames and turns them into
//! a [`ProcessedInputState`] of per-key transitions once per frame.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

/// Inventory selection keys, in slot order.
pub const SLOT_KEYS: [KeyCode; 10] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
];

const KEY_CODES: [KeyCode; 7] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::Tab,
    KeyCode::Escape,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Tracks the state of every key and button the game reacts to.
#[derive(Debug, Clone)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates an InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let keyboard: HashMap<KeyCode, bool> = KEY_CODES
            .into_iter()
            .chain(SLOT_KEYS)
            .map(|key| (key, false))
            .collect();
        let buttons: HashMap<MouseButton, bool> =
            MOUSE_BUTTONS.into_iter().map(|button| (button, false)).collect();

        Self {
            keyboard_inputs_old: keyboard.clone(),
            keyboard_inputs_new: keyboard,
            mouse_inputs: MouseInput {
                mouse_button_inputs_old: buttons.clone(),
                mouse_button_inputs_new: buttons,
                mouse_delta: None,
            },
        }
    }

    /// Copies the current state into the old state for the next frame's comparisons.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Updates key and button state from a window event.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed)
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Records a key as down or up. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    /// Records a mouse button as down or up. Untracked buttons are ignored.
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            *button_state = pressed;
        }
    }

    /// Adds a raw mouse movement to this frame's delta.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Releases every key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|state| *state = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|state| *state = false);
    }

    /// Builds this frame's transitions from the old and new raw states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns this frame's processed input and starts a new frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.move_old_states();
        self.mouse_inputs.mouse_delta = None;
        processed_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_hold_then_release() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyW, true);
        assert!(manager
            .get_and_reset_processed_input()
            .get_key_state(KeyCode::KeyW)
            .is_just_pressed());
        assert_eq!(
            manager
                .get_and_reset_processed_input()
                .get_key_state(KeyCode::KeyW),
            RawInputState::Held
        );
        manager.set_key(KeyCode::KeyW, false);
        assert!(manager
            .get_and_reset_processed_input()
            .get_key_state(KeyCode::KeyW)
            .is_just_released());
    }

    #[test]
    fn test_mouse_motion_accumulates_until_reset() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((1.0, 2.0));
        manager.intake_mouse_motion((3.0, -1.0));
        assert_eq!(
            manager.get_and_reset_processed_input().get_mouse_delta(),
            Some((4.0, 1.0))
        );
        assert_eq!(manager.get_and_reset_processed_input().get_mouse_delta(), None);
    }

    #[test]
    fn test_release_all() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyA, true);
        manager.set_mouse_button(MouseButton::Left, true);
        manager.get_and_reset_processed_input();
        manager.release_all();
        let input = manager.get_and_reset_processed_input();
        assert!(input.get_key_state(KeyCode::KeyA).is_just_released());
        assert!(input
            .get_mouse_button_state(MouseButton::Left)
            .is_just_released());
    }
}
