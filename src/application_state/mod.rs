//! # Application State Management
//!
//! The layer between a windowing system and the engine:
//! - Input tracking (winit key codes and mouse buttons)
//! - Translation of input into a [`PlayerAction`]
//! - Mouse capture, which gates mouse look and block edits
//! - The fixed-rate tick loop

pub mod input_manager;
pub mod input_state;

use input_manager::{InputManager, SLOT_KEYS};
use input_state::ProcessedInputState;
use log::{debug, warn};
use web_time::{Duration, Instant};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::engine_state::{EngineState, PlayerAction};
use crate::error::WorldResult;

/// Drives an [`EngineState`] from collected input.
pub struct ApplicationState {
    /// The simulation being driven
    pub engine_state: EngineState,

    /// Collects input events between frames
    pub input_manager: InputManager,

    /// Whether mouse movement and clicks go to the game
    pub mouse_captured: bool,

    /// Timestamp of the last frame for delta time calculations
    pub last_frame_time: Instant,
}

impl ApplicationState {
    pub fn new(engine_state: EngineState) -> Self {
        Self {
            engine_state,
            input_manager: InputManager::new(),
            mouse_captured: true,
            last_frame_time: Instant::now(),
        }
    }

    /// Translates one frame of input into player intent.
    ///
    /// While the mouse is released, a click only recaptures it; mouse look
    /// and block edits need a captured mouse.
    pub fn translate_input(&mut self, input: &ProcessedInputState) -> PlayerAction {
        let mut player_action = PlayerAction::default();

        // Movement - active while held
        let axis = |negative: KeyCode, positive: KeyCode| {
            input.get_key_state(positive).is_active() as i8
                - input.get_key_state(negative).is_active() as i8
        };
        player_action.strafe = [axis(KeyCode::KeyW, KeyCode::KeyS), axis(KeyCode::KeyA, KeyCode::KeyD)];

        // One-shot actions - only on press, not hold
        player_action.jump = input.get_key_state(KeyCode::Space).is_just_pressed();
        player_action.toggle_flying = input.get_key_state(KeyCode::Tab).is_just_pressed();
        player_action.select_slot = SLOT_KEYS
            .iter()
            .position(|key| input.get_key_state(*key).is_just_pressed());

        if input.get_key_state(KeyCode::Escape).is_just_pressed() && self.mouse_captured {
            self.mouse_captured = false;
            player_action.release_mouse = true;
            return player_action;
        }

        let left = input.get_mouse_button_state(MouseButton::Left).is_just_pressed();
        let right = input.get_mouse_button_state(MouseButton::Right).is_just_pressed();

        if !self.mouse_captured {
            if left || right {
                debug!("Mouse captured");
                self.mouse_captured = true;
            }
            return player_action;
        }

        // winit reports y growing downward; looking up is positive pitch.
        player_action.rotate_view = input.get_mouse_delta().map(|(dx, dy)| (dx, -dy));
        player_action.break_block = left;
        player_action.place_block = right && !left;

        player_action
    }

    /// Runs one frame using the wall-clock time since the previous frame.
    pub fn frame(&mut self) -> WorldResult<()> {
        let now = Instant::now();
        let dt = now - self.last_frame_time;
        self.last_frame_time = now;
        self.step(dt.as_secs_f32())
    }

    /// Runs one frame of `dt` seconds: collects input, applies it, then ticks.
    ///
    /// Failed block edits are logged and do not stop the frame.
    pub fn step(&mut self, dt: f32) -> WorldResult<()> {
        let processed_input = self.input_manager.get_and_reset_processed_input();
        let action = self.translate_input(&processed_input);
        if let Err(err) = self.engine_state.apply_action(&action) {
            warn!("Player action failed: {}", err);
        }
        self.engine_state.tick(dt)
    }

    /// Runs `ticks` frames at the configured tick rate, sleeping between them.
    pub fn run_loop(&mut self, ticks: u64) -> WorldResult<()> {
        let rate = self.engine_state.config().ticks_per_sec.max(1);
        let tick_duration = Duration::from_secs_f64(1.0 / rate as f64);
        let mut next_tick = Instant::now();
        self.last_frame_time = next_tick;

        for _ in 0..ticks {
            self.frame()?;
            next_tick += tick_duration;
            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            } else {
                // Running behind; don't try to catch up with a burst of ticks.
                next_tick = now;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine_state::rendering::MeshRenderer;
    use std::sync::Arc;

    fn app() -> ApplicationState {
        let engine =
            EngineState::new(GameConfig::default(), Arc::new(MeshRenderer::new())).unwrap();
        ApplicationState::new(engine)
    }

    #[test]
    fn test_strafe_from_keys() {
        let mut app = app();
        app.input_manager.set_key(KeyCode::KeyW, true);
        app.input_manager.set_key(KeyCode::KeyD, true);
        let input = app.input_manager.get_and_reset_processed_input();
        assert_eq!(app.translate_input(&input).strafe, [-1, 1]);

        app.input_manager.set_key(KeyCode::KeyS, true);
        let input = app.input_manager.get_and_reset_processed_input();
        assert_eq!(app.translate_input(&input).strafe, [0, 1]);
    }

    #[test]
    fn test_jump_only_on_press() {
        let mut app = app();
        app.input_manager.set_key(KeyCode::Space, true);
        let input = app.input_manager.get_and_reset_processed_input();
        assert!(app.translate_input(&input).jump);
        let input = app.input_manager.get_and_reset_processed_input();
        assert!(!app.translate_input(&input).jump);
    }

    #[test]
    fn test_escape_releases_and_click_recaptures() {
        let mut app = app();
        app.input_manager.set_key(KeyCode::Escape, true);
        let input = app.input_manager.get_and_reset_processed_input();
        assert!(app.translate_input(&input).release_mouse);
        assert!(!app.mouse_captured);

        app.input_manager.set_mouse_button(MouseButton::Left, true);
        app.input_manager.intake_mouse_motion((5.0, 5.0));
        let input = app.input_manager.get_and_reset_processed_input();
        let action = app.translate_input(&input);
        assert!(app.mouse_captured);
        assert!(!action.break_block);
        assert_eq!(action.rotate_view, None);
    }

    #[test]
    fn test_slot_keys() {
        let mut app = app();
        app.input_manager.set_key(KeyCode::Digit3, true);
        let input = app.input_manager.get_and_reset_processed_input();
        assert_eq!(app.translate_input(&input).select_slot, Some(2));
    }

    #[test]
    fn test_mouse_y_is_inverted_for_pitch() {
        let mut app = app();
        app.input_manager.intake_mouse_motion((2.0, 3.0));
        let input = app.input_manager.get_and_reset_processed_input();
        assert_eq!(app.translate_input(&input).rotate_view, Some((2.0, -3.0)));
    }
}
