//! # Configuration
//!
//! Tunable constants for world generation, player physics, view distance and
//! controls. Every field has a default, so a config file only needs to name
//! the values it overrides:
//!
//! ```json
//! { "physics": { "gravity": 9.8 }, "view": { "render_workers": 4 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "CRAFTER_CONFIG";

/// Largest accepted view radius, in sectors.
pub const MAX_VIEW_RADIUS: i32 = 64;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldGenConfig,
    pub physics: PhysicsConfig,
    pub view: ViewConfig,
    pub controls: ControlsConfig,
    /// Simulation ticks per second.
    pub ticks_per_sec: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldGenConfig::default(),
            physics: PhysicsConfig::default(),
            view: ViewConfig::default(),
            controls: ControlsConfig::default(),
            ticks_per_sec: 60,
        }
    }
}

/// Flat-world generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Half the width of the square world; the world spans `-half_width..=half_width`.
    pub half_width: i32,
    /// Reference height the terrain layers are placed relative to.
    pub base_height: i32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            half_width: 160,
            base_height: 0,
        }
    }
}

/// Player movement and collision parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal speed when walking, in blocks per second.
    pub walking_speed: f32,
    /// Speed when flying, in blocks per second.
    pub flying_speed: f32,
    /// Downward acceleration, in blocks per second squared.
    pub gravity: f32,
    /// Apex of a jump, in blocks.
    pub max_jump_height: f32,
    /// Cap on falling speed, in blocks per second.
    pub terminal_velocity: f32,
    /// Number of vertically stacked cells the player occupies.
    pub player_height: i32,
    /// Overlap with a neighboring block tolerated before it counts as a collision.
    ///
    /// At 0 any contact collides; near 0.5 the player sinks into the ground as
    /// if wading through tall grass; at 0.5 or more they fall through.
    pub collision_pad: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            walking_speed: 5.0,
            flying_speed: 15.0,
            gravity: 20.0,
            max_jump_height: 1.0,
            terminal_velocity: 50.0,
            player_height: 2,
            collision_pad: 0.25,
        }
    }
}

impl PhysicsConfig {
    /// Initial upward speed that peaks at exactly `max_jump_height`.
    ///
    /// Solving `v_t = v_0 - g t` for the apex (`v_t = 0`) and substituting into
    /// `s = v_0 t - g t^2 / 2` gives `v_0 = sqrt(2 g h)`.
    pub fn jump_speed(&self) -> f32 {
        (2.0 * self.gravity * self.max_jump_height).sqrt()
    }
}

/// Visibility parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Width and depth of a sector, in cells.
    pub sector_size: i32,
    /// Radius of the disc of visible sectors around the player, in sectors.
    pub view_radius: i32,
    /// Worker threads building block geometry. 0 runs render work inline.
    pub render_workers: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sector_size: 16,
            view_radius: 5,
            render_workers: 0,
        }
    }
}

/// Input tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Degrees of rotation per unit of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.15,
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults if it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view.sector_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "view.sector_size must be positive, got {}",
                self.view.sector_size
            )));
        }
        if !(0..=MAX_VIEW_RADIUS).contains(&self.view.view_radius) {
            return Err(ConfigError::Invalid(format!(
                "view.view_radius must be in [0, {}], got {}",
                MAX_VIEW_RADIUS, self.view.view_radius
            )));
        }
        if self.world.half_width < 1 {
            return Err(ConfigError::Invalid(format!(
                "world.half_width must be at least 1, got {}",
                self.world.half_width
            )));
        }
        if self.physics.player_height < 1 {
            return Err(ConfigError::Invalid(format!(
                "physics.player_height must be at least 1, got {}",
                self.physics.player_height
            )));
        }
        if !(0.0..0.5).contains(&self.physics.collision_pad) {
            return Err(ConfigError::Invalid(format!(
                "physics.collision_pad must be in [0, 0.5), got {}",
                self.physics.collision_pad
            )));
        }
        let speeds = [
            ("walking_speed", self.physics.walking_speed),
            ("flying_speed", self.physics.flying_speed),
            ("gravity", self.physics.gravity),
            ("max_jump_height", self.physics.max_jump_height),
            ("terminal_velocity", self.physics.terminal_velocity),
        ];
        for (name, value) in speeds {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "physics.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.ticks_per_sec == 0 {
            return Err(ConfigError::Invalid("ticks_per_sec must be positive".into()));
        }
        Ok(())
    }
}
