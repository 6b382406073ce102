//! # Player State
//!
//! The per-session player record: where the player is, where they look, how
//! fast they are falling, and what they intend to do. Kinematics reads and
//! updates it every tick; input translation only ever sets intent fields
//! (strafe, flying, rotation, selection).

pub mod kinematics;

use cgmath::{Angle, Deg, Point3, Rad, Vector3, Zero};
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::{
    coords::{Position, Sector},
    material::Material,
};

/// Pitch is clamped to this many degrees above and below the horizon.
pub const MAX_PITCH: f32 = 90.0;

/// Materials the player can place, in slot order.
pub const DEFAULT_INVENTORY: [Material; 3] = [Material::Brick, Material::Grass, Material::Sand];

/// Everything the simulation tracks about the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Position,
    /// Rotation about the vertical axis. Unbounded.
    pub yaw: Deg<f32>,
    /// Rotation above (+) or below (-) the horizon, within [-90, 90].
    pub pitch: Deg<f32>,
    /// Vertical velocity in blocks per second.
    pub dy: f32,
    pub flying: bool,
    /// Movement intent as `[forward/back, left/right]`, each in {-1, 0, 1}.
    ///
    /// Forward is -1 and backward +1; left is -1 and right +1.
    pub strafe: [i8; 2],
    /// Sector the player was last seen in; `None` until the first tick.
    pub sector: Option<Sector>,
    pub inventory: Vec<Material>,
    /// Index into `inventory`.
    pub selected: usize,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 0.0))
    }
}

impl PlayerState {
    /// A stationary, walking player at `position` looking along the horizon.
    pub fn new(position: Position) -> Self {
        PlayerState {
            position,
            yaw: Deg(0.0),
            pitch: Deg(0.0),
            dy: 0.0,
            flying: false,
            strafe: [0, 0],
            sector: None,
            inventory: DEFAULT_INVENTORY.to_vec(),
            selected: 0,
        }
    }

    /// Direction the player is moving in, before speed is applied.
    ///
    /// Zero when there is no strafe intent. Walking keeps the vector in the
    /// horizontal plane. Flying tilts it by the pitch, except that lateral
    /// strafing stays level and moving backward mirrors the climb.
    pub fn motion_vector(&self) -> Vector3<f32> {
        if self.strafe == [0, 0] {
            return Vector3::zero();
        }

        let strafe = Deg::from(Rad::atan2(self.strafe[0] as f32, self.strafe[1] as f32));
        let heading = self.yaw + strafe;

        if !self.flying {
            return Vector3::new(heading.cos(), 0.0, heading.sin());
        }

        let (mut dy, mut m) = self.pitch.sin_cos();
        if self.strafe[1] != 0 {
            dy = 0.0;
            m = 1.0;
        }
        if self.strafe[0] > 0 {
            dy = -dy;
        }
        Vector3::new(heading.cos() * m, dy, heading.sin() * m)
    }

    /// Unit vector the player is looking along.
    ///
    /// Yaw 0 looks down -z; pitch +90 looks straight up.
    pub fn sight_vector(&self) -> Vector3<f32> {
        let (dy, m) = self.pitch.sin_cos();
        let heading = self.yaw - Deg(90.0);
        Vector3::new(heading.cos() * m, dy, heading.sin() * m)
    }

    /// Turns the player by a mouse movement of `(dx, dy)` scaled by `sensitivity`.
    pub fn rotate(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += Deg(dx * sensitivity);
        self.pitch = Deg((self.pitch.0 + dy * sensitivity).clamp(-MAX_PITCH, MAX_PITCH));
    }

    /// Selects inventory slot `index`, wrapping past the end.
    pub fn select_slot(&mut self, index: usize) {
        if !self.inventory.is_empty() {
            self.selected = index % self.inventory.len();
        }
    }

    /// The material placed by a build action.
    pub fn selected_material(&self) -> Option<Material> {
        self.inventory.get(self.selected).copied()
    }

    pub fn toggle_flying(&mut self) {
        self.flying = !self.flying;
    }
}
