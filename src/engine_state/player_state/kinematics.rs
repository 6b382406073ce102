//! # Kinematics
//!
//! Moves a [`PlayerState`] through the block grid: scales its motion vector
//! by speed, integrates gravity while walking, and resolves the proposed
//! position against occupied cells.
//!
//! Collision is per-axis penetration resolution, not rigid-body physics.
//! Each axis is resolved in a fixed order (x, then y, then z) so that corner
//! cases come out the same on every run.

use cgmath::Point3;

use super::PlayerState;
use crate::config::PhysicsConfig;
use crate::engine_state::voxels::{
    block_store::BlockStore,
    coords::{normalize, Position},
};

/// Applies [`PhysicsConfig`] to a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    physics: PhysicsConfig,
}

impl Kinematics {
    pub fn new(physics: PhysicsConfig) -> Self {
        Self { physics }
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Starts a jump if the player is not already rising or falling.
    ///
    /// # Returns
    /// `true` if the jump started.
    pub fn jump(&self, player: &mut PlayerState) -> bool {
        if player.dy == 0.0 {
            player.dy = self.physics.jump_speed();
            true
        } else {
            false
        }
    }

    /// Advances `player` by `dt` seconds.
    ///
    /// Walking players fall under gravity, capped at terminal velocity.
    /// Flying players only move along their motion vector. The result is
    /// always passed through [`Kinematics::collide`].
    pub fn tick(&self, player: &mut PlayerState, store: &BlockStore, dt: f32) {
        let speed = if player.flying {
            self.physics.flying_speed
        } else {
            self.physics.walking_speed
        };
        let mut displacement = player.motion_vector() * (dt * speed);

        if !player.flying {
            player.dy -= dt * self.physics.gravity;
            player.dy = player.dy.max(-self.physics.terminal_velocity);
            displacement.y += player.dy * dt;
        }

        let candidate = player.position + displacement;
        player.position = self.collide(player, store, candidate, self.physics.player_height);
    }

    /// Pushes `candidate` out of any occupied cell it overlaps by more than
    /// the collision pad, and returns the corrected position.
    ///
    /// The player occupies `height` cells stacked downward from the cell of
    /// `candidate`. Hitting a floor or ceiling zeroes `player.dy`.
    pub fn collide(
        &self,
        player: &mut PlayerState,
        store: &BlockStore,
        candidate: Position,
        height: i32,
    ) -> Position {
        let pad = self.physics.collision_pad;
        let mut p = [candidate.x, candidate.y, candidate.z];
        let np = normalize(candidate);
        let np = [np.x, np.y, np.z];

        for axis in 0..3 {
            for direction in [-1, 1] {
                let overlap = (p[axis] - np[axis] as f32) * direction as f32;
                if overlap < pad {
                    continue;
                }
                for dy in 0..height {
                    let mut op = np;
                    op[1] -= dy;
                    op[axis] += direction;
                    if !store.contains(Point3::new(op[0], op[1], op[2])) {
                        continue;
                    }
                    p[axis] -= (overlap - pad) * direction as f32;
                    if axis == 1 {
                        player.dy = 0.0;
                    }
                    break;
                }
            }
        }

        Point3::new(p[0], p[1], p[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::material::Material;

    fn floor(y: i32) -> BlockStore {
        let mut store = BlockStore::new();
        for x in -2..=2 {
            for z in -2..=2 {
                store.add_block(Point3::new(x, y, z), Material::Stone).unwrap();
            }
        }
        store
    }

    #[test]
    fn test_falling_player_lands_on_floor() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let store = floor(-1);
        let mut player = PlayerState::new(Point3::new(0.0, 0.8, 0.0));
        player.dy = -5.0;

        kinematics.tick(&mut player, &store, 1.0 / 60.0);

        assert_eq!(player.dy, 0.0);
        assert!((player.position.y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_player_settles_and_stays() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let store = floor(-1);
        let mut player = PlayerState::new(Point3::new(0.0, 3.0, 0.0));

        for _ in 0..240 {
            kinematics.tick(&mut player, &store, 1.0 / 60.0);
        }

        assert!(player.position.y >= 0.7 && player.position.y <= 0.76);
        assert!(player.position.y > -0.5);
    }

    #[test]
    fn test_collide_without_blocks_is_identity() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let store = BlockStore::new();
        let mut player = PlayerState::default();
        let candidate = Point3::new(0.4, -0.45, 12.3);
        assert_eq!(kinematics.collide(&mut player, &store, candidate, 2), candidate);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let mut store = BlockStore::new();
        store.add_block(Point3::new(1, 0, 0), Material::Brick).unwrap();
        store.add_block(Point3::new(1, 1, 0), Material::Brick).unwrap();
        let mut player = PlayerState::new(Point3::new(0.0, 1.0, 0.0));
        player.dy = -1.0;

        let resolved = kinematics.collide(&mut player, &store, Point3::new(0.4, 1.0, 0.0), 2);

        assert!((resolved.x - 0.25).abs() < 1e-6);
        // A side hit leaves vertical speed alone.
        assert_eq!(player.dy, -1.0);
    }

    #[test]
    fn test_jump_only_from_rest() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let mut player = PlayerState::default();
        assert!(kinematics.jump(&mut player));
        assert!((player.dy - 40.0_f32.sqrt()).abs() < 1e-5);
        assert!(!kinematics.jump(&mut player));
    }

    #[test]
    fn test_fall_speed_capped() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let store = BlockStore::new();
        let mut player = PlayerState::default();
        for _ in 0..600 {
            kinematics.tick(&mut player, &store, 1.0 / 60.0);
        }
        assert_eq!(player.dy, -50.0);
    }

    #[test]
    fn test_flying_ignores_gravity() {
        let kinematics = Kinematics::new(PhysicsConfig::default());
        let store = BlockStore::new();
        let mut player = PlayerState::new(Point3::new(0.0, 10.0, 0.0));
        player.flying = true;
        kinematics.tick(&mut player, &store, 0.5);
        assert_eq!(player.dy, 0.0);
        assert_eq!(player.position, Point3::new(0.0, 10.0, 0.0));
    }
}
