//! # Material Module
//!
//! The closed set of surface materials a block can carry, and the texture
//! atlas coordinates the renderer uses for each of them.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

/// The underlying integer type used to store a material compactly.
pub type MaterialSize = u8;

/// Number of tiles along each edge of the texture atlas.
pub const ATLAS_TILES: u32 = 4;

/// Enumerates every surface material a block can have.
///
/// The `FromPrimitive` derive allows conversion back from the compact
/// [`MaterialSize`] form stored in mesh batches.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    /// Grass on top, dirt underneath, grass-on-dirt on the sides.
    Grass,
    Dirt,
    Sand,
    Brick,
    /// Bedrock-like material; players cannot break it.
    Stone,
}

impl Material {
    /// Returns the material for a compact id, or `None` for unknown ids.
    pub fn from_id(id: MaterialSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(id)
    }

    /// The compact id of this material.
    pub fn id(self) -> MaterialSize {
        self as MaterialSize
    }

    /// Whether a player is allowed to break this block.
    pub fn is_breakable(self) -> bool {
        self != Material::Stone
    }

    /// Atlas tiles for the (top, bottom, side) faces.
    pub fn atlas_tiles(self) -> [(u32, u32); 3] {
        match self {
            Material::Grass => [(1, 0), (0, 1), (0, 0)],
            Material::Dirt => [(0, 1); 3],
            Material::Sand => [(1, 1); 3],
            Material::Brick => [(2, 0); 3],
            Material::Stone => [(2, 1); 3],
        }
    }

    /// Texture coordinates for all 24 cube vertices.
    ///
    /// Laid out as top, bottom, then the side tile repeated for the four side
    /// faces, matching the face order of
    /// [`cube_vertices`](crate::engine_state::rendering::geometry::cube_vertices).
    pub fn texture_coords(self) -> [f32; 48] {
        let [top, bottom, side] = self.atlas_tiles();
        let mut coords = [0.0; 48];
        coords[0..8].copy_from_slice(&tile_coords(top.0, top.1));
        coords[8..16].copy_from_slice(&tile_coords(bottom.0, bottom.1));
        let side = tile_coords(side.0, side.1);
        for chunk in coords[16..].chunks_exact_mut(8) {
            chunk.copy_from_slice(&side);
        }
        coords
    }
}

/// Returns the bounding vertices of atlas tile `(x, y)`, counter-clockwise
/// from the bottom-left corner.
pub fn tile_coords(x: u32, y: u32) -> [f32; 8] {
    let m = 1.0 / ATLAS_TILES as f32;
    let dx = x as f32 * m;
    let dy = y as f32 * m;
    [dx, dy, dx + m, dy, dx + m, dy + m, dx, dy + m]
}
