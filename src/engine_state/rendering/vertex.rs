//! Vertex format for block meshes.

use bytemuck::{Pod, Zeroable};

/// A single corner of a block face.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Material Id: u32 (4 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// The block's [`Material`](crate::engine_state::voxels::material::Material) id
    pub material_id: u32,
}

impl Vertex {
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], material_id: u32) -> Self {
        Vertex {
            position,
            tex_coords,
            material_id,
        }
    }
}
