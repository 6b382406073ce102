//! CPU-side renderer that keeps a mesh for every materialized block.
//!
//! Meshes live in a slot array. A released slot goes onto a free list and is
//! handed out again by the next `materialize`, so the array only grows to the
//! peak number of blocks shown at once.

use std::collections::VecDeque;

use log::{debug, warn};

use super::geometry::{VertexCache, BLOCK_HALF_SIZE};
use super::{RenderHandle, Renderer, Vertex};
use crate::core::MtResource;
use crate::engine_state::voxels::{coords::Cell, material::Material};

/// Vertices per block: 6 faces x 4 corners.
pub const VERTICES_PER_BLOCK: usize = 24;

/// The geometry of one shown block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMesh {
    pub cell: Cell,
    pub material: Material,
    pub vertices: [Vertex; VERTICES_PER_BLOCK],
}

impl BlockMesh {
    /// Builds the mesh from cube positions and the material's atlas tiles.
    pub fn new(cell: Cell, material: Material, positions: &[f32; 72]) -> Self {
        let tex_coords = material.texture_coords();
        let material_id = material.id() as u32;
        let vertices = std::array::from_fn(|i| {
            Vertex::new(
                [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
                [tex_coords[i * 2], tex_coords[i * 2 + 1]],
                material_id,
            )
        });
        BlockMesh {
            cell,
            material,
            vertices,
        }
    }
}

#[derive(Default)]
struct MeshBatch {
    slots: Vec<Option<BlockMesh>>,
    available_slots: VecDeque<usize>,
    live: usize,
}

impl MeshBatch {
    fn insert(&mut self, mesh: BlockMesh) -> usize {
        self.live += 1;
        match self.available_slots.pop_front() {
            Some(slot) => {
                self.slots[slot] = Some(mesh);
                slot
            }
            None => {
                self.slots.push(Some(mesh));
                self.slots.len() - 1
            }
        }
    }

    fn remove(&mut self, slot: usize) -> Option<BlockMesh> {
        let mesh = self.slots.get_mut(slot)?.take()?;
        self.live -= 1;
        self.available_slots.push_back(slot);
        Some(mesh)
    }
}

/// A [`Renderer`] that builds [`BlockMesh`]es into a shared batch.
///
/// Cloning is cheap and every clone shares the same batch and vertex cache,
/// which lets the engine hold one clone while tests or a draw loop inspect another.
#[derive(Clone, Default)]
pub struct MeshRenderer {
    batch: MtResource<MeshBatch>,
    vertex_cache: MtResource<VertexCache>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer whose vertex cache holds at most `capacity` cubes.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            batch: MtResource::default(),
            vertex_cache: MtResource::new(VertexCache::new(capacity)),
        }
    }

    /// Number of meshes currently live.
    pub fn len(&self) -> usize {
        self.batch.get().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live mesh exists for `cell`.
    pub fn contains(&self, cell: Cell) -> bool {
        self.batch
            .get()
            .slots
            .iter()
            .flatten()
            .any(|mesh| mesh.cell == cell)
    }

    /// Copies every live mesh.
    pub fn snapshot(&self) -> Vec<BlockMesh> {
        self.batch.get().slots.iter().flatten().cloned().collect()
    }

    /// The vertex data of every live mesh, packed for upload to a GPU buffer.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let batch = self.batch.get();
        let mut bytes = Vec::with_capacity(batch.live * VERTICES_PER_BLOCK * std::mem::size_of::<Vertex>());
        for mesh in batch.slots.iter().flatten() {
            bytes.extend_from_slice(bytemuck::cast_slice(&mesh.vertices));
        }
        bytes
    }

    /// `(hits, misses)` of the vertex cache.
    pub fn cache_stats(&self) -> (u64, u64) {
        self.vertex_cache.get().stats()
    }
}

impl Renderer for MeshRenderer {
    fn materialize(&self, cell: Cell, material: Material) -> RenderHandle {
        let positions = self
            .vertex_cache
            .get_mut()
            .cube_vertices(cell, BLOCK_HALF_SIZE);
        let mesh = BlockMesh::new(cell, material, &positions);
        let slot = self.batch.get_mut().insert(mesh);
        RenderHandle(slot as u64)
    }

    fn release(&self, handle: RenderHandle) {
        match self.batch.get_mut().remove(handle.0 as usize) {
            Some(mesh) => debug!("Released mesh for {:?}", mesh.cell),
            None => warn!("Release of unknown render handle {:?}", handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn test_released_slots_are_reused() {
        let renderer = MeshRenderer::new();
        let a = renderer.materialize(Point3::new(0, 0, 0), Material::Dirt);
        let b = renderer.materialize(Point3::new(1, 0, 0), Material::Sand);
        assert_ne!(a, b);
        assert_eq!(renderer.len(), 2);

        renderer.release(a);
        assert_eq!(renderer.len(), 1);
        assert!(!renderer.contains(Point3::new(0, 0, 0)));

        let c = renderer.materialize(Point3::new(2, 0, 0), Material::Brick);
        assert_eq!(c, a);
        assert_eq!(renderer.len(), 2);
    }

    #[test]
    fn test_rematerialize_hits_vertex_cache() {
        let renderer = MeshRenderer::with_cache_capacity(4);
        let cell = Point3::new(2, 0, 2);
        let handle = renderer.materialize(cell, Material::Dirt);
        renderer.release(handle);
        renderer.materialize(cell, Material::Sand);
        assert_eq!(renderer.cache_stats(), (1, 1));
    }

    #[test]
    fn test_double_release_is_ignored() {
        let renderer = MeshRenderer::new();
        let handle = renderer.materialize(Point3::new(0, 0, 0), Material::Stone);
        renderer.release(handle);
        renderer.release(handle);
        assert!(renderer.is_empty());
    }

    #[test]
    fn test_mesh_carries_material_texture() {
        let renderer = MeshRenderer::new();
        renderer.materialize(Point3::new(3, 1, -2), Material::Grass);
        let mesh = &renderer.snapshot()[0];
        let coords = Material::Grass.texture_coords();
        assert_eq!(mesh.vertices[0].tex_coords, [coords[0], coords[1]]);
        assert_eq!(mesh.vertices[0].material_id, Material::Grass.id() as u32);
        assert_eq!(mesh.vertices[0].position, [2.5, 1.5, -2.5]);
    }

    #[test]
    fn test_vertex_bytes_size() {
        let renderer = MeshRenderer::new();
        renderer.materialize(Point3::new(0, 0, 0), Material::Dirt);
        renderer.materialize(Point3::new(0, 1, 0), Material::Dirt);
        assert_eq!(
            renderer.vertex_bytes().len(),
            2 * VERTICES_PER_BLOCK * std::mem::size_of::<Vertex>()
        );
    }
}
