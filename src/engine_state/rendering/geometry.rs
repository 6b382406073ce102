//! Cube geometry for block rendering.
//!
//! Every shown block is drawn as a cube of 6 quads. The vertex positions only
//! depend on the cell and the half-size, so they are memoised in a bounded
//! LRU cache rather than rebuilt on every show.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::engine_state::voxels::coords::Cell;

/// Floats per cube: 6 faces x 4 vertices x 3 components.
pub const CUBE_VERTEX_FLOATS: usize = 72;

/// Half the edge length of a full block.
pub const BLOCK_HALF_SIZE: f32 = 0.5;

/// Default number of cubes kept by a [`VertexCache`].
pub const VERTEX_CACHE_CAPACITY: usize = 0x10000;

/// Returns the vertices of the cube of half-size `n` centred on `cell`.
///
/// Faces are laid out top, bottom, left, right, front, back, each as four
/// counter-clockwise corners seen from outside the cube.
#[rustfmt::skip]
pub fn cube_vertices(cell: Cell, n: f32) -> [f32; CUBE_VERTEX_FLOATS] {
    let (x, y, z) = (cell.x as f32, cell.y as f32, cell.z as f32);
    [
        // top
        x - n, y + n, z - n, x - n, y + n, z + n, x + n, y + n, z + n, x + n, y + n, z - n,
        // bottom
        x - n, y - n, z - n, x + n, y - n, z - n, x + n, y - n, z + n, x - n, y - n, z + n,
        // left
        x - n, y - n, z - n, x - n, y - n, z + n, x - n, y + n, z + n, x - n, y + n, z - n,
        // right
        x + n, y - n, z + n, x + n, y - n, z - n, x + n, y + n, z - n, x + n, y + n, z + n,
        // front
        x - n, y - n, z + n, x + n, y - n, z + n, x + n, y + n, z + n, x - n, y + n, z + n,
        // back
        x + n, y - n, z - n, x - n, y - n, z - n, x - n, y + n, z - n, x + n, y + n, z - n,
    ]
}

/// Bounded memo of [`cube_vertices`] keyed by `(cell, n)`.
///
/// Evicts the least recently used cube once full, so memory stays flat no
/// matter how much of the world the player visits.
pub struct VertexCache {
    cubes: LruCache<(Cell, u32), [f32; CUBE_VERTEX_FLOATS]>,
    hits: u64,
    misses: u64,
}

impl Default for VertexCache {
    fn default() -> Self {
        Self::new(VERTEX_CACHE_CAPACITY)
    }
}

impl VertexCache {
    /// Creates a cache holding at most `capacity` cubes (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            cubes: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cube vertices for `(cell, n)`, computing them on a miss.
    pub fn cube_vertices(&mut self, cell: Cell, n: f32) -> [f32; CUBE_VERTEX_FLOATS] {
        let key = (cell, n.to_bits());
        if let Some(vertices) = self.cubes.get(&key) {
            self.hits += 1;
            return *vertices;
        }
        self.misses += 1;
        let vertices = cube_vertices(cell, n);
        self.cubes.put(key, vertices);
        vertices
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cubes.cap().get()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn test_top_face_is_above_the_cell() {
        let vertices = cube_vertices(Point3::new(1, 2, 3), 0.5);
        for corner in vertices[0..12].chunks_exact(3) {
            assert_eq!(corner[1], 2.5);
        }
        for corner in vertices[12..24].chunks_exact(3) {
            assert_eq!(corner[1], 1.5);
        }
    }

    #[test]
    fn test_cache_hits_match_fresh_computation() {
        let mut cache = VertexCache::new(8);
        let cell = Point3::new(-4, 0, 9);
        let first = cache.cube_vertices(cell, BLOCK_HALF_SIZE);
        let second = cache.cube_vertices(cell, BLOCK_HALF_SIZE);
        assert_eq!(first, second);
        assert_eq!(first, cube_vertices(cell, BLOCK_HALF_SIZE));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut cache = VertexCache::new(4);
        for x in 0..10 {
            cache.cube_vertices(Point3::new(x, 0, 0), BLOCK_HALF_SIZE);
        }
        assert_eq!(cache.len(), 4);
        // The oldest entry was evicted, so this is a miss again.
        cache.cube_vertices(Point3::new(0, 0, 0), BLOCK_HALF_SIZE);
        assert_eq!(cache.stats(), (0, 11));
    }

    #[test]
    fn test_zero_capacity_still_caches_one() {
        assert_eq!(VertexCache::new(0).capacity(), 1);
    }
}
