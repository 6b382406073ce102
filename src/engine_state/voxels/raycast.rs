//! # Raycaster
//!
//! Discrete line-of-sight search over the block grid, used to pick the block
//! a player is looking at and the empty cell in front of it.

use cgmath::Vector3;

use super::block_store::BlockStore;
use super::coords::{normalize, Cell, Position};

/// Samples taken per unit of distance. Finer than one per cell so thin
/// obstacles are not stepped over on diagonals.
pub const RAY_SUBSTEPS: u32 = 8;

/// Default reach, in blocks.
pub const DEFAULT_MAX_DISTANCE: u32 = 8;

/// A successful hit-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// The first occupied cell along the ray.
    pub block: Cell,
    /// The last cell the ray visited before `block`.
    ///
    /// This is where a new block would be placed against the hit face. It is
    /// `None` only when the ray starts inside an occupied cell.
    pub previous: Option<Cell>,
}

/// Walks the ray from `position` along `vector` and returns the first block hit.
///
/// The ray is sampled `max_distance * 8` times (saturating at `u32::MAX`) in
/// steps of `vector / 8`. A
/// sample counts as a hit when it lands in a cell different from the previous
/// sample's cell and that cell is occupied. `vector` is expected to be unit
/// length (e.g. a sight vector); other lengths scale the reach accordingly.
///
/// Returns `None` if nothing is hit within reach. The walk is deterministic:
/// the same inputs and store contents always produce the same result.
pub fn hit_test(
    store: &BlockStore,
    position: Position,
    vector: Vector3<f32>,
    max_distance: u32,
) -> Option<RayHit> {
    let step = vector / RAY_SUBSTEPS as f32;
    let mut sample = position;
    let mut previous: Option<Cell> = None;

    for _ in 0..max_distance.saturating_mul(RAY_SUBSTEPS) {
        let key = normalize(sample);
        if previous != Some(key) && store.contains(key) {
            return Some(RayHit {
                block: key,
                previous,
            });
        }
        previous = Some(key);
        sample += step;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::material::Material;
    use cgmath::Point3;

    #[test]
    fn test_hit_straight_down() {
        let mut store = BlockStore::new();
        store.add_block(Point3::new(0, 10, 0), Material::Stone).unwrap();

        let hit = hit_test(
            &store,
            Point3::new(0.0, 12.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            DEFAULT_MAX_DISTANCE,
        );

        assert_eq!(
            hit,
            Some(RayHit {
                block: Point3::new(0, 10, 0),
                previous: Some(Point3::new(0, 11, 0)),
            })
        );
    }

    #[test]
    fn test_miss_beyond_reach() {
        let mut store = BlockStore::new();
        store.add_block(Point3::new(20, 0, 0), Material::Brick).unwrap();

        let hit = hit_test(
            &store,
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            DEFAULT_MAX_DISTANCE,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_start_inside_block_has_no_previous() {
        let mut store = BlockStore::new();
        store.add_block(Point3::new(0, 0, 0), Material::Dirt).unwrap();

        let hit = hit_test(
            &store,
            Point3::new(0.1, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            DEFAULT_MAX_DISTANCE,
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(0, 0, 0));
        assert_eq!(hit.previous, None);
    }

    #[test]
    fn test_hit_is_deterministic() {
        let mut store = BlockStore::new();
        store.add_block(Point3::new(3, 2, -4), Material::Sand).unwrap();
        let direction = Vector3::new(3.0, 2.0, -4.0) / (29.0_f32).sqrt();

        let first = hit_test(&store, Point3::new(0.0, 0.0, 0.0), direction, 8);
        let second = hit_test(&store, Point3::new(0.0, 0.0, 0.0), direction, 8);
        assert_eq!(first, second);
        assert_eq!(first.map(|h| h.block), Some(Point3::new(3, 2, -4)));
    }

    #[test]
    fn test_unbounded_reach_still_hits() {
        let mut store = BlockStore::new();
        store.add_block(Point3::new(20, 0, 0), Material::Brick).unwrap();

        let hit = hit_test(
            &store,
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            u32::MAX,
        );
        assert_eq!(hit.map(|h| h.block), Some(Point3::new(20, 0, 0)));
    }
}
