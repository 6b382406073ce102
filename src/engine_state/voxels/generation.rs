//! # World Generation
//!
//! Bootstraps a flat world through repeated `add_block` calls: a stone
//! bedrock layer, a dirt layer above it, and stone walls around the square
//! boundary so the player cannot walk off the edge.

use cgmath::Point3;
use log::info;

use super::block_store::BlockStore;
use super::material::Material;
use crate::config::WorldGenConfig;
use crate::error::WorldResult;

/// How far the boundary walls rise above `base_height`.
pub const WALL_HEIGHT: i32 = 2;

/// Fills `store` with the flat terrain described by `config`.
///
/// For every column `(x, z)` with `|x|, |z| <= half_width`:
/// - stone at `base_height - 3`
/// - dirt at `base_height - 2` (stone on boundary columns)
/// - on boundary columns, stone from `base_height - 1` up to `base_height + WALL_HEIGHT`
///
/// # Errors
/// Fails with [`crate::error::WorldError::DuplicateBlock`] if `store` already
/// holds a block inside the generated region.
pub fn generate_flat_world(store: &mut BlockStore, config: &WorldGenConfig) -> WorldResult<()> {
    let n = config.half_width;
    let y = config.base_height;
    let start = store.len();

    for x in -n..=n {
        for z in -n..=n {
            let boundary = x == -n || x == n || z == -n || z == n;

            store.add_block(Point3::new(x, y - 3, z), Material::Stone)?;

            if boundary {
                for dy in -2..=WALL_HEIGHT {
                    store.add_block(Point3::new(x, y + dy, z), Material::Stone)?;
                }
            } else {
                store.add_block(Point3::new(x, y - 2, z), Material::Dirt)?;
            }
        }
    }

    info!(
        "Generated flat world: half width {}, {} blocks in {} sectors",
        n,
        store.len() - start,
        store.sector_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> BlockStore {
        let mut store = BlockStore::new();
        let config = WorldGenConfig {
            half_width: 4,
            base_height: 0,
        };
        generate_flat_world(&mut store, &config).unwrap();
        store
    }

    #[test]
    fn test_layers() {
        let store = small_world();
        assert_eq!(store.get(Point3::new(0, -3, 0)), Some(Material::Stone));
        assert_eq!(store.get(Point3::new(0, -2, 0)), Some(Material::Dirt));
        assert_eq!(store.get(Point3::new(0, -1, 0)), None);
    }

    #[test]
    fn test_walls_on_boundary() {
        let store = small_world();
        for dy in -2..=WALL_HEIGHT {
            assert_eq!(store.get(Point3::new(4, dy, 0)), Some(Material::Stone));
            assert_eq!(store.get(Point3::new(1, dy, -4)), Some(Material::Stone));
        }
        assert_eq!(store.get(Point3::new(4, WALL_HEIGHT + 1, 0)), None);
    }

    #[test]
    fn test_block_count() {
        let store = small_world();
        // 9x9 columns, 32 of them on the boundary.
        let interior = 7 * 7;
        let boundary = 9 * 9 - interior;
        assert_eq!(store.len(), interior * 2 + boundary * 6);
    }

    #[test]
    fn test_generating_twice_fails() {
        let mut store = small_world();
        let config = WorldGenConfig {
            half_width: 1,
            base_height: 0,
        };
        assert!(generate_flat_world(&mut store, &config).is_err());
    }
}
