//! # Block Store
//!
//! The authoritative mapping from occupied cell to surface material, plus a
//! sector index that buckets every stored cell by the sector containing it.
//!
//! ## Invariants
//! - A cell maps to at most one material.
//! - Every key of the primary map appears in exactly one sector bucket (the
//!   bucket for `sectorize(cell)`), and every bucketed cell is a key of the
//!   primary map.
//! - Empty buckets are dropped, so adding and then removing a block leaves the
//!   store equal to what it was before.
//!
//! Both maps are updated together inside `add_block` / `remove_block`; the
//! checks that can fail run before either map is touched, so a failed call
//! never leaves a half-updated store behind.

use std::collections::{HashMap, HashSet};

use super::coords::{sectorize_with, Cell, Face, Sector, SECTOR_SIZE};
use super::material::Material;
use crate::error::{WorldError, WorldResult};

/// Sparse storage for every block in the world.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use crafter::engine_state::voxels::{block_store::BlockStore, material::Material};
///
/// let mut store = BlockStore::new();
/// store.add_block(Point3::new(0, 0, 0), Material::Stone).unwrap();
/// assert!(store.exposed(Point3::new(0, 0, 0)));
/// assert!(store.add_block(Point3::new(0, 0, 0), Material::Sand).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStore {
    /// Cell -> material for every occupied cell.
    blocks: HashMap<Cell, Material>,
    /// Sector -> member cells. Kept in lock-step with `blocks`.
    sectors: HashMap<Sector, HashSet<Cell>>,
    sector_size: i32,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore {
    /// Creates an empty store using the default sector size.
    pub fn new() -> Self {
        Self::with_sector_size(SECTOR_SIZE)
    }

    /// Creates an empty store that buckets cells into sectors of `sector_size`.
    pub fn with_sector_size(sector_size: i32) -> Self {
        BlockStore {
            blocks: HashMap::new(),
            sectors: HashMap::new(),
            sector_size,
        }
    }

    /// The sector size this store buckets by.
    pub fn sector_size(&self) -> i32 {
        self.sector_size
    }

    /// Sector containing `cell` under this store's sector size.
    pub fn sector_of(&self, cell: Cell) -> Sector {
        sectorize_with(cell, self.sector_size)
    }

    /// Adds a block at `cell`.
    ///
    /// # Errors
    /// Returns [`WorldError::DuplicateBlock`] if the cell is already occupied;
    /// the store is left unchanged.
    pub fn add_block(&mut self, cell: Cell, material: Material) -> WorldResult<()> {
        if self.blocks.contains_key(&cell) {
            return Err(WorldError::DuplicateBlock(cell));
        }

        let sector = self.sector_of(cell);
        self.blocks.insert(cell, material);
        self.sectors.entry(sector).or_default().insert(cell);
        Ok(())
    }

    /// Removes the block at `cell`, returning the material it had.
    ///
    /// # Errors
    /// Returns [`WorldError::BlockNotFound`] if the cell is empty.
    pub fn remove_block(&mut self, cell: Cell) -> WorldResult<Material> {
        let material = self
            .blocks
            .remove(&cell)
            .ok_or(WorldError::BlockNotFound(cell))?;

        let sector = self.sector_of(cell);
        if let Some(bucket) = self.sectors.get_mut(&sector) {
            bucket.remove(&cell);
            if bucket.is_empty() {
                self.sectors.remove(&sector);
            }
        }
        Ok(material)
    }

    /// Material of the block at `cell`, if any.
    pub fn get(&self, cell: Cell) -> Option<Material> {
        self.blocks.get(&cell).copied()
    }

    /// Whether `cell` holds a block.
    pub fn contains(&self, cell: Cell) -> bool {
        self.blocks.contains_key(&cell)
    }

    /// Whether at least one of the six axis-adjacent neighbors of `cell` is empty.
    ///
    /// Only meaningful for occupied cells; callers should not ask about empty ones.
    /// Faces on the edge of the `i32` grid count as open.
    pub fn exposed(&self, cell: Cell) -> bool {
        Face::all().iter().any(|face| {
            face.neighbor(cell)
                .map_or(true, |neighbor| !self.blocks.contains_key(&neighbor))
        })
    }

    /// Iterates the cells bucketed under `sector`. Empty for unseen sectors.
    pub fn blocks_in_sector(&self, sector: Sector) -> impl Iterator<Item = Cell> + '_ {
        self.sectors.get(&sector).into_iter().flatten().copied()
    }

    /// Number of blocks stored under `sector`.
    pub fn sector_len(&self, sector: Sector) -> usize {
        self.sectors.get(&sector).map_or(0, HashSet::len)
    }

    /// Iterates every `(cell, material)` pair in the store.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Material)> + '_ {
        self.blocks.iter().map(|(cell, material)| (*cell, *material))
    }

    /// Total number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of non-empty sector buckets.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }
}
