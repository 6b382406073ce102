//! # Spatial Index
//!
//! Pure functions mapping world-space positions to the block cell and the
//! sector that contain them.
//!
//! ## Coordinate Spaces
//! - **Position**: continuous `Point3<f32>`, the player's location
//! - **Cell**: integer `Point3<i32>`, the identity key of a block
//! - **Sector**: integer `Point3<i32>` with `y == 0`; a 16 x inf x 16 column of cells
//!
//! None of these functions hold state, so they are safe to call from any
//! thread and always return the same answer for the same input.

use cgmath::{Point3, Vector3};

/// An integer block coordinate.
pub type Cell = Point3<i32>;

/// A sector coordinate. Sectors are flat columns, so `y` is always zero.
pub type Sector = Point3<i32>;

/// A continuous world-space position.
pub type Position = Point3<f32>;

/// Width and depth of a sector, in cells.
pub const SECTOR_SIZE: i32 = 16;

/// The six axis-aligned faces of a block, and the offset to the neighbor behind each.
///
/// The order is: [TOP, BOTTOM, LEFT, RIGHT, FRONT, BACK]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Face {
    /// The top face (facing positive Y)
    Top,
    /// The bottom face (facing negative Y)
    Bottom,
    /// The left face (facing negative X)
    Left,
    /// The right face (facing positive X)
    Right,
    /// The front face (facing positive Z)
    Front,
    /// The back face (facing negative Z)
    Back,
}

impl Face {
    /// Returns all six faces in a consistent order.
    pub fn all() -> [Face; 6] {
        [
            Face::Top,
            Face::Bottom,
            Face::Left,
            Face::Right,
            Face::Front,
            Face::Back,
        ]
    }

    /// Unit offset from a cell to the neighbor across this face.
    pub fn offset(&self) -> Vector3<i32> {
        match self {
            Face::Top => Vector3::new(0, 1, 0),
            Face::Bottom => Vector3::new(0, -1, 0),
            Face::Left => Vector3::new(-1, 0, 0),
            Face::Right => Vector3::new(1, 0, 0),
            Face::Front => Vector3::new(0, 0, 1),
            Face::Back => Vector3::new(0, 0, -1),
        }
    }

    /// The cell across this face from `cell`, or `None` past the edge of the
    /// `i32` grid.
    pub fn neighbor(&self, cell: Cell) -> Option<Cell> {
        let offset = self.offset();
        Some(Point3::new(
            cell.x.checked_add(offset.x)?,
            cell.y.checked_add(offset.y)?,
            cell.z.checked_add(offset.z)?,
        ))
    }
}

/// Iterates the axis-adjacent neighbors of `cell`.
///
/// Yields six cells except on the edge of the `i32` grid, where neighbors
/// that do not exist are skipped.
pub fn neighbors(cell: Cell) -> impl Iterator<Item = Cell> {
    Face::all().into_iter().filter_map(move |face| face.neighbor(cell))
}

/// Anything that can be resolved to the cell containing it.
///
/// Implemented for continuous positions (rounded) and for cells (identity),
/// so [`sectorize`] accepts either.
pub trait ToCell {
    fn to_cell(&self) -> Cell;
}

impl ToCell for Position {
    fn to_cell(&self) -> Cell {
        normalize(*self)
    }
}

impl ToCell for Cell {
    fn to_cell(&self) -> Cell {
        *self
    }
}

/// Returns the cell containing `position`.
///
/// Each component is rounded to the nearest integer, with halves rounded away
/// from zero, so `0.5 -> 1` and `-0.5 -> -1`. Cells are centred on integer
/// coordinates: cell `(0, 0, 0)` spans `[-0.5, 0.5)` on every axis.
pub fn normalize(position: Position) -> Cell {
    Point3::new(
        position.x.round() as i32,
        position.y.round() as i32,
        position.z.round() as i32,
    )
}

/// Returns the sector containing `pos` with the default [`SECTOR_SIZE`].
pub fn sectorize<P: ToCell>(pos: P) -> Sector {
    sectorize_with(pos, SECTOR_SIZE)
}

/// Returns the sector containing `pos` for a given sector size.
///
/// Uses floor division so that negative coordinates fall into negative
/// sectors: with a size of 16, `x = -1` lands in sector `-1`, not `0`.
///
/// # Panics
/// Panics if `sector_size` is not positive. Configured sizes are validated
/// when the config is loaded.
pub fn sectorize_with<P: ToCell>(pos: P, sector_size: i32) -> Sector {
    let cell = pos.to_cell();
    Point3::new(
        cell.x.div_euclid(sector_size),
        0,
        cell.z.div_euclid(sector_size),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rounds_to_nearest() {
        assert_eq!(normalize(Point3::new(0.2, 0.7, -0.2)), Point3::new(0, 1, 0));
        assert_eq!(normalize(Point3::new(-1.6, 2.49, 10.0)), Point3::new(-2, 2, 10));
    }

    #[test]
    fn test_normalize_ties_round_away_from_zero() {
        assert_eq!(normalize(Point3::new(0.5, -0.5, 1.5)), Point3::new(1, -1, 2));
        // Repeated calls agree, which matters when the result is used as a key.
        let p = Point3::new(2.5, -3.5, 0.5);
        assert_eq!(normalize(p), normalize(p));
    }

    #[test]
    fn test_sectorize_same_column() {
        assert_eq!(sectorize(Point3::new(0, 0, 0)), Point3::new(0, 0, 0));
        assert_eq!(sectorize(Point3::new(15, 5, 15)), Point3::new(0, 0, 0));
        assert_eq!(sectorize(Point3::new(16, 0, 0)), Point3::new(1, 0, 0));
    }

    #[test]
    fn test_sectorize_negative_uses_floor() {
        assert_eq!(sectorize(Point3::new(-1, 0, 0)), Point3::new(-1, 0, 0));
        assert_eq!(sectorize(Point3::new(-16, 0, -17)), Point3::new(-1, 0, -2));
    }

    #[test]
    fn test_sectorize_ignores_height() {
        assert_eq!(sectorize(Point3::new(3, -400, 3)), sectorize(Point3::new(3, 9000, 3)));
    }

    #[test]
    fn test_sectorize_position_normalizes_first() {
        // 15.6 rounds to 16, which is the next sector over.
        assert_eq!(sectorize(Point3::new(15.6_f32, 0.0, 0.0)), Point3::new(1, 0, 0));
        assert_eq!(sectorize(Point3::new(15.4_f32, 0.0, 0.0)), Point3::new(0, 0, 0));
        assert_eq!(sectorize(Point3::new(-0.6_f32, 0.0, 0.0)), Point3::new(-1, 0, 0));
    }

    #[test]
    fn test_sectorize_with_custom_size() {
        assert_eq!(sectorize_with(Point3::new(7, 0, -1), 4), Point3::new(1, 0, -1));
    }

    #[test]
    fn test_neighbors_are_axis_adjacent() {
        let cell = Point3::new(1, 2, 3);
        let all: Vec<Cell> = neighbors(cell).collect();
        assert_eq!(all.len(), 6);
        for n in all {
            let d = n - cell;
            assert_eq!(d.x.abs() + d.y.abs() + d.z.abs(), 1);
        }
    }

    #[test]
    fn test_neighbors_stop_at_grid_edge() {
        let corner = Point3::new(i32::MAX, 0, i32::MIN);
        assert_eq!(Face::Right.neighbor(corner), None);
        assert_eq!(Face::Back.neighbor(corner), None);
        assert_eq!(
            Face::Left.neighbor(corner),
            Some(Point3::new(i32::MAX - 1, 0, i32::MIN))
        );
        assert_eq!(neighbors(corner).count(), 4);
    }
}
