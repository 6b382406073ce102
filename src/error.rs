//! # Error Types
//!
//! Errors surfaced by the world model and by configuration loading.
//!
//! Every Block Store or shown-set mutation that fails is rejected before any
//! state is touched, so a caller receiving a [`WorldError`] can treat the
//! world as unchanged and carry on with the next tick.

use thiserror::Error;

use crate::engine_state::voxels::coords::Cell;

/// Result alias for fallible world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Failures raised by the Block Store and the Visibility Tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// `add_block` was called on a cell that already holds a block.
    #[error("a block already exists at {}", describe_cell(.0))]
    DuplicateBlock(Cell),

    /// The cell holds no block, or (for `hide_block`) is not currently shown.
    #[error("no block found at {}", describe_cell(.0))]
    BlockNotFound(Cell),

    /// `show_block` was called on a cell that is already shown or pending.
    #[error("block at {} is already shown", describe_cell(.0))]
    AlreadyShown(Cell),
}

fn describe_cell(cell: &Cell) -> String {
    format!("({}, {}, {})", cell.x, cell.y, cell.z)
}

/// Failures raised while loading or validating a [`crate::config::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Anything that can stop the engine from starting or running.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    World(#[from] WorldError),
}
