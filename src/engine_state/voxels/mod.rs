//! # Voxel World Model
//!
//! The block grid and the pure queries over it.
//!
//! ## Components
//!
//! * **Coords**: the spatial index mapping positions to cells and sectors
//! * **Material**: the closed set of block surface materials and their atlas tiles
//! * **Block Store**: the authoritative cell to material map with its sector buckets
//! * **Raycast**: discrete hit-testing along a sight vector
//! * **Generation**: the flat-world bootstrap built from `add_block` calls
//!
//! ## Data Flow
//!
//! 1. Generation (or a session request) adds blocks to the store
//! 2. The store keeps its sector buckets in step with every add and remove
//! 3. The visibility tracker reads sector buckets and exposure from the store
//! 4. Kinematics and the raycaster read occupancy from the store
//!
//! Only the engine's simulation tick mutates the store; everything else is
//! handed a shared borrow.

pub mod block_store;
pub mod coords;
pub mod generation;
pub mod material;
pub mod raycast;
