//! # Rendering Collaborator
//!
//! The engine core never draws anything itself. It asks a [`Renderer`] to
//! materialize geometry for a block and later to release it, and holds on to
//! the opaque [`RenderHandle`] in between.
//!
//! ## Components
//! - `Renderer`: the collaborator interface, callable from task workers
//! - `geometry`: cube vertex generation with a bounded LRU cache
//! - `MeshRenderer`: a CPU-side renderer that keeps one mesh per shown block

pub mod geometry;
mod mesh_renderer;
mod vertex;

use serde::{Deserialize, Serialize};

pub use mesh_renderer::{BlockMesh, MeshRenderer, VERTICES_PER_BLOCK};
pub use vertex::Vertex;

use crate::engine_state::voxels::{coords::Cell, material::Material};

/// Opaque token identifying geometry owned by a [`Renderer`].
///
/// The engine only stores and returns handles; their meaning belongs to the
/// renderer that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// Builds and destroys the visuals for individual blocks.
///
/// Both methods may be called from worker threads, concurrently for different
/// cells. For any one cell the engine never releases a handle before the
/// `materialize` call that produced it has returned.
pub trait Renderer: Send + Sync {
    /// Creates geometry for a block of `material` at `cell`.
    fn materialize(&self, cell: Cell, material: Material) -> RenderHandle;

    /// Destroys the geometry behind `handle`.
    fn release(&self, handle: RenderHandle);
}
