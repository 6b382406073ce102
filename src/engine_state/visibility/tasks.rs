//! Render work handed to the task pool.

use std::sync::Arc;

use log::trace;

use crate::engine_state::{
    rendering::{RenderHandle, Renderer},
    task_management::task::Task,
    voxels::{coords::Cell, material::Material},
};

/// What a [`RenderTask`] asks the renderer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderJob {
    Materialize { cell: Cell, material: Material },
    Release { cell: Cell, handle: RenderHandle },
}

/// The outcome of a [`RenderTask`], drained on the simulation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCompletion {
    Materialized {
        cell: Cell,
        material: Material,
        handle: RenderHandle,
    },
    Released {
        cell: Cell,
    },
}

/// A single call into the renderer, run on a task worker.
pub struct RenderTask {
    renderer: Arc<dyn Renderer>,
    job: RenderJob,
}

impl RenderTask {
    pub fn new(renderer: Arc<dyn Renderer>, job: RenderJob) -> Self {
        Self { renderer, job }
    }
}

impl Task for RenderTask {
    type Output = RenderCompletion;

    fn process(&self) -> RenderCompletion {
        match self.job {
            RenderJob::Materialize { cell, material } => {
                trace!("Materializing {:?} at {:?}", material, cell);
                RenderCompletion::Materialized {
                    cell,
                    material,
                    handle: self.renderer.materialize(cell, material),
                }
            }
            RenderJob::Release { cell, handle } => {
                trace!("Releasing {:?} at {:?}", handle, cell);
                self.renderer.release(handle);
                RenderCompletion::Released { cell }
            }
        }
    }
}
