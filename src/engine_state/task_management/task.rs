//! # Task System Core Trait
//!
//! A `Task` is a self-contained unit of work that the `TaskManager` hands to a
//! worker thread. Its output is sent back over a channel and drained on the
//! simulation thread, which is the only place the output is acted on.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//!    (or inline on the caller's thread when the manager has no workers)
//! 3. The output is collected by `TaskManager::process_completed_tasks()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `Task::Output` must be `Send` to be transferred back
//! - Any state shared with other threads must carry its own synchronization

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own the data they need. Anything borrowed from the
/// simulation thread has to be cloned in, or shared through an `Arc`.
pub trait Task: Send + 'static {
    /// What the task hands back to the simulation thread.
    type Output: Send + 'static;

    /// Performs the work.
    ///
    /// Runs on a background thread; should not block on anything the
    /// simulation thread holds.
    fn process(&self) -> Self::Output;
}
