//! # Task Management System
//!
//! A small worker pool for work that must not stall the simulation tick,
//! such as building block geometry.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the workers, distributes tasks and collects outputs
//! - `Task`: a unit of work with a typed output
//! - `TaskChannel`: the pair of channels plus the thread behind one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager sends each task to the next free worker, round-robin
//! 3. If every worker is busy the task waits in a FIFO queue
//! 4. `process_completed_tasks()` drains finished outputs on the simulation
//!    thread and tops the workers up from the queue
//!
//! A manager built with zero workers runs every task inline inside
//! `publish_task()` and buffers the outputs until the next drain. The calling
//! sequence is the same either way, which keeps single-threaded runs and tests
//! deterministic.
//!
//! ## Example Usage
//! ```
//! use crafter::engine_state::task_management::{task::Task, TaskManager};
//!
//! struct Square(u32);
//!
//! impl Task for Square {
//!     type Output = u32;
//!     fn process(&self) -> u32 {
//!         self.0 * self.0
//!     }
//! }
//!
//! let mut manager = TaskManager::new(2);
//! for n in 1..=4 {
//!     manager.publish_task(Square(n));
//! }
//! let mut outputs = manager.wait_for_idle();
//! outputs.sort();
//! assert_eq!(outputs, vec![1, 4, 9, 16]);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use task::Task;

/// A communication channel between the simulation thread and one worker.
struct TaskChannel<T: Task> {
    task_sender: Sender<T>,
    result_receiver: Receiver<T::Output>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
    /// Outputs of tasks run inline when there are no workers.
    inline_outputs: Vec<T::Output>,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a worker never has a backlog; queued work stays in
/// `queued_tasks` where it can still be handed to whichever worker frees up first.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<T: Task> TaskManager<T> {
    /// Creates a manager with `num_workers` worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads. 0 runs tasks inline.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<T>();
            let (result_tx, result_rx) = channel::<T::Output>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    if result_tx.send(task.process()).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                worker,
            });
        }

        if num_workers > 0 {
            info!(
                "Started {} task workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            inline_outputs: Vec::new(),
        }
    }

    /// Number of worker threads. 0 means tasks run inline.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks published but not yet drained.
    pub fn pending(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
            + self.inline_outputs.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the worker accepted the task
    /// - `Err(task)` if the worker has gone away, handing the task back
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Finds the next channel below `MAX_TASKS_IN_FLIGHT`, round-robin from the
    /// last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker (or run inline)
    /// - `false` if it was queued because every worker is busy
    pub fn publish_task(&mut self, task: T) -> bool {
        if self.channels.is_empty() {
            self.inline_outputs.push(task.process());
            return true;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Task worker {} disconnected, queueing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker is gone; keep the task and stop.
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Drains every output that is ready, without blocking.
    ///
    /// Outputs from one worker come back in the order that worker ran them.
    /// Freed workers are topped up from the queue before returning.
    pub fn process_completed_tasks(&mut self) -> Vec<T::Output> {
        let mut outputs = std::mem::take(&mut self.inline_outputs);

        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(output) => {
                        channel.num_tasks_in_flight -= 1;
                        outputs.push(output);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.num_tasks_in_flight > 0 {
                            warn!(
                                "Task worker {} stopped with {} tasks in flight",
                                idx, channel.num_tasks_in_flight
                            );
                            channel.num_tasks_in_flight = 0;
                        }
                        break;
                    }
                }
            }
        }

        self.process_queued_tasks();
        outputs
    }

    /// Blocks until every published task has finished and returns all outputs.
    ///
    /// Tasks that cannot run because every worker has died are dropped with a
    /// warning.
    pub fn wait_for_idle(&mut self) -> Vec<T::Output> {
        let mut outputs = std::mem::take(&mut self.inline_outputs);

        loop {
            self.process_queued_tasks();

            let busy: Vec<usize> = (0..self.channels.len())
                .filter(|&idx| self.channels[idx].num_tasks_in_flight > 0)
                .collect();

            if busy.is_empty() {
                if !self.queued_tasks.is_empty() {
                    warn!(
                        "Dropping {} queued tasks: no live workers",
                        self.queued_tasks.len()
                    );
                    self.queued_tasks.clear();
                }
                return outputs;
            }

            for idx in busy {
                let channel = &mut self.channels[idx];
                match channel.result_receiver.recv() {
                    Ok(output) => {
                        channel.num_tasks_in_flight -= 1;
                        outputs.push(output);
                    }
                    Err(_) => {
                        warn!("Task worker {} stopped while waiting for results", idx);
                        channel.num_tasks_in_flight = 0;
                    }
                }
            }
        }
    }
}

impl<T: Task> Drop for TaskManager<T> {
    fn drop(&mut self) {
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                worker,
                ..
            } = channel;
            // Closing the sender ends the worker's receive loop.
            drop(task_sender);
            if worker.join().is_err() {
                warn!("Task worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Double(i64);

    impl Task for Double {
        type Output = i64;
        fn process(&self) -> i64 {
            self.0 * 2
        }
    }

    struct Counted(Arc<AtomicUsize>);

    impl Task for Counted {
        type Output = ();
        fn process(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_inline_runs_at_publish() {
        let mut manager = TaskManager::new(0);
        assert!(manager.publish_task(Double(4)));
        assert!(manager.publish_task(Double(-1)));
        assert_eq!(manager.pending(), 2);
        assert_eq!(manager.process_completed_tasks(), vec![8, -2]);
        assert_eq!(manager.pending(), 0);
    }

    #[test]
    fn test_overflow_is_queued() {
        let mut manager = TaskManager::new(1);
        assert!(manager.publish_task(Double(1)));
        // The single worker already holds one task.
        assert!(!manager.publish_task(Double(2)));
        assert!(!manager.publish_task(Double(3)));

        let mut outputs = manager.wait_for_idle();
        outputs.sort();
        assert_eq!(outputs, vec![2, 4, 6]);
        assert_eq!(manager.pending(), 0);
    }

    #[test]
    fn test_every_task_runs_once_across_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(3);
        for _ in 0..50 {
            manager.publish_task(Counted(counter.clone()));
        }
        assert_eq!(manager.wait_for_idle().len(), 50);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_drop_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut manager = TaskManager::new(2);
            manager.publish_task(Counted(counter.clone()));
            manager.publish_task(Counted(counter.clone()));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
