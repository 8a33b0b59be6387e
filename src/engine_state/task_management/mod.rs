//! # Task Management System
//!
//! This module provides a fixed-size pool of worker threads that execute
//! [`Task`]s off the main thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the workers, queues tasks and collects results
//! - `Task` / `TaskResult`: see [`task`]
//!
//! All workers pull from one shared task queue. A worker that finishes a task goes
//! straight back to the queue for the next one and only sleeps once the queue is
//! empty, so published tasks keep draining between calls into the manager. Results
//! from all workers arrive on one shared channel and are applied on the main thread
//! in `process_completed_tasks()`.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(workers)?;
//!
//! // In the main loop:
//! task_manager.process_completed_tasks(&mut world, None);
//! while let Some(task) = next_task() {
//!     if let Err(task) = task_manager.publish_task(task) {
//!         requeue(task);
//!         break;
//!     }
//! }
//! ```

pub mod task;

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{info, warn};
use task::{Task, TaskOutcome, TaskResult};

use super::voxels::world::World;

/// Minimum size of the default worker pool.
pub const MIN_DEFAULT_WORKERS: usize = 6;

/// The default pool size: one worker per spare core, but never fewer than
/// [`MIN_DEFAULT_WORKERS`].
pub fn default_worker_count() -> usize {
    let parallelism = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    MIN_DEFAULT_WORKERS.max(parallelism.saturating_sub(1))
}

/// Counts of the results applied by one call to
/// [`TaskManager::process_completed_tasks`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletedTasks {
    pub applied: usize,
    pub stale: usize,
    pub discarded: usize,
}

impl CompletedTasks {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Applied => self.applied += 1,
            TaskOutcome::Stale => self.stale += 1,
            TaskOutcome::Discarded => self.discarded += 1,
        }
    }

    /// Total number of results handled.
    pub fn total(&self) -> usize {
        self.applied + self.stale + self.discarded
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Dropping the manager throws away queued tasks, lets running ones finish and joins
/// the threads.
pub struct TaskManager {
    task_sender: Option<Sender<Box<dyn Task>>>,
    task_receiver: Receiver<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult>>,
    workers: Vec<JoinHandle<()>>,
    tasks_in_flight: usize,
}

impl TaskManager {
    /// Creates a new `TaskManager` with `num_workers` worker threads.
    ///
    /// # Errors
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(num_workers: usize) -> std::io::Result<Self> {
        info!(
            "Starting {} mesh workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        let (task_tx, task_rx) = unbounded::<Box<dyn Task>>();
        let (result_tx, result_rx) = unbounded::<Box<dyn TaskResult>>();
        let mut workers = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();

            let worker = thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = task_rx.recv() {
                        if result_tx.send(task.process()).is_err() {
                            break;
                        }
                    }
                })?;
            workers.push(worker);
        }

        Ok(TaskManager {
            task_sender: Some(task_tx),
            task_receiver: task_rx,
            result_receiver: result_rx,
            workers,
            tasks_in_flight: 0,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of published tasks whose results have not been applied yet, queued
    /// or running.
    pub fn tasks_in_flight(&self) -> usize {
        self.tasks_in_flight
    }

    /// Queues a task for the next free worker.
    ///
    /// # Returns
    /// - `Ok(())` if the task was queued
    /// - `Err(task)` if the pool has shut down; the caller keeps the task
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> Result<(), Box<dyn Task>> {
        let Some(sender) = &self.task_sender else {
            return Err(task);
        };
        match sender.send(task) {
            Ok(()) => {
                self.tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => {
                warn!("Mesh workers are gone; task returned to caller");
                Err(err.into_inner())
            }
        }
    }

    /// Applies every completed task result to the world.
    ///
    /// # Arguments
    /// * `world` - The world results are applied to
    /// * `wait` - When set and nothing has completed yet, block up to this long for
    ///   the first result
    pub fn process_completed_tasks(
        &mut self,
        world: &mut World,
        wait: Option<Duration>,
    ) -> CompletedTasks {
        let mut completed = CompletedTasks::default();

        if let Some(timeout) = wait {
            if self.tasks_in_flight > 0 {
                match self.result_receiver.recv_timeout(timeout) {
                    Ok(result) => {
                        self.tasks_in_flight -= 1;
                        completed.record(result.handle_result(world));
                    }
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
                }
            }
        }

        while let Ok(result) = self.result_receiver.try_recv() {
            self.tasks_in_flight = self.tasks_in_flight.saturating_sub(1);
            completed.record(result.handle_result(world));
        }

        completed
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.task_sender = None;
        let abandoned = self.task_receiver.try_iter().count();
        if abandoned > 0 {
            info!("Dropped {} queued mesh tasks on shutdown", abandoned);
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("A mesh worker panicked");
            }
        }
    }
}
