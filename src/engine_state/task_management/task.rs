//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which executes work on background threads and applies the results on the
//! main thread.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and handed to `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with the world
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Tasks own everything they read; they never borrow world state

use crate::engine_state::voxels::world::World;

/// A unit of work executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need, typically
/// immutable snapshots taken on the main thread.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a background thread and must not block on main-thread state.
    fn process(self: Box<Self>) -> Box<dyn TaskResult>;
}

/// What the main thread did with a finished task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The result was applied to the world.
    Applied,
    /// The world changed after the task was created; the result was dropped.
    Stale,
    /// The target of the task no longer exists; the result was dropped.
    Discarded,
}

/// The result of processing a `Task`.
///
/// Results are applied on the main thread and should be cheap to apply.
pub trait TaskResult: Send {
    /// Applies the result to the world.
    fn handle_result(self: Box<Self>, world: &mut World) -> TaskOutcome;
}
