//! # Engine State Module
//!
//! The coordinator of the voxel streamer. It ties the [`World`], the mesh worker pool
//! and a [`RenderBackend`] together and runs them once per tick.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the workers and the backend
//! * `buffer_state` - The wgpu implementation of [`RenderBackend`]
//! * `config` - Runtime settings loaded from JSON
//! * `rendering` - Vertex format, greedy mesher, backend interface
//! * `task_management` - The mesh worker pool
//! * `voxels` - Blocks, chunks, columns, terrain, raycasting and the world
//!
//! ## Tick order
//!
//! 1. Stream columns around the viewpoint
//! 2. Apply finished mesh jobs
//! 3. Queue a job for every dirty chunk without one
//! 4. Hand queued jobs to the worker pool
//! 5. Upload freshly applied meshes
//!
//! Everything except the meshing itself happens on the calling thread, so the world
//! needs no locking.

use std::time::Duration;

use cgmath::Point3;
use log::{debug, info, warn};
use thiserror::Error;
use web_time::Instant;

use config::{ConfigError, WorldConfig};
use rendering::RenderBackend;
use task_management::{CompletedTasks, TaskManager};
use viewpoint::Viewpoint;
use voxels::{
    block::BlockType,
    world::{StreamingReport, UploadReport, World, WorldStats},
};

pub mod buffer_state;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod viewpoint;
pub mod voxels;

/// How long [`EngineState::settle`] blocks per tick for a mesh result.
const SETTLE_WAIT: Duration = Duration::from_millis(100);

/// Errors raised while starting the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot start mesh workers: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Work done by one [`EngineState::update`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub streaming: StreamingReport,
    pub completed: CompletedTasks,
    /// Mesh jobs created for dirty chunks
    pub queued_meshes: usize,
    /// Mesh jobs handed to workers
    pub dispatched: usize,
    pub uploads: UploadReport,
    pub elapsed: Duration,
}

/// The main state container of the streamer.
///
/// # Examples
///
/// ```no_run
/// use cgmath::{Point3, Vector3};
/// use voxel_streamer::{EngineState, HeadlessBackend, Viewpoint, WorldConfig};
///
/// let mut engine = EngineState::new(WorldConfig::default(), HeadlessBackend::new())?;
/// let viewpoint = Viewpoint::new(Point3::new(0.0, 80.0, 0.0), Vector3::new(0.0, -1.0, 1.0));
///
/// loop {
///     engine.update(viewpoint);
///     engine.render();
/// }
/// # Ok::<(), voxel_streamer::EngineError>(())
/// ```
pub struct EngineState<B: RenderBackend> {
    world: World,
    task_manager: TaskManager,
    backend: B,
    ticks: u64,
}

impl<B: RenderBackend> EngineState<B> {
    /// Creates a new engine and starts its mesh workers.
    ///
    /// # Errors
    /// Fails if `config` is out of range or a worker thread cannot be spawned.
    pub fn new(config: WorldConfig, backend: B) -> Result<Self, EngineError> {
        config.validate()?;
        let worker_count = config.resolved_worker_count();
        let task_manager = TaskManager::new(worker_count).map_err(EngineError::WorkerSpawn)?;
        Ok(Self::with_parts(World::new(config), task_manager, backend))
    }

    /// Creates an engine from an existing world and worker pool.
    pub fn with_parts(world: World, task_manager: TaskManager, backend: B) -> Self {
        EngineState {
            world,
            task_manager,
            backend,
            ticks: 0,
        }
    }

    /// Runs one tick without blocking.
    pub fn update(&mut self, viewpoint: Viewpoint) -> TickReport {
        self.tick(viewpoint, None)
    }

    fn tick(&mut self, viewpoint: Viewpoint, wait: Option<Duration>) -> TickReport {
        let start = Instant::now();

        let streaming = self.world.update_streaming(viewpoint, &mut self.backend);
        let completed = self
            .task_manager
            .process_completed_tasks(&mut self.world, wait);
        let queued_meshes = self.world.queue_dirty_chunks();
        let dispatched = self.dispatch_mesh_tasks();
        let uploads = self.world.upload_pending(&mut self.backend);

        self.ticks += 1;
        let report = TickReport {
            streaming,
            completed,
            queued_meshes,
            dispatched,
            uploads,
            elapsed: start.elapsed(),
        };
        if uploads.failed > 0 {
            warn!(
                "Tick {}: {} chunk uploads failed and will be retried",
                self.ticks, uploads.failed
            );
        }
        debug!("Tick {}: {:?}", self.ticks, report);
        report
    }

    /// Moves every waiting mesh job onto the worker pool's queue.
    fn dispatch_mesh_tasks(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(task) = self.world.pop_mesh_task() {
            let position = task.position();
            if self.task_manager.publish_task(Box::new(task)).is_err() {
                self.world.cancel_mesh_task(position);
                break;
            }
            dispatched += 1;
        }
        dispatched
    }

    /// Ticks at `viewpoint` until every column in range is generated, meshed and
    /// uploaded, blocking briefly on the workers between ticks.
    ///
    /// # Returns
    /// The number of ticks taken, or `None` if the world has not settled after
    /// `max_ticks`.
    pub fn settle(&mut self, viewpoint: Viewpoint, max_ticks: usize) -> Option<usize> {
        for tick in 1..=max_ticks {
            self.tick(viewpoint, Some(SETTLE_WAIT));
            if self.world.stats().is_settled() && self.task_manager.tasks_in_flight() == 0 {
                info!("World settled after {} ticks", tick);
                return Some(tick);
            }
        }
        None
    }

    /// Issues this frame's draws: all solid geometry, then all water.
    pub fn render(&mut self) {
        self.backend.begin_frame();
        self.world.render(&mut self.backend);
    }

    /// Removes the targeted block.
    pub fn break_block(&mut self) -> Option<Point3<i32>> {
        let removed = self.world.break_block();
        if let Some(position) = removed {
            debug!("Broke block at {:?}", position);
        }
        removed
    }

    /// Places `block_type` against the targeted face.
    pub fn place_block(&mut self, block_type: BlockType) -> Option<Point3<i32>> {
        let placed = self.world.place_block(block_type);
        if let Some(position) = placed {
            debug!("Placed {:?} at {:?}", block_type, position);
        }
        placed
    }

    /// Changes the streaming radius; applied on the next tick.
    pub fn set_render_radius(&mut self, radius: i32) {
        self.world.set_render_radius(radius);
    }

    pub fn stats(&self) -> WorldStats {
        self.world.stats()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Number of mesh workers.
    pub fn worker_count(&self) -> usize {
        self.task_manager.worker_count()
    }
}
