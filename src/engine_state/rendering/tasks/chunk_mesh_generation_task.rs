//! Task for generating mesh data for chunks in a background thread.
//!
//! The task carries immutable snapshots of the chunk and its neighbors, taken on
//! the main thread when the job was queued, together with the chunk's generation at
//! that moment. Applying the result re-checks both that the chunk still exists and
//! that it has not changed since.

use std::time::Duration;

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::{mesh_chunk, ChunkMesh, ChunkNeighbors},
    task_management::task::{Task, TaskOutcome, TaskResult},
    voxels::{
        chunk::{ChunkBlocks, MeshApplication},
        world::World,
    },
};

/// A task that meshes one chunk snapshot.
pub struct ChunkMeshGenerationTask {
    /// The chunk coordinate the mesh belongs to
    position: Point3<i32>,
    /// The chunk generation the snapshot was taken at
    generation: u64,
    /// The chunk's blocks
    blocks: ChunkBlocks,
    /// The six face-adjacent grids, where loaded
    neighbors: ChunkNeighbors,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `position` - Coordinate of the chunk to mesh
    /// * `generation` - Generation of the chunk when the snapshot was taken
    /// * `blocks` - Snapshot of the chunk's grid
    /// * `neighbors` - Snapshots of the neighboring grids
    pub fn new(
        position: Point3<i32>,
        generation: u64,
        blocks: ChunkBlocks,
        neighbors: ChunkNeighbors,
    ) -> Self {
        ChunkMeshGenerationTask {
            position,
            generation,
            blocks,
            neighbors,
        }
    }

    /// The chunk coordinate this task meshes.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// The generation the snapshot was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the mesher on the calling thread.
    pub fn run(self) -> ChunkMeshGenerationTaskResult {
        let start = Instant::now();
        let mesh = mesh_chunk(&self.blocks, &self.neighbors);
        ChunkMeshGenerationTaskResult {
            position: self.position,
            generation: self.generation,
            mesh,
            elapsed: start.elapsed(),
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(self: Box<Self>) -> Box<dyn TaskResult> {
        Box::new(self.run())
    }
}

/// The mesh produced for a chunk snapshot.
pub struct ChunkMeshGenerationTaskResult {
    position: Point3<i32>,
    generation: u64,
    mesh: ChunkMesh,
    elapsed: Duration,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Hands the mesh to its chunk if the chunk is still loaded.
    ///
    /// Results for evicted chunks and results built from outdated blocks are dropped.
    fn handle_result(self: Box<Self>, world: &mut World) -> TaskOutcome {
        let ChunkMeshGenerationTaskResult {
            position,
            generation,
            mesh,
            elapsed,
        } = *self;

        let Some(chunk) = world.chunk_mut(position) else {
            debug!("Dropping mesh for evicted chunk {:?}", position);
            return TaskOutcome::Discarded;
        };

        let vertices = mesh.vertex_count();
        match chunk.finish_meshing(generation, mesh) {
            MeshApplication::Applied => {
                debug!(
                    "Meshed chunk {:?}: {} vertices in {:?}",
                    position, vertices, elapsed
                );
                TaskOutcome::Applied
            }
            MeshApplication::Stale => {
                debug!(
                    "Dropping stale mesh for chunk {:?} (generation {})",
                    position, generation
                );
                TaskOutcome::Stale
            }
            MeshApplication::Ignored => {
                debug!(
                    "Dropping mesh from a previous incarnation of chunk {:?}",
                    position
                );
                TaskOutcome::Discarded
            }
        }
    }
}
