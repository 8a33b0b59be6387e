//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: meshes a chunk snapshot on a worker thread

pub mod chunk_mesh_generation_task;

pub use chunk_mesh_generation_task::ChunkMeshGenerationTask;
