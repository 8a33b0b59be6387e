//! Rendering system for the voxel streamer.
//!
//! This module turns chunk data into GPU-ready geometry and defines the narrow
//! interface the world uses to talk to a graphics device. The world never touches
//! a device directly; everything goes through [`RenderBackend`], which keeps the
//! streamer testable without a GPU.
//!
//! # Architecture
//! - [`RenderBackend`]: allocate / upload / draw / release against opaque buffer handles
//! - [`PackedVertex`]: the 32-bit vertex format every mesh is made of
//! - `meshing/`: the greedy binary mesher
//! - `tasks/`: the background job that runs the mesher on a worker thread
//! - [`HeadlessBackend`]: in-memory backend for tests and GPU-less machines

use cgmath::Matrix4;
use thiserror::Error;

mod headless;
pub mod meshing;
pub mod tasks;
mod vertex;

pub use headless::HeadlessBackend;
pub use vertex::PackedVertex;

/// Opaque identifier of a vertex buffer owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

impl std::fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One non-indexed triangle-list draw of a range inside a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    /// Buffer holding the vertices
    pub buffer: BufferHandle,
    /// First vertex of the range
    pub first_vertex: u32,
    /// Number of vertices to draw
    pub vertex_count: u32,
    /// Transform from chunk-local to world space
    pub model: Matrix4<f32>,
}

/// Failures reported by a [`RenderBackend`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("cannot allocate {requested} bytes (limit {limit})")]
    AllocationFailed { requested: u64, limit: u64 },

    #[error("unknown buffer {0}")]
    UnknownBuffer(BufferHandle),

    #[error("write of {len} bytes at offset {offset} exceeds buffer of {capacity} bytes")]
    OutOfBounds { offset: u64, len: u64, capacity: u64 },

    #[error("mesh of {vertices} vertices does not fit a slot of {capacity}")]
    SlotOverflow { vertices: usize, capacity: usize },
}

/// The graphics device as seen by the world.
///
/// Implementations own the actual buffers; callers only ever hold
/// [`BufferHandle`]s. Buffers are used as non-indexed triangle-list vertex buffers
/// of [`PackedVertex`].
pub trait RenderBackend {
    /// Creates a vertex buffer of `size_bytes` bytes.
    fn allocate_buffer(&mut self, size_bytes: u64) -> Result<BufferHandle, BackendError>;

    /// Writes `bytes` into `handle` starting at `offset_bytes`.
    fn upload(
        &mut self,
        handle: BufferHandle,
        bytes: &[u8],
        offset_bytes: u64,
    ) -> Result<(), BackendError>;

    /// Issues a draw of a vertex range.
    fn draw(&mut self, call: DrawCall);

    /// Frees a buffer. Unknown handles are ignored.
    fn release(&mut self, handle: BufferHandle);

    /// Called once before the draws of a frame are issued.
    fn begin_frame(&mut self) {}
}
