//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data, along with the per-chunk meshing lifecycle.
//!
//! ## Storage
//!
//! Blocks live in a dense array of block tags indexed by `x * 256 + y * 16 + z`.
//! The array sits behind an `Arc`, so taking a snapshot for a mesh worker is a
//! reference-count bump. Mutating a block while a worker still holds a snapshot
//! copies the array first, so workers never observe main-thread edits.
//!
//! ## Lifecycle
//!
//! A chunk moves `dirty -> meshing -> clean`. Every change to its blocks stamps it with
//! a fresh generation number; a mesh job remembers the stamp it was built from, and a
//! result whose stamp no longer matches is stale.

use std::sync::Arc;

use cgmath::{Matrix4, Point3, Vector3};

use crate::engine_state::rendering::meshing::{ChunkMesh, MeshKind};

use super::block::BlockType;

mod chunk_creation;
pub mod chunk_iteration;

use chunk_iteration::ChunkBlockIterator;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Returns `true` when the chunk-local coordinate lies inside the chunk.
#[inline]
pub fn in_chunk_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_DIMENSION).contains(&x)
        && (0..CHUNK_DIMENSION).contains(&y)
        && (0..CHUNK_DIMENSION).contains(&z)
}

/// Flattens a chunk-local coordinate into an index into the block array.
#[inline]
pub fn block_index(x: i32, y: i32, z: i32) -> usize {
    (x * CHUNK_PLANE_SIZE + y * CHUNK_DIMENSION + z) as usize
}

/// The dense block grid of one chunk.
///
/// Cloning is cheap and yields an immutable snapshot; see the module docs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkBlocks {
    blocks: Arc<[BlockType; CHUNK_SIZE as usize]>,
}

impl ChunkBlocks {
    /// A grid filled entirely with air.
    pub fn empty() -> Self {
        Self::filled(BlockType::AIR)
    }

    /// A grid filled entirely with one block type.
    pub fn filled(block_type: BlockType) -> Self {
        ChunkBlocks {
            blocks: Arc::new([block_type; CHUNK_SIZE as usize]),
        }
    }

    /// Gets the block at the chunk-local coordinate.
    ///
    /// Out-of-bounds coordinates return `AIR`; this lookup never fails.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        if in_chunk_bounds(x, y, z) {
            self.blocks[block_index(x, y, z)]
        } else {
            BlockType::AIR
        }
    }

    /// Sets the block at the chunk-local coordinate.
    ///
    /// # Returns
    /// `true` if the stored block actually changed.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !in_chunk_bounds(x, y, z) {
            return false;
        }
        let index = block_index(x, y, z);
        if self.blocks[index] == block_type {
            return false;
        }
        Arc::make_mut(&mut self.blocks)[index] = block_type;
        true
    }

    /// Raw view of the block tags in `x * 256 + y * 16 + z` order.
    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks[..]
    }

    /// Iterates over every non-air block together with its local position.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Returns `true` if the grid contains nothing but air.
    pub fn is_empty(&self) -> bool {
        self.solid_blocks().next().is_none()
    }
}

impl Default for ChunkBlocks {
    fn default() -> Self {
        Self::empty()
    }
}

/// Vertex range a chunk occupies inside one of its column's buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawRange {
    /// First vertex of the chunk's slot.
    pub first_vertex: u32,
    /// Number of vertices currently uploaded to the slot.
    pub vertex_count: u32,
}

/// What happened to a mesh result handed back to its chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshApplication {
    /// The result matched the chunk's latest blocks and is waiting for upload.
    Applied,
    /// The chunk changed after the job was dispatched; the result was dropped.
    Stale,
    /// The result does not belong to the job currently in flight for this chunk.
    Ignored,
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// A chunk knows its own coordinate but holds no reference to its column or the
/// world; neighbors are always looked up by coordinate.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    blocks: ChunkBlocks,
    model: Matrix4<f32>,
    dirty: bool,
    generation: u64,
    in_flight: Option<u64>,
    pending_upload: Option<ChunkMesh>,
    draw_ranges: [DrawRange; 2],
}

impl Chunk {
    /// Creates a chunk from an existing block grid.
    ///
    /// The chunk starts dirty, stamped with `generation`.
    pub fn with_blocks(position: Point3<i32>, blocks: ChunkBlocks, generation: u64) -> Self {
        let model = Matrix4::from_translation(Vector3::new(
            (position.x * CHUNK_DIMENSION) as f32,
            (position.y * CHUNK_DIMENSION) as f32,
            (position.z * CHUNK_DIMENSION) as f32,
        ));
        Chunk {
            position,
            blocks,
            model,
            dirty: true,
            generation,
            in_flight: None,
            pending_upload: None,
            draw_ranges: [DrawRange::default(); 2],
        }
    }

    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(position: Point3<i32>, generation: u64) -> Self {
        Self::with_blocks(position, ChunkBlocks::empty(), generation)
    }

    /// Creates a new chunk completely filled with one block type.
    pub fn solid(position: Point3<i32>, block_type: BlockType, generation: u64) -> Self {
        Self::with_blocks(position, ChunkBlocks::filled(block_type), generation)
    }

    /// The model transform placing this chunk's local vertices in the world.
    pub fn model(&self) -> Matrix4<f32> {
        self.model
    }

    /// Read access to the block grid.
    pub fn blocks(&self) -> &ChunkBlocks {
        &self.blocks
    }

    /// An immutable copy of the block grid for a mesh worker.
    pub fn snapshot(&self) -> ChunkBlocks {
        self.blocks.clone()
    }

    /// Gets the block at the chunk-local coordinate, `AIR` when out of bounds.
    #[inline]
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.blocks.get(x, y, z)
    }

    /// Sets the block at the chunk-local coordinate.
    ///
    /// When the block actually changes the chunk is marked dirty with `generation`.
    pub fn set_block_at(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        block_type: BlockType,
        generation: u64,
    ) -> bool {
        let changed = self.blocks.set(x, y, z, block_type);
        if changed {
            self.mark_dirty(generation);
        }
        changed
    }

    /// Marks the chunk's geometry as stale.
    pub fn mark_dirty(&mut self, generation: u64) {
        self.dirty = true;
        self.generation = generation;
    }

    /// `true` while the chunk's blocks changed since its last applied mesh.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `true` while a mesh job for this chunk is outstanding.
    pub fn is_meshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// `true` when a mesh result is waiting to be uploaded.
    pub fn needs_upload(&self) -> bool {
        self.pending_upload.is_some()
    }

    /// The stamp of the chunk's latest change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the chunk should get a mesh job this tick.
    pub fn wants_mesh(&self) -> bool {
        self.dirty && self.in_flight.is_none()
    }

    /// Records that a mesh job built from the current blocks has been queued.
    ///
    /// # Returns
    /// The generation the job must carry back.
    pub fn begin_meshing(&mut self) -> u64 {
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Hands a finished mesh back to the chunk.
    ///
    /// Only the result of the job currently in flight is considered. If the chunk has
    /// been edited since that job was dispatched the result is dropped and the chunk
    /// stays dirty so the next dirty scan re-meshes it.
    pub fn finish_meshing(&mut self, generation: u64, mesh: ChunkMesh) -> MeshApplication {
        if self.in_flight != Some(generation) {
            return MeshApplication::Ignored;
        }
        self.in_flight = None;

        if generation != self.generation {
            return MeshApplication::Stale;
        }

        self.dirty = false;
        self.pending_upload = Some(mesh);
        MeshApplication::Applied
    }

    /// Drops an outstanding job without a result, e.g. when it was never dispatched.
    pub fn cancel_meshing(&mut self) {
        self.in_flight = None;
    }

    /// Takes the mesh waiting for upload, clearing the `needs-upload` flag.
    pub fn take_pending_upload(&mut self) -> Option<ChunkMesh> {
        self.pending_upload.take()
    }

    /// The vertex range this chunk occupies in the column buffer of `kind`.
    pub fn draw_range(&self, kind: MeshKind) -> DrawRange {
        self.draw_ranges[kind as usize]
    }

    /// Records where this chunk's geometry now lives in its column buffers.
    pub fn set_draw_range(&mut self, kind: MeshKind, range: DrawRange) {
        self.draw_ranges[kind as usize] = range;
    }

    /// Forgets all uploaded geometry.
    pub fn clear_draw_ranges(&mut self) {
        self.draw_ranges = [DrawRange::default(); 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_one_vertex() -> ChunkMesh {
        let mut mesh = ChunkMesh::new();
        mesh.solid.push(crate::engine_state::rendering::PackedVertex::pack(0, 0, 0, 0, 1));
        mesh
    }

    #[test]
    fn index_layout_is_x_major() {
        assert_eq!(block_index(0, 0, 1), 1);
        assert_eq!(block_index(0, 1, 0), 16);
        assert_eq!(block_index(1, 0, 0), 256);
        assert_eq!(block_index(15, 15, 15), 4095);
    }

    #[test]
    fn out_of_bounds_reads_are_air() {
        let blocks = ChunkBlocks::filled(BlockType::STONE);
        assert_eq!(blocks.get(-1, 0, 0), BlockType::AIR);
        assert_eq!(blocks.get(0, 16, 0), BlockType::AIR);
        assert_eq!(blocks.get(3, 3, 3), BlockType::STONE);
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let mut chunk = Chunk::solid(Point3::new(0, 0, 0), BlockType::STONE, 1);
        let snapshot = chunk.snapshot();
        assert!(chunk.set_block_at(1, 2, 3, BlockType::AIR, 2));
        assert_eq!(snapshot.get(1, 2, 3), BlockType::STONE);
        assert_eq!(chunk.get_block_at(1, 2, 3), BlockType::AIR);
    }

    #[test]
    fn setting_same_block_does_not_dirty() {
        let mut chunk = Chunk::solid(Point3::new(0, 0, 0), BlockType::STONE, 1);
        let generation = chunk.begin_meshing();
        assert_eq!(chunk.finish_meshing(generation, ChunkMesh::new()), MeshApplication::Applied);
        assert!(!chunk.set_block_at(0, 0, 0, BlockType::STONE, 2));
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn model_translates_by_chunk_size() {
        let chunk = Chunk::empty(Point3::new(1, 2, -3), 0);
        let origin = chunk.model() * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.truncate(), Vector3::new(16.0, 32.0, -48.0));
    }

    #[test]
    fn mesh_lifecycle_applies_matching_result() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0), 7);
        assert!(chunk.wants_mesh());
        let generation = chunk.begin_meshing();
        assert!(chunk.is_meshing());
        assert!(!chunk.wants_mesh());

        assert_eq!(
            chunk.finish_meshing(generation, mesh_with_one_vertex()),
            MeshApplication::Applied
        );
        assert!(!chunk.is_dirty());
        assert!(!chunk.is_meshing());
        assert!(chunk.needs_upload());
        assert_eq!(chunk.take_pending_upload().map(|m| m.vertex_count()), Some(1));
        assert!(!chunk.needs_upload());
    }

    #[test]
    fn edit_during_meshing_makes_result_stale() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0), 1);
        let generation = chunk.begin_meshing();
        chunk.set_block_at(0, 0, 0, BlockType::DIRT, 2);

        assert_eq!(
            chunk.finish_meshing(generation, mesh_with_one_vertex()),
            MeshApplication::Stale
        );
        assert!(chunk.is_dirty());
        assert!(!chunk.needs_upload());
        assert!(chunk.wants_mesh());
    }

    #[test]
    fn result_of_unknown_job_is_ignored() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0), 5);
        chunk.begin_meshing();
        assert_eq!(chunk.finish_meshing(4, ChunkMesh::new()), MeshApplication::Ignored);
        assert!(chunk.is_meshing());
    }
}
