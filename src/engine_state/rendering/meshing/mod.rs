//! Mesh generation for chunks.
//!
//! A mesh job sees one chunk's grid plus read-only snapshots of up to six
//! face-adjacent grids, so faces on chunk boundaries are culled against the real
//! neighbor. A neighbor that is not loaded yet is treated as solid: faces toward
//! unloaded space stay hidden until the neighbor arrives and the chunk is
//! re-meshed.

use crate::engine_state::voxels::{
    block::{BlockSide, BlockType},
    chunk::{ChunkBlocks, CHUNK_SIZE},
};

mod mesh;

pub use mesh::*;

/// Most vertices one chunk mesh can hold: a 3D checkerboard, where every solid
/// block shows all six faces and no two faces merge.
pub const MAX_CHUNK_VERTICES: usize = CHUNK_SIZE as usize / 2 * 36;

/// Block reported for cells of a neighbor that is not loaded.
pub const ABSENT_NEIGHBOR_BLOCK: BlockType = BlockType::STONE;

/// Snapshots of the six face-adjacent chunk grids, indexed by [`BlockSide`].
#[derive(Clone, Debug, Default)]
pub struct ChunkNeighbors {
    sides: [Option<ChunkBlocks>; 6],
}

impl ChunkNeighbors {
    /// No neighbors loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the grid adjacent on `side`.
    pub fn set(&mut self, side: BlockSide, blocks: ChunkBlocks) {
        self.sides[side as usize] = Some(blocks);
    }

    /// The grid adjacent on `side`, if loaded.
    pub fn get(&self, side: BlockSide) -> Option<&ChunkBlocks> {
        self.sides[side as usize].as_ref()
    }

    /// Number of loaded neighbors.
    pub fn loaded(&self) -> usize {
        self.sides.iter().flatten().count()
    }

    /// Block at a local coordinate of the neighbor on `side`.
    pub fn block_at(&self, side: BlockSide, x: i32, y: i32, z: i32) -> BlockType {
        match self.get(side) {
            Some(blocks) => blocks.get(x, y, z),
            None => ABSENT_NEIGHBOR_BLOCK,
        }
    }
}

/// Meshes one chunk.
pub fn mesh_chunk(blocks: &ChunkBlocks, neighbors: &ChunkNeighbors) -> ChunkMesh {
    greedy_mesh(blocks, neighbors)
}
