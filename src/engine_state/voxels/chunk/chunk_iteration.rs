//! # Chunk Iteration Module
//!
//! This module provides an iterator over all non-air blocks in a chunk grid,
//! walking the dense array in storage order and skipping air.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockType;

use super::{ChunkBlocks, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_SIZE};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields each solid block with its chunk-local position, in `x`, then `y`, then `z`
/// major order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the grid being iterated over
    blocks_ref: &'a ChunkBlocks,
    /// Next index into the block array to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given grid.
    pub fn new(blocks_ref: &'a ChunkBlocks) -> Self {
        ChunkBlockIterator {
            blocks_ref,
            current_offset: 0,
        }
    }

    fn position_of(offset: usize) -> Point3<usize> {
        let offset = offset as i32;
        Point3::new(
            (offset / CHUNK_PLANE_SIZE) as usize,
            ((offset / CHUNK_DIMENSION) % CHUNK_DIMENSION) as usize,
            (offset % CHUNK_DIMENSION) as usize,
        )
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.blocks_ref.as_slice();
        while self.current_offset < CHUNK_SIZE as usize {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block_type = blocks[offset];
            if !block_type.is_air() {
                return Some((Self::position_of(offset), block_type));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_yields_nothing() {
        assert_eq!(ChunkBlocks::empty().solid_blocks().count(), 0);
        assert!(ChunkBlocks::empty().is_empty());
    }

    #[test]
    fn yields_positions_of_solid_blocks() {
        let mut blocks = ChunkBlocks::empty();
        blocks.set(1, 2, 3, BlockType::DIRT);
        blocks.set(15, 0, 15, BlockType::SAND);

        let found: Vec<_> = blocks.solid_blocks().collect();
        assert_eq!(
            found,
            vec![
                (Point3::new(1, 2, 3), BlockType::DIRT),
                (Point3::new(15, 0, 15), BlockType::SAND),
            ]
        );
    }

    #[test]
    fn full_grid_yields_every_block() {
        let blocks = ChunkBlocks::filled(BlockType::STONE);
        assert_eq!(blocks.solid_blocks().count(), CHUNK_SIZE as usize);
    }
}
