//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces of the same block type into larger quads, significantly reducing the number of
//! vertices needed to render a chunk.
//!
//! For every side and every layer along that side's axis a mask is built: a cell holds
//! the block type when the block in that layer is solid and the block it faces is air.
//! The mask is then consumed row by row, growing each rectangle first along `v` and
//! then along `u` for as long as every cell matches.

use cgmath::Point3;

use crate::engine_state::rendering::meshing::ChunkNeighbors;
use crate::engine_state::voxels::{
    block::{BlockSide, BlockType},
    chunk::{in_chunk_bounds, ChunkBlocks, CHUNK_DIMENSION, CHUNK_PLANE_SIZE},
};

use super::{face::plane_axes, mesh::ChunkMesh, Face};

/// Visible faces of one layer, indexed `u * 16 + v`. `AIR` means "no face".
pub type FaceMask = [BlockType; CHUNK_PLANE_SIZE as usize];

/// A maximal rectangle found in a [`FaceMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskRect {
    pub u: i32,
    pub v: i32,
    /// Extent along `v`
    pub width: i32,
    /// Extent along `u`
    pub height: i32,
    pub block_type: BlockType,
}

#[inline]
fn mask_index(u: i32, v: i32) -> usize {
    (u * CHUNK_DIMENSION + v) as usize
}

/// Looks up the block a face of `position` looks at.
///
/// Only the coordinate along `side`'s axis can leave the chunk, in which case the
/// neighbor grid on that side answers.
fn facing_block(
    blocks: &ChunkBlocks,
    neighbors: &ChunkNeighbors,
    side: BlockSide,
    position: Point3<i32>,
) -> BlockType {
    let target = position + side.offset();
    if in_chunk_bounds(target.x, target.y, target.z) {
        return blocks.get(target.x, target.y, target.z);
    }
    let mut wrapped = target;
    let axis = side.axis();
    wrapped[axis] = wrapped[axis].rem_euclid(CHUNK_DIMENSION);
    neighbors.block_at(side, wrapped.x, wrapped.y, wrapped.z)
}

/// Fills `mask` with the visible faces of layer `depth` for `side`.
fn build_mask(
    blocks: &ChunkBlocks,
    neighbors: &ChunkNeighbors,
    side: BlockSide,
    depth: i32,
    mask: &mut FaceMask,
) -> bool {
    let axis = side.axis();
    let (u_axis, v_axis) = plane_axes(axis);
    let mut any = false;

    for u in 0..CHUNK_DIMENSION {
        for v in 0..CHUNK_DIMENSION {
            let mut position = Point3::new(0, 0, 0);
            position[axis] = depth;
            position[u_axis] = u;
            position[v_axis] = v;

            let block_type = blocks.get(position.x, position.y, position.z);
            let visible = !block_type.is_air()
                && facing_block(blocks, neighbors, side, position).is_air();

            mask[mask_index(u, v)] = if visible {
                any = true;
                block_type
            } else {
                BlockType::AIR
            };
        }
    }
    any
}

/// Covers every non-air cell of `mask` with maximal same-type rectangles.
///
/// The mask is cleared as rectangles are taken, so every cell is covered exactly once.
pub fn merge_mask(mask: &mut FaceMask, mut emit: impl FnMut(MaskRect)) {
    for u in 0..CHUNK_DIMENSION {
        let mut v = 0;
        while v < CHUNK_DIMENSION {
            let block_type = mask[mask_index(u, v)];
            if block_type.is_air() {
                v += 1;
                continue;
            }

            let mut width = 1;
            while v + width < CHUNK_DIMENSION && mask[mask_index(u, v + width)] == block_type {
                width += 1;
            }

            let mut height = 1;
            'grow: while u + height < CHUNK_DIMENSION {
                for dv in 0..width {
                    if mask[mask_index(u + height, v + dv)] != block_type {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for du in 0..height {
                for dv in 0..width {
                    mask[mask_index(u + du, v + dv)] = BlockType::AIR;
                }
            }

            emit(MaskRect {
                u,
                v,
                width,
                height,
                block_type,
            });
            v += width;
        }
    }
}

/// Generates the mesh of a chunk.
///
/// # Arguments
/// * `blocks` - The chunk's block grid
/// * `neighbors` - The six face-adjacent grids; absent neighbors count as solid
///
/// # Returns
/// A [`ChunkMesh`] with one quad (six vertices) per merged rectangle.
pub fn greedy_mesh(blocks: &ChunkBlocks, neighbors: &ChunkNeighbors) -> ChunkMesh {
    let mut mesh = ChunkMesh::new();
    if blocks.is_empty() {
        return mesh;
    }

    let mut mask: FaceMask = [BlockType::AIR; CHUNK_PLANE_SIZE as usize];
    for side in BlockSide::all() {
        for depth in 0..CHUNK_DIMENSION {
            if !build_mask(blocks, neighbors, side, depth, &mut mask) {
                continue;
            }
            merge_mask(&mut mask, |rect| {
                mesh.add_face(&Face::from_rect(
                    side,
                    depth as u32,
                    rect.u as u32,
                    rect.v as u32,
                    rect.width as u32,
                    rect.height as u32,
                    rect.block_type,
                ));
            });
        }
    }
    mesh
}
