//! Vertex data structures and layouts for voxel rendering.
//!
//! Every vertex of a chunk mesh is a single 32-bit word. Positions are chunk-local
//! (the chunk's model transform places them in the world), which keeps each
//! coordinate within five bits.

use bytemuck::{Pod, Zeroable};

use crate::engine_state::voxels::block::block_type::BLOCK_TYPE_BITS;

const POSITION_BITS: u32 = 5;
const NORMAL_BITS: u32 = 3;

const POSITION_MASK: u32 = (1 << POSITION_BITS) - 1;
const NORMAL_MASK: u32 = (1 << NORMAL_BITS) - 1;
const BLOCK_TYPE_MASK: u32 = (1 << BLOCK_TYPE_BITS) - 1;

const Y_SHIFT: u32 = POSITION_BITS;
const Z_SHIFT: u32 = 2 * POSITION_BITS;
const NORMAL_SHIFT: u32 = 3 * POSITION_BITS;
const BLOCK_TYPE_SHIFT: u32 = NORMAL_SHIFT + NORMAL_BITS;

/// A vertex packed into one little-endian `u32`.
///
/// # Memory Layout
/// - bits 0..5: x (0-16)
/// - bits 5..10: y (0-16)
/// - bits 10..15: z (0-16)
/// - bits 15..18: normal index (0-5)
/// - bits 18..22: block type tag
/// - bits 22..32: zero
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PackedVertex(pub u32);

impl PackedVertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<u32>();

    /// Packs a vertex. Each field is masked to its bit width.
    pub fn pack(x: u32, y: u32, z: u32, normal: u32, block_type: u32) -> Self {
        PackedVertex(
            (x & POSITION_MASK)
                | (y & POSITION_MASK) << Y_SHIFT
                | (z & POSITION_MASK) << Z_SHIFT
                | (normal & NORMAL_MASK) << NORMAL_SHIFT
                | (block_type & BLOCK_TYPE_MASK) << BLOCK_TYPE_SHIFT,
        )
    }

    /// Unpacks the vertex into `(x, y, z, normal, block_type)`.
    pub fn unpack(self) -> (u32, u32, u32, u32, u32) {
        (
            self.x(),
            self.y(),
            self.z(),
            self.normal(),
            self.block_type(),
        )
    }

    #[inline]
    pub fn x(self) -> u32 {
        self.0 & POSITION_MASK
    }

    #[inline]
    pub fn y(self) -> u32 {
        (self.0 >> Y_SHIFT) & POSITION_MASK
    }

    #[inline]
    pub fn z(self) -> u32 {
        (self.0 >> Z_SHIFT) & POSITION_MASK
    }

    #[inline]
    pub fn normal(self) -> u32 {
        (self.0 >> NORMAL_SHIFT) & NORMAL_MASK
    }

    #[inline]
    pub fn block_type(self) -> u32 {
        (self.0 >> BLOCK_TYPE_SHIFT) & BLOCK_TYPE_MASK
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: packed vertex (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Uint32,
        }];
        wgpu::VertexBufferLayout {
            array_stride: PackedVertex::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
