//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! The set is small and closed so a tag always fits the 4-bit field of a packed vertex.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `AIR` is the empty sentinel and is guaranteed to be the zero value, so a
/// zero-filled grid is an empty grid and a zeroed mask cell means "no face".
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    #[default]
    AIR = 0,

    /// A grass block, the default surface block.
    GRASS = 1,

    /// A plain dirt block.
    DIRT = 2,

    /// A stone block, used for rocky biomes.
    STONE = 3,

    /// A water block. Visible but see-through for targeting purposes.
    WATER = 4,

    /// A sand block.
    SAND = 5,
}

/// Number of bits a block tag occupies inside a packed vertex.
pub const BLOCK_TYPE_BITS: u32 = 4;

impl BlockType {
    /// Every block type, in tag order.
    pub const ALL: [BlockType; 6] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::WATER,
        BlockType::SAND,
    ];

    /// Converts a raw tag back into a `BlockType`.
    ///
    /// Unknown tags decode to `AIR` so that lookups stay total.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        <BlockType as FromPrimitive>::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Returns the raw tag of this block type.
    #[inline]
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns `true` for the empty sentinel.
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Returns `true` for blocks a targeting ray passes through.
    #[inline]
    pub fn is_see_through(self) -> bool {
        matches!(self, BlockType::AIR | BlockType::WATER)
    }

    /// Returns `true` for liquid blocks, which are meshed into the water buffer.
    #[inline]
    pub fn is_liquid(self) -> bool {
        self == BlockType::WATER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_zero() {
        assert_eq!(BlockType::AIR as u8, 0);
        assert_eq!(BlockType::default(), BlockType::AIR);
    }

    #[test]
    fn tags_fit_in_pack_field() {
        for block in BlockType::ALL {
            assert!((block.as_int() as u32) < (1 << BLOCK_TYPE_BITS));
            assert_eq!(BlockType::get_block_type_from_int(block.as_int()), block);
        }
    }

    #[test]
    fn unknown_tag_decodes_to_air() {
        assert_eq!(BlockType::get_block_type_from_int(200), BlockType::AIR);
    }

    #[test]
    fn water_is_see_through_but_not_air() {
        assert!(BlockType::WATER.is_see_through());
        assert!(!BlockType::WATER.is_air());
        assert!(!BlockType::STONE.is_see_through());
    }
}
