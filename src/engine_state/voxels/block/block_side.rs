//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block.
//! The discriminant of each side doubles as the normal index written into
//! packed vertices, so the order must not change.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT], i.e. -X, +X, -Y, +Y, -Z, +Z.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in normal-index order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The normal index written into packed vertices (0..=5).
    #[inline]
    pub fn normal_index(self) -> u32 {
        self as u32
    }

    /// Inverse of [`BlockSide::normal_index`].
    pub fn from_normal_index(index: u32) -> Option<BlockSide> {
        Self::all().get(index as usize).copied()
    }

    /// The axis this face is perpendicular to (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(self) -> usize {
        self as usize / 2
    }

    /// `-1` for faces looking down their axis, `+1` otherwise.
    #[inline]
    pub fn direction(self) -> i32 {
        if self as usize % 2 == 0 {
            -1
        } else {
            1
        }
    }

    /// Unit offset to the face-adjacent cell.
    pub fn offset(self) -> Vector3<i32> {
        let mut offset = Vector3::new(0, 0, 0);
        offset[self.axis()] = self.direction();
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_normal_order() {
        assert_eq!(BlockSide::FRONT.offset(), Vector3::new(-1, 0, 0));
        assert_eq!(BlockSide::BACK.offset(), Vector3::new(1, 0, 0));
        assert_eq!(BlockSide::BOTTOM.offset(), Vector3::new(0, -1, 0));
        assert_eq!(BlockSide::TOP.offset(), Vector3::new(0, 1, 0));
        assert_eq!(BlockSide::LEFT.offset(), Vector3::new(0, 0, -1));
        assert_eq!(BlockSide::RIGHT.offset(), Vector3::new(0, 0, 1));
    }

    #[test]
    fn normal_index_roundtrips() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_normal_index(side.normal_index()), Some(side));
        }
        assert_eq!(BlockSide::from_normal_index(6), None);
    }
}
