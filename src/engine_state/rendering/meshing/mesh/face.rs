use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::PackedVertex;
use crate::engine_state::voxels::block::{BlockSide, BlockType};

/// Returns the two in-plane axes `(u, v)` of faces perpendicular to `axis`.
///
/// The pair is ordered so that `u × v` points along `+axis`.
#[inline]
pub fn plane_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    }
}

/// Represents a single merged quad of a chunk mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// in chunk-local vertex coordinates, so each component lies in `0..=16`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner, the origin of the rectangle
    pub ll: Point3<u32>,
    /// Lower-right corner, the origin moved along the in-plane `u` axis
    pub lr: Point3<u32>,
    /// Upper-right corner, the corner opposite the origin
    pub ur: Point3<u32>,
    /// Upper-left corner, the origin moved along the in-plane `v` axis
    pub ul: Point3<u32>,
    /// The block type every cell of the face shares
    pub block_type: BlockType,
    /// Which side of the blocks this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face of a rectangle found in a face mask.
    ///
    /// # Arguments
    /// * `block_side` - The side of the blocks the mask was built for
    /// * `depth` - The layer of blocks along the side's axis
    /// * `u`, `v` - Mask coordinates of the rectangle's first cell
    /// * `width` - Extent along `v`
    /// * `height` - Extent along `u`
    /// * `block_type` - The block type shared by every cell
    pub fn from_rect(
        block_side: BlockSide,
        depth: u32,
        u: u32,
        v: u32,
        width: u32,
        height: u32,
        block_type: BlockType,
    ) -> Self {
        let axis = block_side.axis();
        let (u_axis, v_axis) = plane_axes(axis);

        let mut origin = Point3::new(0, 0, 0);
        origin[axis] = depth + u32::from(block_side.direction() > 0);
        origin[u_axis] = u;
        origin[v_axis] = v;

        let mut du = Vector3::new(0, 0, 0);
        du[u_axis] = height;
        let mut dv = Vector3::new(0, 0, 0);
        dv[v_axis] = width;

        Face {
            ll: origin,
            lr: origin + du,
            ur: origin + du + dv,
            ul: origin + dv,
            block_type,
            block_side,
        }
    }

    /// Emits the two triangles of this face.
    ///
    /// Triangles wind counter-clockwise when viewed from the side the face points to.
    pub fn vertices(&self) -> [PackedVertex; 6] {
        let corners = if self.block_side.direction() > 0 {
            [self.ll, self.lr, self.ur, self.ll, self.ur, self.ul]
        } else {
            [self.ll, self.ur, self.lr, self.ll, self.ul, self.ur]
        };

        let normal = self.block_side.normal_index();
        let block_type = self.block_type.as_int() as u32;
        corners.map(|p| PackedVertex::pack(p.x, p.y, p.z, normal, block_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_axes_are_right_handed() {
        for axis in 0..3 {
            let (u, v) = plane_axes(axis);
            let mut eu = Vector3::new(0, 0, 0);
            eu[u] = 1;
            let mut ev = Vector3::new(0, 0, 0);
            ev[v] = 1;
            let mut expected = Vector3::new(0, 0, 0);
            expected[axis] = 1;
            assert_eq!(eu.cross(ev), expected);
        }
    }

    #[test]
    fn positive_faces_sit_on_far_side_of_the_cell() {
        let top = Face::from_rect(BlockSide::TOP, 3, 0, 0, 1, 1, BlockType::GRASS);
        assert_eq!(top.ll.y, 4);
        let bottom = Face::from_rect(BlockSide::BOTTOM, 3, 0, 0, 1, 1, BlockType::GRASS);
        assert_eq!(bottom.ll.y, 3);
    }

    #[test]
    fn far_corner_spans_width_and_height() {
        let face = Face::from_rect(BlockSide::RIGHT, 15, 2, 5, 4, 3, BlockType::STONE);
        assert_eq!(face.ll, Point3::new(2, 5, 16));
        assert_eq!(face.ur, Point3::new(5, 9, 16));
    }
}
