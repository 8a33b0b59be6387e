//! The observer the world streams around.

use cgmath::{Point2, Point3, Vector3};

use super::voxels::chunk::CHUNK_DIMENSION;

/// Position and view direction of the observer for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// View direction; need not be normalized
    pub forward: Vector3<f32>,
}

impl Viewpoint {
    pub fn new(position: Point3<f32>, forward: Vector3<f32>) -> Self {
        Viewpoint { position, forward }
    }

    /// The `(cx, cz)` column the viewpoint stands in.
    pub fn column(&self) -> Point2<i32> {
        let size = CHUNK_DIMENSION as f32;
        Point2::new(
            (self.position.x / size).floor() as i32,
            (self.position.z / size).floor() as i32,
        )
    }
}
