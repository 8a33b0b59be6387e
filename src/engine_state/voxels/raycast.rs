//! # Raycast Module
//!
//! Voxel traversal (Amanatides & Woo). The ray visits every grid cell it passes
//! through in order, so the first solid cell it reports is the nearest one.

use cgmath::{InnerSpace, Point3, Vector3};

/// The first solid cell along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaycastHit {
    /// The cell that was hit
    pub block: Point3<i32>,
    /// Unit normal of the face the ray entered through, pointing back toward the
    /// origin. Zero when the origin itself lies in a solid cell.
    pub normal: Vector3<i32>,
}

impl RaycastHit {
    /// The cell in front of the hit face, where a placed block goes.
    ///
    /// `None` when the ray started inside the hit cell.
    pub fn adjacent(&self) -> Option<Point3<i32>> {
        (self.normal != Vector3::new(0, 0, 0)).then(|| self.block + self.normal)
    }
}

/// Traverses the grid from `origin` along `direction` for at most `max_distance`.
///
/// # Arguments
/// * `origin` - Ray start in world space
/// * `direction` - Ray direction; need not be normalized
/// * `max_distance` - Length of the ray
/// * `is_solid` - Decides whether a cell stops the ray
///
/// # Returns
/// The first cell for which `is_solid` holds, or `None` if there is none within
/// reach. When the ray crosses an edge or corner exactly, the tie is broken toward
/// the x axis first, then y, then z.
pub fn raycast(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    mut is_solid: impl FnMut(Point3<i32>) -> bool,
) -> Option<RaycastHit> {
    if !(max_distance.is_finite() && max_distance >= 0.0) {
        return None;
    }
    if direction.magnitude2() == 0.0 || !direction.magnitude2().is_finite() {
        return None;
    }
    let direction = direction.normalize();

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    let mut normal = Vector3::new(0, 0, 0);

    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for axis in 0..3 {
        let d = direction[axis];
        if d > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / d;
            t_max[axis] = (cell[axis] as f32 + 1.0 - origin[axis]) / d;
        } else if d < 0.0 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / d;
            t_max[axis] = (origin[axis] - cell[axis] as f32) / -d;
        }
    }

    loop {
        if is_solid(cell) {
            return Some(RaycastHit {
                block: cell,
                normal,
            });
        }

        let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
            0
        } else if t_max[1] <= t_max[2] {
            1
        } else {
            2
        };

        if t_max[axis] > max_distance {
            return None;
        }

        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        normal = Vector3::new(0, 0, 0);
        normal[axis] = -step[axis];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_at(target: Point3<i32>) -> impl FnMut(Point3<i32>) -> bool {
        move |cell| cell == target
    }

    #[test]
    fn hits_block_straight_ahead() {
        let hit = raycast(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            10.0,
            solid_at(Point3::new(4, 0, 0)),
        );
        assert_eq!(
            hit,
            Some(RaycastHit {
                block: Point3::new(4, 0, 0),
                normal: Vector3::new(-1, 0, 0),
            })
        );
    }

    #[test]
    fn normal_points_back_toward_origin() {
        let hit = raycast(
            Point3::new(2.5, 10.2, 2.5),
            Vector3::new(0.0, -1.0, 0.0),
            20.0,
            |cell| cell.y < 5,
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(2, 4, 2));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
        assert_eq!(hit.adjacent(), Some(Point3::new(2, 5, 2)));
    }

    #[test]
    fn respects_max_distance() {
        let target = Point3::new(0, 0, 9);
        let origin = Point3::new(0.5, 0.5, 0.5);
        let forward = Vector3::new(0.0, 0.0, 1.0);
        assert!(raycast(origin, forward, 8.0, solid_at(target)).is_none());
        assert!(raycast(origin, forward, 8.5, solid_at(target)).is_some());
    }

    #[test]
    fn origin_inside_solid_has_zero_normal() {
        let hit = raycast(
            Point3::new(1.5, 1.5, 1.5),
            Vector3::new(0.0, 1.0, 0.0),
            5.0,
            |_| true,
        )
        .unwrap();
        assert_eq!(hit.block, Point3::new(1, 1, 1));
        assert_eq!(hit.normal, Vector3::new(0, 0, 0));
        assert_eq!(hit.adjacent(), None);
    }

    #[test]
    fn zero_direction_hits_nothing() {
        assert!(raycast(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), 5.0, |_| true)
            .is_none());
    }

    #[test]
    fn exact_corner_prefers_x_then_y() {
        let mut visited = Vec::new();
        raycast(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 1.0, 1.0),
            3.0,
            |cell| {
                visited.push(cell);
                false
            },
        );
        assert_eq!(
            &visited[..4],
            &[
                Point3::new(0, 0, 0),
                Point3::new(1, 0, 0),
                Point3::new(1, 1, 0),
                Point3::new(1, 1, 1),
            ]
        );
    }

    #[test]
    fn negative_coordinates_floor_correctly() {
        let hit = raycast(
            Point3::new(-0.5, 0.5, -3.5),
            Vector3::new(0.0, 0.0, 1.0),
            10.0,
            solid_at(Point3::new(-1, 0, 1)),
        )
        .unwrap();
        assert_eq!(hit.normal, Vector3::new(0, 0, -1));
    }
}
