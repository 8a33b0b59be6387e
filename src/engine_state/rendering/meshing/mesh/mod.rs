//! Mesh generation for voxel rendering.
//!
//! This module converts a chunk's block grid into GPU-friendly geometry. It uses
//! greedy binary meshing: for each of the six face directions and each layer of the
//! chunk it builds a 16x16 mask of visible faces, then covers the mask with maximal
//! rectangles that each become one quad.
//!
//! # Architecture
//! - [`ChunkMesh`]: solid and water vertex lists for one chunk
//! - [`Face`]: one merged quad and its triangle emission
//! - `greedy`: mask construction and rectangle merging

mod face;
mod greedy;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{plane_axes, Face};
pub use greedy::{greedy_mesh, merge_mask, FaceMask, MaskRect};
pub use mesh::*;
