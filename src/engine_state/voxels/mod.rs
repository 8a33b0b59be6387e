//! # Voxel Data
//!
//! Everything the streamer knows about the world's contents.
//!
//! ## Architecture
//!
//! * **Block**: Block types and the six face directions
//! * **Chunk**: A 16³ grid of blocks with its meshing lifecycle
//! * **Column**: The eight chunks stacked at one `(cx, cz)` and their GPU buffers
//! * **Terrain**: Noise-driven height maps
//! * **Raycast**: Grid traversal for block targeting
//! * **World**: Streaming, edits and the per-tick bookkeeping
//!
//! ## Data Flow
//!
//! 1. The world generates columns around the viewpoint from the terrain
//! 2. New and edited chunks are marked dirty
//! 3. Dirty chunks are snapshotted and meshed on worker threads
//! 4. Meshes that are still current are uploaded into their column's buffers

pub mod block;
pub mod chunk;
pub mod column;
pub mod raycast;
pub mod terrain;
pub mod world;
