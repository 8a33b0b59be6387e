//! # Chunk Column Module
//!
//! A column is the unit of streaming: all [`COLUMN_HEIGHT`] chunks stacked at one
//! `(cx, cz)`. It is generated in one go from a single height map, and it owns the
//! GPU buffers its chunks draw from.
//!
//! ## GPU aggregation
//!
//! Each column lazily allocates one solid and one water vertex buffer, each with one
//! fixed-size slot per chunk. Chunk `cy` always lives in slot `cy`, so re-uploading a
//! chunk never moves another chunk's geometry and a draw is just a vertex range.

use cgmath::{Point2, Point3};
use log::error;

use crate::engine_state::rendering::{
    meshing::MeshKind, BackendError, BufferHandle, DrawCall, PackedVertex, RenderBackend,
};

use super::chunk::{Chunk, DrawRange};
use super::terrain::{HeightMap, TerrainGenerator};

/// Number of chunks stacked in a column.
pub const COLUMN_HEIGHT: i32 = 8;

/// A vertical stack of chunks sharing one height map and one pair of buffers.
pub struct ChunkColumn {
    /// The `(cx, cz)` coordinate of the column
    pub position: Point2<i32>,
    height_map: HeightMap,
    chunks: Vec<Chunk>,
    buffers: [Option<BufferHandle>; 2],
}

impl ChunkColumn {
    /// Generates every chunk of the column at `position`.
    ///
    /// All chunks start dirty, stamped with `generation`.
    pub fn generate(position: Point2<i32>, terrain: &TerrainGenerator, generation: u64) -> Self {
        let height_map = terrain.height_map(position);
        let chunks = (0..COLUMN_HEIGHT)
            .map(|cy| {
                Chunk::generate(
                    Point3::new(position.x, cy, position.y),
                    &height_map,
                    terrain,
                    generation,
                )
            })
            .collect();

        ChunkColumn {
            position,
            height_map,
            chunks,
            buffers: [None; 2],
        }
    }

    /// The column's surface data.
    pub fn height_map(&self) -> &HeightMap {
        &self.height_map
    }

    /// The chunk at height `cy`, if `cy` lies within the column.
    pub fn chunk(&self, cy: i32) -> Option<&Chunk> {
        usize::try_from(cy).ok().and_then(|cy| self.chunks.get(cy))
    }

    /// Mutable access to the chunk at height `cy`.
    pub fn chunk_mut(&mut self, cy: i32) -> Option<&mut Chunk> {
        usize::try_from(cy).ok().and_then(|cy| self.chunks.get_mut(cy))
    }

    /// The chunks bottom to top.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Mutable chunks bottom to top.
    pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.iter_mut()
    }

    /// The buffer of `kind`, once allocated.
    pub fn buffer(&self, kind: MeshKind) -> Option<BufferHandle> {
        self.buffers[kind as usize]
    }

    /// Uploads every chunk mesh waiting for upload.
    ///
    /// A chunk whose upload fails draws nothing until it is meshed again.
    ///
    /// # Returns
    /// The number of chunks uploaded, and the coordinate and error of every chunk that
    /// failed.
    pub fn upload_pending(
        &mut self,
        backend: &mut dyn RenderBackend,
        slot_vertices: usize,
    ) -> (usize, Vec<(Point3<i32>, BackendError)>) {
        let mut uploaded = 0;
        let mut failures = Vec::new();

        for cy in 0..self.chunks.len() {
            let Some(mesh) = self.chunks[cy].take_pending_upload() else {
                continue;
            };

            let mut ranges = [DrawRange::default(); 2];
            let mut result = Ok(());
            for kind in MeshKind::ALL {
                match self.upload_slot(backend, kind, cy, mesh.bytes(kind), slot_vertices) {
                    Ok(range) => ranges[kind as usize] = range,
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                }
            }

            let chunk = &mut self.chunks[cy];
            match result {
                Ok(()) => {
                    for kind in MeshKind::ALL {
                        chunk.set_draw_range(kind, ranges[kind as usize]);
                    }
                    uploaded += 1;
                }
                Err(err) => {
                    error!("Upload of chunk {:?} failed: {}", chunk.position, err);
                    chunk.clear_draw_ranges();
                    failures.push((chunk.position, err));
                }
            }
        }

        (uploaded, failures)
    }

    /// Writes one chunk's vertices of `kind` into its slot.
    fn upload_slot(
        &mut self,
        backend: &mut dyn RenderBackend,
        kind: MeshKind,
        slot: usize,
        bytes: &[u8],
        slot_vertices: usize,
    ) -> Result<DrawRange, BackendError> {
        let vertices = bytes.len() / PackedVertex::SIZE;
        if vertices > slot_vertices {
            return Err(BackendError::SlotOverflow {
                vertices,
                capacity: slot_vertices,
            });
        }

        let first_vertex = (slot * slot_vertices) as u32;
        if vertices == 0 {
            return Ok(DrawRange {
                first_vertex,
                vertex_count: 0,
            });
        }

        let handle = match self.buffers[kind as usize] {
            Some(handle) => handle,
            None => {
                let size = COLUMN_HEIGHT as u64 * slot_vertices as u64 * PackedVertex::SIZE as u64;
                let handle = backend.allocate_buffer(size)?;
                self.buffers[kind as usize] = Some(handle);
                handle
            }
        };

        let offset = (slot * slot_vertices * PackedVertex::SIZE) as u64;
        backend.upload(handle, bytes, offset)?;
        Ok(DrawRange {
            first_vertex,
            vertex_count: vertices as u32,
        })
    }

    /// Issues one draw per chunk with geometry of `kind`.
    pub fn draw(&self, kind: MeshKind, backend: &mut dyn RenderBackend) {
        let Some(buffer) = self.buffer(kind) else {
            return;
        };
        for chunk in &self.chunks {
            let range = chunk.draw_range(kind);
            if range.vertex_count == 0 {
                continue;
            }
            backend.draw(DrawCall {
                buffer,
                first_vertex: range.first_vertex,
                vertex_count: range.vertex_count,
                model: chunk.model(),
            });
        }
    }

    /// Frees the column's buffers.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for buffer in self.buffers.iter_mut() {
            if let Some(handle) = buffer.take() {
                backend.release(handle);
            }
        }
        for chunk in &mut self.chunks {
            chunk.clear_draw_ranges();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::ChunkMesh;
    use crate::engine_state::rendering::HeadlessBackend;
    use crate::engine_state::voxels::block::BlockType;

    fn flat_column() -> ChunkColumn {
        let terrain = TerrainGenerator::from_oracles(
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            0.5,
            0,
        );
        ChunkColumn::generate(Point2::new(1, -2), &terrain, 1)
    }

    fn mesh_of(solid: usize, water: usize) -> ChunkMesh {
        ChunkMesh {
            solid: vec![PackedVertex::pack(1, 2, 3, 0, BlockType::STONE as u32); solid],
            water: vec![PackedVertex::pack(1, 2, 3, 3, BlockType::WATER as u32); water],
        }
    }

    fn apply(column: &mut ChunkColumn, cy: i32, mesh: ChunkMesh) {
        let chunk = column.chunk_mut(cy).unwrap();
        let generation = chunk.begin_meshing();
        chunk.finish_meshing(generation, mesh);
    }

    #[test]
    fn generates_full_stack_with_positions() {
        let column = flat_column();
        assert_eq!(column.chunks().count(), COLUMN_HEIGHT as usize);
        for (cy, chunk) in column.chunks().enumerate() {
            assert_eq!(chunk.position, Point3::new(1, cy as i32, -2));
            assert!(chunk.is_dirty());
        }
        assert!(column.chunk(-1).is_none());
        assert!(column.chunk(COLUMN_HEIGHT).is_none());
        assert_eq!(column.height_map().surface(0, 0), 16);
    }

    #[test]
    fn chunks_upload_into_their_own_slot() {
        let mut column = flat_column();
        let mut backend = HeadlessBackend::new();
        apply(&mut column, 2, mesh_of(6, 0));

        let (uploaded, failures) = column.upload_pending(&mut backend, 100);
        assert_eq!(uploaded, 1);
        assert!(failures.is_empty());
        assert!(column.buffer(MeshKind::Water).is_none());

        let handle = column.buffer(MeshKind::Solid).unwrap();
        let bytes = backend.buffer_bytes(handle).unwrap();
        assert_eq!(bytes.len(), COLUMN_HEIGHT as usize * 100 * 4);
        let slot_start = 2 * 100 * 4;
        assert_ne!(&bytes[slot_start..slot_start + 4], &[0, 0, 0, 0]);

        column.draw(MeshKind::Solid, &mut backend);
        assert_eq!(backend.draw_calls().len(), 1);
        assert_eq!(backend.draw_calls()[0].first_vertex, 200);
        assert_eq!(backend.draw_calls()[0].vertex_count, 6);
    }

    #[test]
    fn water_goes_to_second_buffer() {
        let mut column = flat_column();
        let mut backend = HeadlessBackend::new();
        apply(&mut column, 0, mesh_of(6, 12));
        column.upload_pending(&mut backend, 64);

        assert!(column.buffer(MeshKind::Water).is_some());
        column.draw(MeshKind::Water, &mut backend);
        assert_eq!(backend.draw_calls().len(), 1);
        assert_eq!(backend.draw_calls()[0].vertex_count, 12);
    }

    #[test]
    fn oversized_mesh_is_rejected() {
        let mut column = flat_column();
        let mut backend = HeadlessBackend::new();
        apply(&mut column, 0, mesh_of(12, 0));

        let (uploaded, failures) = column.upload_pending(&mut backend, 6);
        assert_eq!(uploaded, 0);
        assert_eq!(
            failures,
            vec![(
                Point3::new(1, 0, -2),
                BackendError::SlotOverflow {
                    vertices: 12,
                    capacity: 6
                }
            )]
        );
        assert_eq!(column.chunk(0).unwrap().draw_range(MeshKind::Solid).vertex_count, 0);
    }

    #[test]
    fn release_frees_buffers() {
        let mut column = flat_column();
        let mut backend = HeadlessBackend::new();
        apply(&mut column, 0, mesh_of(6, 6));
        column.upload_pending(&mut backend, 64);
        assert_eq!(backend.buffer_count(), 2);

        column.release(&mut backend);
        assert_eq!(backend.buffer_count(), 0);
        column.draw(MeshKind::Solid, &mut backend);
        assert!(backend.draw_calls().is_empty());
    }
}
