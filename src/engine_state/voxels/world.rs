//! # World Module
//!
//! This module provides the `World` struct which owns every loaded chunk column and
//! drives streaming, meshing bookkeeping, uploads and block edits.
//!
//! ## Streaming
//!
//! The world keeps every column within a circular radius of the viewpoint's column
//! loaded (`dx² + dz² <= R²`). When the viewpoint moves to a new column or the radius
//! changes, columns that fell outside are evicted at once and columns that came
//! inside are queued. Each tick generates at most `creation_per_tick` queued columns,
//! nearest first.
//!
//! ## Meshing bookkeeping
//!
//! Dirty chunks are turned into mesh jobs carrying immutable snapshots of the chunk
//! and its six neighbors. Jobs wait in a queue until the engine hands them to the
//! worker pool, which keeps draining them between ticks. Results are matched back to their chunk by coordinate and generation; anything that no longer
//! matches is dropped.
//!
//! ## Block access
//!
//! Block lookups by world coordinate are total: unloaded space reads as `AIR`.

use std::collections::{HashMap, HashSet, VecDeque};

use cgmath::{Point2, Point3, Vector3};
use log::debug;

use crate::engine_state::{
    config::WorldConfig,
    rendering::{
        meshing::{ChunkNeighbors, MeshKind},
        tasks::ChunkMeshGenerationTask,
        RenderBackend,
    },
    viewpoint::Viewpoint,
};

use super::{
    block::{BlockSide, BlockType},
    chunk::{Chunk, CHUNK_DIMENSION},
    column::ChunkColumn,
    raycast::{raycast, RaycastHit},
    terrain::TerrainGenerator,
};

/// Splits a world block coordinate into its chunk coordinate and chunk-local offset.
pub fn split_world_position(position: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
    let chunk = Point3::new(
        position.x.div_euclid(CHUNK_DIMENSION),
        position.y.div_euclid(CHUNK_DIMENSION),
        position.z.div_euclid(CHUNK_DIMENSION),
    );
    let local = Point3::new(
        position.x.rem_euclid(CHUNK_DIMENSION),
        position.y.rem_euclid(CHUNK_DIMENSION),
        position.z.rem_euclid(CHUNK_DIMENSION),
    );
    (chunk, local)
}

#[inline]
fn column_of(chunk: Point3<i32>) -> Point2<i32> {
    Point2::new(chunk.x, chunk.z)
}

#[inline]
fn distance2(a: Point2<i32>, b: Point2<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dz = (a.y - b.y) as i64;
    dx * dx + dz * dz
}

#[inline]
fn within_radius(column: Point2<i32>, center: Point2<i32>, radius: i32) -> bool {
    distance2(column, center) <= (radius as i64) * (radius as i64)
}

/// Column bookkeeping done by one [`World::update_streaming`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingReport {
    pub queued: usize,
    pub created: usize,
    pub evicted: usize,
}

/// Upload bookkeeping done by one [`World::upload_pending`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: usize,
}

/// A snapshot of world counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub columns: usize,
    pub chunks: usize,
    pub dirty_chunks: usize,
    pub meshing_chunks: usize,
    pub pending_uploads: usize,
    pub creation_queue: usize,
    pub pending_mesh_jobs: usize,
    pub drawn_vertices: u64,
}

/// Represents the streamed voxel world.
pub struct World {
    config: WorldConfig,
    terrain: TerrainGenerator,
    columns: HashMap<Point2<i32>, ChunkColumn>,
    creation_queue: VecDeque<Point2<i32>>,
    queued_columns: HashSet<Point2<i32>>,
    pending_mesh: VecDeque<ChunkMeshGenerationTask>,
    streaming_center: Option<Point2<i32>>,
    streamed_radius: Option<i32>,
    viewpoint: Option<Viewpoint>,
    current_hit: Option<RaycastHit>,
    next_generation: u64,
}

impl World {
    /// Creates an empty world generating terrain from the configured noise.
    pub fn new(config: WorldConfig) -> Self {
        let terrain = TerrainGenerator::new(&config.noise, config.sea_level);
        Self::with_terrain(config, terrain)
    }

    /// Creates an empty world with a custom terrain generator.
    pub fn with_terrain(config: WorldConfig, terrain: TerrainGenerator) -> Self {
        World {
            config,
            terrain,
            columns: HashMap::new(),
            creation_queue: VecDeque::new(),
            queued_columns: HashSet::new(),
            pending_mesh: VecDeque::new(),
            streaming_center: None,
            streamed_radius: None,
            viewpoint: None,
            current_hit: None,
            next_generation: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The terrain generator new columns are built with.
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    /// Changes the streaming radius. Takes effect on the next streaming update.
    pub fn set_render_radius(&mut self, radius: i32) {
        self.config.render_radius = radius.max(0);
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Runs the streaming part of a tick.
    ///
    /// Re-evaluates the loaded set when the viewpoint's column or the radius changed,
    /// generates up to `creation_per_tick` queued columns, and refreshes the block the
    /// viewpoint is looking at.
    pub fn update_streaming(
        &mut self,
        viewpoint: Viewpoint,
        backend: &mut dyn RenderBackend,
    ) -> StreamingReport {
        let radius = self.config.render_radius;
        let center = viewpoint.column();
        let mut report = StreamingReport::default();

        if self.streaming_center != Some(center) || self.streamed_radius != Some(radius) {
            self.streaming_center = Some(center);
            self.streamed_radius = Some(radius);
            report.evicted = self.evict_outside(center, radius, backend);
            report.queued = self.queue_missing(center, radius);
        }
        report.created = self.create_queued_columns(center, radius);

        if report.created > 0 || report.evicted > 0 {
            debug!(
                "Streaming around {:?}: {} created, {} evicted, {} queued",
                center,
                report.created,
                report.evicted,
                self.creation_queue.len()
            );
        }

        self.viewpoint = Some(viewpoint);
        self.refresh_hit();
        report
    }

    /// Queues every column inside the radius that is neither loaded nor queued.
    fn queue_missing(&mut self, center: Point2<i32>, radius: i32) -> usize {
        let mut queued = 0;
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let position = Point2::new(center.x + dx, center.y + dz);
                if !within_radius(position, center, radius)
                    || self.columns.contains_key(&position)
                    || self.queued_columns.contains(&position)
                {
                    continue;
                }
                self.creation_queue.push_back(position);
                self.queued_columns.insert(position);
                queued += 1;
            }
        }
        queued
    }

    /// Evicts every loaded column outside the radius and forgets queued work for them.
    fn evict_outside(
        &mut self,
        center: Point2<i32>,
        radius: i32,
        backend: &mut dyn RenderBackend,
    ) -> usize {
        let outside: Vec<Point2<i32>> = self
            .columns
            .keys()
            .copied()
            .filter(|&position| !within_radius(position, center, radius))
            .collect();

        for position in &outside {
            if let Some(mut column) = self.columns.remove(position) {
                column.release(backend);
            }
        }

        let columns = &self.columns;
        self.pending_mesh
            .retain(|task| columns.contains_key(&column_of(task.position())));

        let queued_columns = &mut self.queued_columns;
        self.creation_queue.retain(|&position| {
            let keep = within_radius(position, center, radius);
            if !keep {
                queued_columns.remove(&position);
            }
            keep
        });

        outside.len()
    }

    /// Generates up to `creation_per_tick` queued columns, nearest first.
    fn create_queued_columns(&mut self, center: Point2<i32>, radius: i32) -> usize {
        if self.creation_queue.is_empty() {
            return 0;
        }
        self.creation_queue
            .make_contiguous()
            .sort_by_key(|&position| distance2(position, center));

        let mut created = 0;
        while created < self.config.creation_per_tick {
            let Some(position) = self.creation_queue.pop_front() else {
                break;
            };
            self.queued_columns.remove(&position);
            if !within_radius(position, center, radius) || self.columns.contains_key(&position) {
                continue;
            }
            self.materialize_column(position);
            created += 1;
        }
        created
    }

    /// Generates the column at `position` and dirties its lateral neighbors, whose
    /// boundary faces toward it may now be hidden.
    fn materialize_column(&mut self, position: Point2<i32>) {
        let generation = self.next_generation();
        let column = ChunkColumn::generate(position, &self.terrain, generation);
        self.columns.insert(position, column);

        let neighbor_generation = self.next_generation();
        for side in [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ] {
            let offset = side.offset();
            let neighbor = Point2::new(position.x + offset.x, position.y + offset.z);
            if let Some(column) = self.columns.get_mut(&neighbor) {
                for chunk in column.chunks_mut() {
                    chunk.mark_dirty(neighbor_generation);
                }
            }
        }
    }

    /// Snapshots the six face-adjacent grids of the chunk at `position`.
    fn neighbor_snapshots(&self, position: Point3<i32>) -> ChunkNeighbors {
        let mut neighbors = ChunkNeighbors::new();
        for side in BlockSide::all() {
            if let Some(chunk) = self.chunk(position + side.offset()) {
                neighbors.set(side, chunk.snapshot());
            }
        }
        neighbors
    }

    /// Creates a mesh job for every dirty chunk that has none outstanding.
    ///
    /// Jobs for chunks nearer the streaming center are queued first.
    pub fn queue_dirty_chunks(&mut self) -> usize {
        let mut dirty: Vec<Point3<i32>> = self
            .columns
            .values()
            .flat_map(|column| column.chunks())
            .filter(|chunk| chunk.wants_mesh())
            .map(|chunk| chunk.position)
            .collect();

        if let Some(center) = self.streaming_center {
            dirty.sort_by_key(|&position| (distance2(column_of(position), center), position.y));
        }

        let queued = dirty.len();
        for position in dirty {
            let neighbors = self.neighbor_snapshots(position);
            let Some(chunk) = self.chunk_mut(position) else {
                continue;
            };
            let generation = chunk.begin_meshing();
            let task =
                ChunkMeshGenerationTask::new(position, generation, chunk.snapshot(), neighbors);
            self.pending_mesh.push_back(task);
        }
        queued
    }

    /// Takes the next mesh job waiting for a worker.
    pub fn pop_mesh_task(&mut self) -> Option<ChunkMeshGenerationTask> {
        self.pending_mesh.pop_front()
    }

    /// Forgets the outstanding job of a chunk whose task could not be dispatched.
    ///
    /// The chunk is still dirty, so the next dirty scan queues it again.
    pub fn cancel_mesh_task(&mut self, position: Point3<i32>) {
        if let Some(chunk) = self.chunk_mut(position) {
            chunk.cancel_meshing();
        }
    }

    /// Number of mesh jobs not yet handed to the worker pool.
    pub fn pending_mesh_tasks(&self) -> usize {
        self.pending_mesh.len()
    }

    /// Uploads every mesh waiting for upload.
    ///
    /// Chunks whose upload fails are marked dirty again and retried on a later tick.
    pub fn upload_pending(&mut self, backend: &mut dyn RenderBackend) -> UploadReport {
        let slot_vertices = self.config.max_vertices_per_chunk;
        let mut report = UploadReport::default();
        let mut failed = Vec::new();

        for column in self.columns.values_mut() {
            let (uploaded, failures) = column.upload_pending(backend, slot_vertices);
            report.uploaded += uploaded;
            failed.extend(failures.into_iter().map(|(position, _)| position));
        }

        report.failed = failed.len();
        for position in failed {
            let generation = self.next_generation();
            if let Some(chunk) = self.chunk_mut(position) {
                chunk.mark_dirty(generation);
            }
        }
        report
    }

    /// Issues the draws of every loaded column: all solid geometry, then all water.
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        for kind in MeshKind::ALL {
            for column in self.columns.values() {
                column.draw(kind, backend);
            }
        }
    }

    /// The loaded column at `position`.
    pub fn column(&self, position: Point2<i32>) -> Option<&ChunkColumn> {
        self.columns.get(&position)
    }

    /// Coordinates of every loaded column.
    pub fn column_positions(&self) -> impl Iterator<Item = Point2<i32>> + '_ {
        self.columns.keys().copied()
    }

    /// Returns `true` if the column is waiting to be generated.
    pub fn is_column_queued(&self, position: Point2<i32>) -> bool {
        self.queued_columns.contains(&position)
    }

    /// The loaded chunk at chunk coordinate `position`.
    pub fn chunk(&self, position: Point3<i32>) -> Option<&Chunk> {
        self.columns
            .get(&column_of(position))
            .and_then(|column| column.chunk(position.y))
    }

    /// Mutable access to the loaded chunk at chunk coordinate `position`.
    pub fn chunk_mut(&mut self, position: Point3<i32>) -> Option<&mut Chunk> {
        self.columns
            .get_mut(&column_of(position))
            .and_then(|column| column.chunk_mut(position.y))
    }

    /// Gets the block at a world coordinate; unloaded space is `AIR`.
    pub fn get_block(&self, position: Point3<i32>) -> BlockType {
        let (chunk, local) = split_world_position(position);
        self.chunk(chunk)
            .map(|chunk| chunk.get_block_at(local.x, local.y, local.z))
            .unwrap_or(BlockType::AIR)
    }

    /// Sets the block at a world coordinate.
    ///
    /// The owning chunk is marked dirty, and so is every face-adjacent chunk the
    /// block touches.
    ///
    /// # Returns
    /// `true` if the block changed; `false` for unloaded space or an identical block.
    pub fn set_block(&mut self, position: Point3<i32>, block_type: BlockType) -> bool {
        let (chunk_position, local) = split_world_position(position);
        let generation = self.next_generation();

        let Some(chunk) = self.chunk_mut(chunk_position) else {
            return false;
        };
        if !chunk.set_block_at(local.x, local.y, local.z, block_type, generation) {
            return false;
        }

        for side in BlockSide::all() {
            let coordinate = local[side.axis()];
            let on_boundary = if side.direction() < 0 {
                coordinate == 0
            } else {
                coordinate == CHUNK_DIMENSION - 1
            };
            if !on_boundary {
                continue;
            }
            if let Some(neighbor) = self.chunk_mut(chunk_position + side.offset()) {
                neighbor.mark_dirty(generation);
            }
        }

        self.refresh_hit();
        true
    }

    /// Casts a ray through the loaded world, stopping at the first block that is not
    /// see-through.
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast(origin, direction, max_distance, |cell| {
            !self.get_block(cell).is_see_through()
        })
    }

    fn refresh_hit(&mut self) {
        self.current_hit = self
            .viewpoint
            .and_then(|v| self.raycast(v.position, v.forward, self.config.reach));
    }

    /// The block the viewpoint is currently looking at.
    pub fn current_hit(&self) -> Option<RaycastHit> {
        self.current_hit
    }

    /// Removes the targeted block.
    ///
    /// # Returns
    /// The removed block's coordinate, or `None` if nothing is targeted.
    pub fn break_block(&mut self) -> Option<Point3<i32>> {
        let hit = self.current_hit?;
        self.set_block(hit.block, BlockType::AIR)
            .then_some(hit.block)
    }

    /// Places a block against the targeted face.
    ///
    /// # Returns
    /// The placed block's coordinate, or `None` if nothing is targeted, the target
    /// cell is outside the loaded world, or `block_type` is `AIR`.
    pub fn place_block(&mut self, block_type: BlockType) -> Option<Point3<i32>> {
        if block_type.is_air() {
            return None;
        }
        let target = self.current_hit?.adjacent()?;
        self.set_block(target, block_type).then_some(target)
    }

    /// Current world counters.
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            columns: self.columns.len(),
            creation_queue: self.creation_queue.len(),
            pending_mesh_jobs: self.pending_mesh.len(),
            ..Default::default()
        };
        for chunk in self.columns.values().flat_map(|column| column.chunks()) {
            stats.chunks += 1;
            stats.dirty_chunks += usize::from(chunk.is_dirty());
            stats.meshing_chunks += usize::from(chunk.is_meshing());
            stats.pending_uploads += usize::from(chunk.needs_upload());
            for kind in MeshKind::ALL {
                stats.drawn_vertices += chunk.draw_range(kind).vertex_count as u64;
            }
        }
        stats
    }
}

impl WorldStats {
    /// Returns `true` when nothing is queued, meshing or waiting for upload.
    pub fn is_settled(&self) -> bool {
        self.creation_queue == 0
            && self.dirty_chunks == 0
            && self.meshing_chunks == 0
            && self.pending_uploads == 0
            && self.pending_mesh_jobs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::HeadlessBackend;
    use crate::engine_state::voxels::column::COLUMN_HEIGHT;

    /// Flat grass at height 16, no water.
    fn flat_world(radius: i32, creation_per_tick: usize) -> World {
        let config = WorldConfig {
            render_radius: radius,
            creation_per_tick,
            sea_level: 0,
            ..Default::default()
        };
        let terrain = TerrainGenerator::from_oracles(
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            0.5,
            0,
        );
        World::with_terrain(config, terrain)
    }

    fn viewpoint_at(x: f32, z: f32) -> Viewpoint {
        Viewpoint::new(Point3::new(x, 30.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    fn stream_until_settled(world: &mut World, viewpoint: Viewpoint, backend: &mut HeadlessBackend) {
        for _ in 0..1000 {
            world.update_streaming(viewpoint, backend);
            if world.stats().creation_queue == 0 {
                return;
            }
        }
        panic!("streaming did not settle");
    }

    fn expected_columns(center: Point2<i32>, radius: i32) -> HashSet<Point2<i32>> {
        let mut set = HashSet::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let p = Point2::new(center.x + dx, center.y + dz);
                if within_radius(p, center, radius) {
                    set.insert(p);
                }
            }
        }
        set
    }

    #[test]
    fn split_handles_negative_coordinates() {
        assert_eq!(
            split_world_position(Point3::new(-1, 17, -16)),
            (Point3::new(-1, 1, -1), Point3::new(15, 1, 0))
        );
    }

    #[test]
    fn creation_is_bounded_per_tick() {
        let mut world = flat_world(2, 3);
        let mut backend = HeadlessBackend::new();
        let report = world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);
        assert_eq!(report.queued, 13);
        assert_eq!(report.created, 3);
        assert!(world.column(Point2::new(0, 0)).is_some());
    }

    #[test]
    fn loaded_set_matches_radius_after_settling() {
        let mut world = flat_world(3, 4);
        let mut backend = HeadlessBackend::new();
        let center = Point2::new(0, 0);
        stream_until_settled(&mut world, viewpoint_at(8.0, 8.0), &mut backend);

        let loaded: HashSet<_> = world.column_positions().collect();
        assert_eq!(loaded, expected_columns(center, 3));
        assert_eq!(world.stats().chunks, loaded.len() * COLUMN_HEIGHT as usize);

        let moved = viewpoint_at(5.0 * 16.0 + 1.0, 8.0);
        stream_until_settled(&mut world, moved, &mut backend);
        let loaded: HashSet<_> = world.column_positions().collect();
        assert_eq!(loaded, expected_columns(Point2::new(5, 0), 3));
    }

    #[test]
    fn shrinking_radius_evicts_immediately() {
        let mut world = flat_world(3, 64);
        let mut backend = HeadlessBackend::new();
        stream_until_settled(&mut world, viewpoint_at(8.0, 8.0), &mut backend);

        world.set_render_radius(1);
        let report = world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);
        assert_eq!(report.evicted, 29 - 5);
        let loaded: HashSet<_> = world.column_positions().collect();
        assert_eq!(loaded, expected_columns(Point2::new(0, 0), 1));
    }

    #[test]
    fn leaving_drops_queued_columns() {
        let mut world = flat_world(4, 1);
        let mut backend = HeadlessBackend::new();
        world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);
        assert!(world.is_column_queued(Point2::new(-4, 0)));

        world.update_streaming(viewpoint_at(100.0 * 16.0, 8.0), &mut backend);
        assert!(!world.is_column_queued(Point2::new(-4, 0)));
        assert!(world.column(Point2::new(0, 0)).is_none());
    }

    #[test]
    fn new_column_dirties_lateral_neighbors() {
        let mut world = flat_world(1, 1);
        let mut backend = HeadlessBackend::new();
        world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);

        let center = Point3::new(0, 0, 0);
        let generation = world.chunk_mut(center).unwrap().begin_meshing();
        let mesh = crate::engine_state::rendering::meshing::ChunkMesh::new();
        world.chunk_mut(center).unwrap().finish_meshing(generation, mesh);
        assert!(!world.chunk(center).unwrap().is_dirty());

        world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);
        assert!(world.chunk(center).unwrap().is_dirty());
    }

    #[test]
    fn dirty_chunks_become_jobs_once() {
        let mut world = flat_world(0, 1);
        let mut backend = HeadlessBackend::new();
        world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);

        assert_eq!(world.queue_dirty_chunks(), COLUMN_HEIGHT as usize);
        assert_eq!(world.queue_dirty_chunks(), 0);
        assert_eq!(world.pending_mesh_tasks(), COLUMN_HEIGHT as usize);
        assert_eq!(world.stats().meshing_chunks, COLUMN_HEIGHT as usize);
    }

    #[test]
    fn eviction_drops_waiting_jobs() {
        let mut world = flat_world(1, 64);
        let mut backend = HeadlessBackend::new();
        stream_until_settled(&mut world, viewpoint_at(8.0, 8.0), &mut backend);
        world.queue_dirty_chunks();

        world.update_streaming(viewpoint_at(50.0 * 16.0, 8.0), &mut backend);
        let loaded: HashSet<_> = world.column_positions().collect();
        let mut remaining = 0;
        while let Some(task) = world.pop_mesh_task() {
            assert!(loaded.contains(&column_of(task.position())));
            remaining += 1;
        }
        assert_eq!(remaining, 0);
    }

    #[test]
    fn block_access_is_total() {
        let mut world = flat_world(0, 1);
        let mut backend = HeadlessBackend::new();
        world.update_streaming(viewpoint_at(8.0, 8.0), &mut backend);

        assert_eq!(world.get_block(Point3::new(3, 15, 3)), BlockType::GRASS);
        assert_eq!(world.get_block(Point3::new(3, 16, 3)), BlockType::AIR);
        assert_eq!(world.get_block(Point3::new(3, -1, 3)), BlockType::AIR);
        assert_eq!(world.get_block(Point3::new(500, 5, 3)), BlockType::AIR);
        assert!(!world.set_block(Point3::new(500, 5, 3), BlockType::STONE));
    }

    #[test]
    fn boundary_edit_dirties_neighbor_across_columns() {
        let mut world = flat_world(1, 64);
        let mut backend = HeadlessBackend::new();
        stream_until_settled(&mut world, viewpoint_at(8.0, 8.0), &mut backend);

        for position in [Point3::new(0, 0, 0), Point3::new(1, 0, 0), Point3::new(0, 1, 0)] {
            let chunk = world.chunk_mut(position).unwrap();
            let generation = chunk.begin_meshing();
            chunk.finish_meshing(generation, Default::default());
        }

        assert!(world.set_block(Point3::new(15, 3, 7), BlockType::STONE));
        assert!(world.chunk(Point3::new(0, 0, 0)).unwrap().is_dirty());
        assert!(world.chunk(Point3::new(1, 0, 0)).unwrap().is_dirty());
        assert!(!world.chunk(Point3::new(0, 1, 0)).unwrap().is_dirty());
    }

    #[test]
    fn break_and_place_follow_the_ray() {
        let mut world = flat_world(0, 1);
        let mut backend = HeadlessBackend::new();
        let viewpoint = Viewpoint::new(Point3::new(8.5, 20.5, 8.5), Vector3::new(0.0, -1.0, 0.0));
        world.update_streaming(viewpoint, &mut backend);

        let hit = world.current_hit().unwrap();
        assert_eq!(hit.block, Point3::new(8, 15, 8));

        assert_eq!(world.break_block(), Some(Point3::new(8, 15, 8)));
        assert_eq!(world.get_block(Point3::new(8, 15, 8)), BlockType::AIR);
        assert_eq!(world.current_hit().unwrap().block, Point3::new(8, 14, 8));

        assert_eq!(world.place_block(BlockType::SAND), Some(Point3::new(8, 15, 8)));
        assert_eq!(world.get_block(Point3::new(8, 15, 8)), BlockType::SAND);
        let again = world.raycast(viewpoint.position, viewpoint.forward, 8.0).unwrap();
        assert_eq!(again.block, Point3::new(8, 15, 8));
        assert_eq!(world.place_block(BlockType::AIR), None);
    }

    #[test]
    fn nothing_targeted_out_of_reach() {
        let mut world = flat_world(0, 1);
        let mut backend = HeadlessBackend::new();
        let viewpoint = Viewpoint::new(Point3::new(8.5, 60.0, 8.5), Vector3::new(0.0, -1.0, 0.0));
        world.update_streaming(viewpoint, &mut backend);
        assert!(world.current_hit().is_none());
        assert_eq!(world.break_block(), None);
        assert_eq!(world.place_block(BlockType::STONE), None);
    }

    #[test]
    fn water_does_not_stop_the_ray() {
        let config = WorldConfig {
            render_radius: 0,
            sea_level: 20,
            ..Default::default()
        };
        let terrain = TerrainGenerator::from_oracles(
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            0.5,
            20,
        );
        let mut world = World::with_terrain(config, terrain);
        let mut backend = HeadlessBackend::new();
        let viewpoint = Viewpoint::new(Point3::new(8.5, 22.5, 8.5), Vector3::new(0.0, -1.0, 0.0));
        world.update_streaming(viewpoint, &mut backend);

        assert_eq!(world.get_block(Point3::new(8, 18, 8)), BlockType::WATER);
        assert_eq!(world.current_hit().unwrap().block, Point3::new(8, 15, 8));
    }
}
