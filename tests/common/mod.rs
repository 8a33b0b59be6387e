#![allow(dead_code)]

use cgmath::{Point3, Vector3};
use voxel_streamer::engine_state::task_management::TaskManager;
use voxel_streamer::engine_state::voxels::terrain::TerrainGenerator;
use voxel_streamer::{EngineState, HeadlessBackend, Viewpoint, World, WorldConfig};

/// Height of the flat test terrain's surface.
pub const GROUND: i32 = 16;

/// Grass everywhere below `GROUND`, air above.
pub fn flat_terrain() -> TerrainGenerator {
    TerrainGenerator::from_oracles(
        Box::new(|_: f64, _: f64| -1.0),
        Box::new(|_: f64, _: f64| -1.0),
        Box::new(|_: f64, _: f64| -1.0),
        0.5,
        0,
    )
}

pub fn config(radius: i32) -> WorldConfig {
    WorldConfig {
        render_radius: radius,
        creation_per_tick: 4,
        worker_count: Some(2),
        sea_level: 0,
        ..Default::default()
    }
}

pub fn flat_world(radius: i32) -> World {
    World::with_terrain(config(radius), flat_terrain())
}

pub fn flat_engine(radius: i32) -> EngineState<HeadlessBackend> {
    let task_manager = TaskManager::new(2).unwrap();
    EngineState::with_parts(flat_world(radius), task_manager, HeadlessBackend::new())
}

/// A viewpoint standing above column `(cx, cz)` and looking straight down.
pub fn looking_down(cx: i32, cz: i32) -> Viewpoint {
    Viewpoint::new(
        Point3::new(cx as f32 * 16.0 + 8.5, GROUND as f32 + 4.5, cz as f32 * 16.0 + 8.5),
        Vector3::new(0.0, -1.0, 0.0),
    )
}
