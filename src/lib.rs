#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streamer
//!
//! The core of a voxel world renderer: procedural terrain in 16³ chunks, streamed in
//! columns around a moving viewpoint, turned into compact greedy meshes on a worker
//! pool and uploaded through a small rendering backend interface.
//!
//! ## Key Modules
//!
//! * `engine_state` - The per-tick coordinator and every subsystem below it
//! * `engine_state::voxels` - Blocks, chunks, columns, terrain, raycasting and the world
//! * `engine_state::rendering` - Vertex format, greedy mesher, backend interface
//! * `engine_state::task_management` - The mesh worker pool
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::{Point3, Vector3};
//! use voxel_streamer::{EngineState, HeadlessBackend, Viewpoint, WorldConfig};
//!
//! let mut engine = EngineState::new(WorldConfig::default(), HeadlessBackend::new())?;
//! let viewpoint = Viewpoint::new(Point3::new(0.0, 80.0, 0.0), Vector3::new(0.0, -1.0, 1.0));
//! engine.settle(viewpoint, 10_000);
//! engine.render();
//! # Ok::<(), voxel_streamer::EngineError>(())
//! ```
//!
//! The binary runs the same loop against a wgpu device when one is available:
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

use cgmath::{InnerSpace, Point3, Vector3};
use log::info;

pub mod engine_state;

pub use engine_state::{
    buffer_state::BufferState,
    config::{ConfigError, NoiseSettings, WorldConfig},
    rendering::{
        BackendError, BufferHandle, DrawCall, HeadlessBackend, PackedVertex, RenderBackend,
    },
    viewpoint::Viewpoint,
    voxels::{
        block::{BlockSide, BlockType},
        raycast::RaycastHit,
        world::{World, WorldStats},
    },
    EngineError, EngineState, TickReport,
};

/// Number of ticks the demo flight lasts.
const FLIGHT_TICKS: usize = 600;

/// Distance the demo viewpoint moves per tick.
const FLIGHT_SPEED: f32 = 0.5;

/// Upper bound on ticks spent waiting for the world to settle.
const MAX_SETTLE_TICKS: usize = 10_000;

/// Runs the demo: streams the world along a fixed flight path, edits one block and
/// logs world statistics.
///
/// The first command line argument, if any, is the path of a JSON config file.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    match BufferState::request_headless() {
        Some(backend) => {
            let mut engine = EngineState::new(config, backend)?;
            fly(&mut engine);
            info!(
                "Total allocated memory: {}",
                engine.backend().get_total_allocated_memory()
            );
            info!(
                "Total used memory: {}",
                engine.backend().get_total_used_memory()
            );
        }
        None => {
            info!("Falling back to the headless backend");
            let mut engine = EngineState::new(config, HeadlessBackend::new())?;
            fly(&mut engine);
            info!(
                "Total allocated memory: {}",
                engine.backend().allocated_bytes()
            );
        }
    }
    Ok(())
}

/// Flies the viewpoint along a straight line, then breaks and replaces the block
/// under its feet.
fn fly<B: RenderBackend>(engine: &mut EngineState<B>) {
    let forward = Vector3::new(1.0, -0.2, 0.3).normalize();
    let mut position = Point3::new(0.0, 80.0, 0.0);

    match engine.settle(Viewpoint::new(position, forward), MAX_SETTLE_TICKS) {
        Some(ticks) => info!("Initial area ready after {} ticks", ticks),
        None => info!("Initial area still loading after {} ticks", MAX_SETTLE_TICKS),
    }

    for tick in 0..FLIGHT_TICKS {
        position += Vector3::new(forward.x, 0.0, forward.z) * FLIGHT_SPEED;
        engine.update(Viewpoint::new(position, forward));
        engine.render();
        if tick % 60 == 0 {
            info!("Tick {}: {:?}", engine.ticks(), engine.stats());
        }
    }

    let (wx, wz) = (position.x.floor() as i32, position.z.floor() as i32);
    let ground = engine.world().terrain().surface_height(wx, wz);
    let eye = Point3::new(wx as f32 + 0.5, ground as f32 + 3.5, wz as f32 + 0.5);
    let down = Viewpoint::new(eye, Vector3::new(0.0, -1.0, 0.0));
    engine.settle(down, MAX_SETTLE_TICKS);

    if let Some(removed) = engine.break_block() {
        info!("Removed block at {:?}", removed);
        engine.update(down);
        if let Some(placed) = engine.place_block(BlockType::SAND) {
            info!("Placed sand at {:?}", placed);
        }
    }
    engine.settle(down, MAX_SETTLE_TICKS);
    engine.render();
    info!("Final: {:?}", engine.stats());
}
