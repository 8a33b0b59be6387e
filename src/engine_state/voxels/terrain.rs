//! # Terrain Module
//!
//! Deterministic terrain generation. A column's surface height and surface block are
//! pure functions of the noise fields and the world `(x, z)` coordinate, so the same
//! seed always produces the same world and neighboring columns line up seamlessly.
//!
//! Three independent 2D noise fields drive generation:
//! * a **biome** selector blending flat plains into tall mountains
//! * a **terrain** field providing the height detail
//! * a **block** selector choosing between stone and grass per column

use cgmath::Point2;
use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};

use crate::engine_state::config::NoiseSettings;

use super::block::BlockType;
use super::chunk::{CHUNK_DIMENSION, CHUNK_PLANE_SIZE};
use super::column::COLUMN_HEIGHT;

/// Base height of both the plains and the mountain profile.
const BASE_HEIGHT: f64 = 16.0;
/// Extra height the plains profile can add on top of the base.
const PLAINS_AMPLITUDE: f64 = 2.0;
/// Extra height the mountain profile can add on top of the base.
const MOUNTAIN_AMPLITUDE: f64 = 96.0;
/// Exponent sharpening mountain peaks.
const MOUNTAIN_EXPONENT: f64 = 1.3;
/// Sampling scale of the plains profile.
const PLAINS_SCALE: f64 = 0.5;
/// Sampling scale of the mountain profile.
const MOUNTAIN_SCALE: f64 = 1.01;

/// A deterministic 2D noise source returning values in `[-1, 1]`.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait NoiseOracle: Send + Sync {
    /// Samples the field at `(x, z)`.
    fn sample_2d(&self, x: f64, z: f64) -> f64;
}

impl<F> NoiseOracle for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

/// Fractal OpenSimplex noise, the default oracle.
pub struct FractalNoise {
    fbm: Fbm<OpenSimplex>,
}

impl FractalNoise {
    /// Creates a fractal noise field.
    ///
    /// # Arguments
    /// * `seed` - Seed of the underlying permutation tables
    /// * `frequency` - Frequency of the first octave
    /// * `octaves` - Number of octaves summed together
    pub fn new(seed: u32, frequency: f64, octaves: usize) -> Self {
        let fbm = Fbm::<OpenSimplex>::new(seed)
            .set_frequency(frequency)
            .set_octaves(octaves);
        FractalNoise { fbm }
    }
}

impl NoiseOracle for FractalNoise {
    fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.fbm.get([x, z]).clamp(-1.0, 1.0)
    }
}

/// Per-column surface data of one chunk column, indexed `x * 16 + z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightMap {
    surface: [i32; CHUNK_PLANE_SIZE as usize],
    surface_block: [BlockType; CHUNK_PLANE_SIZE as usize],
}

impl HeightMap {
    #[inline]
    fn index(x: i32, z: i32) -> usize {
        (x * CHUNK_DIMENSION + z) as usize
    }

    /// World height of the first air cell above the ground at local `(x, z)`.
    pub fn surface(&self, x: i32, z: i32) -> i32 {
        self.surface[Self::index(x, z)]
    }

    /// Block type filling the ground at local `(x, z)`.
    pub fn surface_block(&self, x: i32, z: i32) -> BlockType {
        self.surface_block[Self::index(x, z)]
    }

    /// Highest surface in the column.
    pub fn max_surface(&self) -> i32 {
        self.surface.iter().copied().max().unwrap_or(0)
    }
}

/// Generates terrain from a set of noise oracles.
pub struct TerrainGenerator {
    biome: Box<dyn NoiseOracle>,
    terrain: Box<dyn NoiseOracle>,
    block: Box<dyn NoiseOracle>,
    stone_threshold: f64,
    sea_level: i32,
}

impl TerrainGenerator {
    /// Builds the default fractal-noise generator from configuration.
    ///
    /// The three fields use consecutive seeds starting at `settings.seed`.
    pub fn new(settings: &NoiseSettings, sea_level: i32) -> Self {
        let seed = settings.seed;
        Self::from_oracles(
            Box::new(FractalNoise::new(seed, settings.biome_frequency, settings.octaves)),
            Box::new(FractalNoise::new(
                seed.wrapping_add(1),
                settings.terrain_frequency,
                settings.octaves,
            )),
            Box::new(FractalNoise::new(
                seed.wrapping_add(2),
                settings.block_frequency,
                settings.octaves,
            )),
            settings.stone_threshold,
            sea_level,
        )
    }

    /// Builds a generator from arbitrary oracles.
    pub fn from_oracles(
        biome: Box<dyn NoiseOracle>,
        terrain: Box<dyn NoiseOracle>,
        block: Box<dyn NoiseOracle>,
        stone_threshold: f64,
        sea_level: i32,
    ) -> Self {
        TerrainGenerator {
            biome,
            terrain,
            block,
            stone_threshold,
            sea_level,
        }
    }

    /// World height below which air above the surface becomes water.
    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Height of the terrain surface at world column `(wx, wz)`.
    ///
    /// Every cell with world `y` below this value is ground.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let (x, z) = (wx as f64, wz as f64);

        let s = (self.biome.sample_2d(x, z) + 1.0) / 2.0;
        let plains = BASE_HEIGHT
            + PLAINS_AMPLITUDE * (self.terrain.sample_2d(x * PLAINS_SCALE, z * PLAINS_SCALE) + 1.0)
                / 2.0;
        let mountains = BASE_HEIGHT
            + MOUNTAIN_AMPLITUDE
                * ((self.terrain.sample_2d(x * MOUNTAIN_SCALE, z * MOUNTAIN_SCALE) + 1.0) / 2.0)
                    .powf(MOUNTAIN_EXPONENT);

        let blend = s * s * (3.0 - 2.0 * s);
        let height = (plains + (mountains - plains) * blend).floor() as i32;
        height.clamp(0, COLUMN_HEIGHT * CHUNK_DIMENSION)
    }

    /// Ground block type at world column `(wx, wz)`.
    pub fn surface_block(&self, wx: i32, wz: i32) -> BlockType {
        if self.block.sample_2d(wx as f64, wz as f64) >= self.stone_threshold {
            BlockType::STONE
        } else {
            BlockType::GRASS
        }
    }

    /// Computes the surface data of the chunk column at `position`.
    pub fn height_map(&self, position: Point2<i32>) -> HeightMap {
        let mut surface = [0; CHUNK_PLANE_SIZE as usize];
        let mut surface_block = [BlockType::AIR; CHUNK_PLANE_SIZE as usize];

        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let wx = position.x * CHUNK_DIMENSION + x;
                let wz = position.y * CHUNK_DIMENSION + z;
                let index = HeightMap::index(x, z);
                surface[index] = self.surface_height(wx, wz);
                surface_block[index] = self.surface_block(wx, wz);
            }
        }

        HeightMap {
            surface,
            surface_block,
        }
    }

    /// Block at world height `wy` of a column with the given surface data.
    #[inline]
    pub fn block_at(&self, wy: i32, surface: i32, surface_block: BlockType) -> BlockType {
        if wy < surface {
            surface_block
        } else if wy < self.sea_level {
            BlockType::WATER
        } else {
            BlockType::AIR
        }
    }
}
