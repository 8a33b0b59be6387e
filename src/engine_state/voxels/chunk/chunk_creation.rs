//! # Chunk Creation Module
//!
//! Builds chunk block grids. Terrain chunks are filled from a column's height map;
//! the remaining constructors produce simple patterns used when exercising the
//! mesher and the world in isolation.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockType;
use crate::engine_state::voxels::terrain::{HeightMap, TerrainGenerator};

use super::{Chunk, ChunkBlocks, CHUNK_DIMENSION};

impl ChunkBlocks {
    /// Fills the grid of the chunk at `position` from its column's surface data.
    ///
    /// Cells below the surface take the column's surface block, cells between the
    /// surface and sea level become water, everything else is air.
    pub fn from_height_map(
        position: Point3<i32>,
        height_map: &HeightMap,
        terrain: &TerrainGenerator,
    ) -> Self {
        let base_y = position.y * CHUNK_DIMENSION;
        if height_map.max_surface().max(terrain.sea_level()) <= base_y {
            return ChunkBlocks::empty();
        }

        let mut blocks = ChunkBlocks::empty();
        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let surface = height_map.surface(x, z);
                let surface_block = height_map.surface_block(x, z);
                for y in 0..CHUNK_DIMENSION {
                    let block_type = terrain.block_at(base_y + y, surface, surface_block);
                    if !block_type.is_air() {
                        blocks.set(x, y, z, block_type);
                    }
                }
            }
        }
        blocks
    }

    /// Alternating solid and air cells, the worst case for face count.
    pub fn checkerboard(block_type: BlockType) -> Self {
        let mut blocks = ChunkBlocks::empty();
        for x in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for z in 0..CHUNK_DIMENSION {
                    if (x + y + z) % 2 == 0 {
                        blocks.set(x, y, z, block_type);
                    }
                }
            }
        }
        blocks
    }
}

impl Chunk {
    /// Generates the terrain chunk at `position` from its column's surface data.
    pub fn generate(
        position: Point3<i32>,
        height_map: &HeightMap,
        terrain: &TerrainGenerator,
        generation: u64,
    ) -> Self {
        Chunk::with_blocks(
            position,
            ChunkBlocks::from_height_map(position, height_map, terrain),
            generation,
        )
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    fn flat_terrain(sea_level: i32) -> TerrainGenerator {
        TerrainGenerator::from_oracles(
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            Box::new(|_: f64, _: f64| -1.0),
            0.5,
            sea_level,
        )
    }

    #[test]
    fn flat_terrain_fills_below_surface() {
        let terrain = flat_terrain(0);
        let height_map = terrain.height_map(Point2::new(0, 0));

        let bottom = ChunkBlocks::from_height_map(Point3::new(0, 0, 0), &height_map, &terrain);
        assert_eq!(bottom, ChunkBlocks::filled(BlockType::GRASS));

        let above = ChunkBlocks::from_height_map(Point3::new(0, 1, 0), &height_map, &terrain);
        assert!(above.is_empty());
    }

    #[test]
    fn water_fills_up_to_sea_level() {
        let terrain = flat_terrain(20);
        let height_map = terrain.height_map(Point2::new(2, -1));
        let chunk = Chunk::generate(Point3::new(2, 1, -1), &height_map, &terrain, 0);

        assert_eq!(chunk.get_block_at(7, 0, 7), BlockType::WATER);
        assert_eq!(chunk.get_block_at(7, 3, 7), BlockType::WATER);
        assert_eq!(chunk.get_block_at(7, 4, 7), BlockType::AIR);
    }

    #[test]
    fn generation_is_deterministic() {
        let settings = crate::engine_state::config::NoiseSettings::default();
        let position = Point3::new(5, 1, -2);

        let first = {
            let terrain = TerrainGenerator::new(&settings, 17);
            let height_map = terrain.height_map(Point2::new(position.x, position.z));
            ChunkBlocks::from_height_map(position, &height_map, &terrain)
        };
        let second = {
            let terrain = TerrainGenerator::new(&settings, 17);
            let height_map = terrain.height_map(Point2::new(position.x, position.z));
            ChunkBlocks::from_height_map(position, &height_map, &terrain)
        };
        assert_eq!(first, second);
    }

    #[test]
    fn checkerboard_has_half_the_cells() {
        let blocks = ChunkBlocks::checkerboard(BlockType::STONE);
        assert_eq!(blocks.solid_blocks().count(), 2048);
    }
}
