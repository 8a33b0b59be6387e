//! # Configuration Module
//!
//! Runtime settings of the world streamer. Every field has a default, so a config
//! file only needs to name the values it changes:
//!
//! ```json
//! { "render_radius": 12, "noise": { "seed": 7 } }
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rendering::meshing::MAX_CHUNK_VERTICES;
use super::task_management::default_worker_count;

/// Errors raised while loading or validating a [`WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings of the three noise fields driving terrain generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Seed of the biome field; the terrain and block fields use the next two seeds
    pub seed: u32,
    pub biome_frequency: f64,
    pub terrain_frequency: f64,
    pub octaves: usize,
    pub block_frequency: f64,
    /// Block-field value at and above which the ground is stone
    pub stone_threshold: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        NoiseSettings {
            seed: 0,
            biome_frequency: 0.002,
            terrain_frequency: 0.01,
            octaves: 4,
            block_frequency: 0.05,
            stone_threshold: 0.5,
        }
    }
}

/// Settings of the world streamer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Streaming radius in columns
    pub render_radius: i32,
    /// Maximum number of columns generated per tick
    pub creation_per_tick: usize,
    /// Number of mesh workers; `None` picks one per spare core, at least six
    pub worker_count: Option<usize>,
    /// Maximum distance of the targeting ray
    pub reach: f32,
    /// World height below which open space above the ground is filled with water
    pub sea_level: i32,
    /// Vertex capacity of a chunk's slot in its column buffers; never below
    /// [`MAX_CHUNK_VERTICES`], so every chunk fits its slot
    pub max_vertices_per_chunk: usize,
    pub noise: NoiseSettings,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            render_radius: 8,
            creation_per_tick: 4,
            worker_count: None,
            reach: 8.0,
            sea_level: 17,
            max_vertices_per_chunk: MAX_CHUNK_VERTICES,
            noise: NoiseSettings::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_radius < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_radius must not be negative, got {}",
                self.render_radius
            )));
        }
        if self.creation_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "creation_per_tick must be at least 1".to_string(),
            ));
        }
        if self.worker_count == Some(0) {
            return Err(ConfigError::Invalid(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if !(self.reach.is_finite() && self.reach >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "reach must be a finite non-negative distance, got {}",
                self.reach
            )));
        }
        if self.max_vertices_per_chunk < MAX_CHUNK_VERTICES {
            return Err(ConfigError::Invalid(format!(
                "max_vertices_per_chunk must be at least {}, got {}",
                MAX_CHUNK_VERTICES, self.max_vertices_per_chunk
            )));
        }

        let noise = &self.noise;
        for (name, frequency) in [
            ("biome_frequency", noise.biome_frequency),
            ("terrain_frequency", noise.terrain_frequency),
            ("block_frequency", noise.block_frequency),
        ] {
            if !(frequency.is_finite() && frequency > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "noise.{name} must be positive, got {frequency}"
                )));
            }
        }
        if noise.octaves == 0 {
            return Err(ConfigError::Invalid(
                "noise.octaves must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The number of mesh workers to start.
    pub fn resolved_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(default_worker_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.render_radius, 8);
        assert_eq!(config.creation_per_tick, 4);
        assert_eq!(config.max_vertices_per_chunk, 73728);
        assert!(config.resolved_worker_count() >= 6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            WorldConfig::from_json_str(r#"{ "render_radius": 3, "noise": { "seed": 9 } }"#)
                .unwrap();
        assert_eq!(config.render_radius, 3);
        assert_eq!(config.noise.seed, 9);
        assert_eq!(config.noise.octaves, 4);
        assert_eq!(config.sea_level, 17);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for json in [
            r#"{ "render_radius": -1 }"#,
            r#"{ "creation_per_tick": 0 }"#,
            r#"{ "worker_count": 0 }"#,
            r#"{ "max_vertices_per_chunk": 0 }"#,
            r#"{ "max_vertices_per_chunk": 32768 }"#,
            r#"{ "noise": { "octaves": 0 } }"#,
            r#"{ "noise": { "terrain_frequency": 0.0 } }"#,
        ] {
            assert!(
                matches!(WorldConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} was accepted"
            );
        }
    }

    #[test]
    fn reports_parse_errors() {
        assert!(matches!(
            WorldConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            WorldConfig::load("/nonexistent/voxel-streamer.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
