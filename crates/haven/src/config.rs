//! # World Configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! config:
//!
//! ```toml
//! seed = "haven-world-seed"
//! generation = "biome"            # or "grayscale"
//!
//! [constants]
//! tile_size = 64
//! tiles_per_chunk_side = 16
//! noise_divisor = 2048.0
//! default_load_radius = 2
//!
//! [streaming]
//! load_radius = 2                 # defaults to constants.default_load_radius
//! render_mode = "local_composite" # or "remote_texture"
//! texture_pool_capacity = 32
//! sprite_pool_capacity = 256      # defaults to one chunk's tile count
//! position_queue = 64
//! ```

use std::fs;
use std::path::Path;

use haven_procedural::{GenerationMode, WorldSeed};
use haven_shared::WorldConstants;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest accepted load radius, a window of 129 x 129 chunks.
pub const MAX_LOAD_RADIUS: u32 = 64;

/// How chunk backgrounds are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Composite tiles locally.
    #[default]
    LocalComposite,
    /// Use pre-rendered textures when the payload offers one, compositing
    /// locally if the fetch fails.
    RemoteTexture,
}

/// Streaming manager settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chebyshev load radius in chunks.
    pub load_radius: Option<u32>,
    /// Background source.
    pub render_mode: RenderMode,
    /// Bound on idle chunk textures.
    pub texture_pool_capacity: usize,
    /// Bound on idle tile sprites.
    pub sprite_pool_capacity: Option<usize>,
    /// Capacity of the observer position queue.
    pub position_queue: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            load_radius: None,
            render_mode: RenderMode::LocalComposite,
            texture_pool_capacity: 32,
            sprite_pool_capacity: None,
            position_queue: 64,
        }
    }
}

/// Top-level configuration of one world session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World name, hashed into the terrain seed.
    pub seed: String,
    /// Generated tile flavour.
    pub generation: GenerationMode,
    /// Shared sizes. Must match every other party serving this world.
    pub constants: WorldConstants,
    /// Streaming settings.
    pub streaming: StreamingConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: "haven-world-seed".to_owned(),
            generation: GenerationMode::default(),
            constants: WorldConstants::DEFAULT,
            streaming: StreamingConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, or the first
    /// validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`WorldConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks sizes and capacities.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed.is_empty() {
            return Err(ConfigError::EmptySeed);
        }
        self.constants.validate()?;
        if self.streaming.texture_pool_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("texture_pool_capacity"));
        }
        if self.streaming.sprite_pool_capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity("sprite_pool_capacity"));
        }
        if self.streaming.position_queue == 0 {
            return Err(ConfigError::ZeroCapacity("position_queue"));
        }
        let radius = self.load_radius();
        if radius > MAX_LOAD_RADIUS {
            return Err(ConfigError::RadiusTooLarge {
                radius,
                max: MAX_LOAD_RADIUS,
            });
        }
        Ok(())
    }

    /// Terrain seed derived from the world name.
    #[must_use]
    pub fn world_seed(&self) -> WorldSeed {
        WorldSeed::from_name(&self.seed)
    }

    /// Effective load radius.
    #[must_use]
    pub fn load_radius(&self) -> u32 {
        self.streaming
            .load_radius
            .unwrap_or(self.constants.default_load_radius)
    }

    /// Effective idle sprite bound.
    #[must_use]
    pub fn sprite_pool_capacity(&self) -> usize {
        self.streaming
            .sprite_pool_capacity
            .unwrap_or_else(|| self.constants.tiles_per_chunk())
    }
}
