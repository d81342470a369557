//! # World Constants
//!
//! Sizes and scales shared by the generator, the texture builder, the
//! streaming manager and anything on the far side of the wire.
//!
//! **CRITICAL:** Previously generated chunk data carries positional
//! assumptions derived from these values. Bump [`CONTRACT_VERSION`] whenever
//! a default changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Version of the constants contract.
pub const CONTRACT_VERSION: u32 = 1;

/// Edge length of one tile in pixels.
pub const TILE_SIZE: u32 = 64;

/// Tiles along one side of a chunk.
pub const TILES_PER_CHUNK_SIDE: u32 = 16;

/// Edge length of one chunk in pixels.
pub const CHUNK_PIXEL_SIZE: u32 = TILE_SIZE * TILES_PER_CHUNK_SIDE;

/// Global pixel coordinates are divided by this before sampling noise.
pub const NOISE_DIVISOR: f64 = 2048.0;

/// Chebyshev radius (in chunks) kept resident around the observer.
pub const DEFAULT_LOAD_RADIUS: u32 = 2;

/// Errors for inconsistent constant sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstantsError {
    /// Tile size of zero.
    #[error("tile size must be non-zero")]
    ZeroTileSize,

    /// Zero tiles per chunk side.
    #[error("tiles per chunk side must be non-zero")]
    ZeroTilesPerSide,

    /// Chunk pixel size does not fit the coordinate space.
    #[error("chunk pixel size {tile_size}x{tiles_per_side} overflows u32")]
    ChunkTooLarge {
        /// Tile size.
        tile_size: u32,
        /// Tiles per side.
        tiles_per_side: u32,
    },

    /// Non-positive or non-finite noise divisor.
    #[error("noise divisor must be finite and positive, got {0}")]
    BadNoiseDivisor(f64),
}

/// The full set of shared constants.
///
/// Passed by value into every component that turns coordinates into pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConstants {
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
    /// Tiles along one side of a chunk.
    pub tiles_per_chunk_side: u32,
    /// Divisor applied to global pixel coordinates before sampling noise.
    pub noise_divisor: f64,
    /// Default Chebyshev load radius in chunks.
    pub default_load_radius: u32,
}

impl WorldConstants {
    /// The production contract.
    pub const DEFAULT: Self = Self {
        tile_size: TILE_SIZE,
        tiles_per_chunk_side: TILES_PER_CHUNK_SIDE,
        noise_divisor: NOISE_DIVISOR,
        default_load_radius: DEFAULT_LOAD_RADIUS,
    };

    /// Creates a constant set with the default divisor and radius.
    #[must_use]
    pub const fn new(tile_size: u32, tiles_per_chunk_side: u32) -> Self {
        Self {
            tile_size,
            tiles_per_chunk_side,
            noise_divisor: NOISE_DIVISOR,
            default_load_radius: DEFAULT_LOAD_RADIUS,
        }
    }

    /// Edge length of one chunk in pixels.
    #[inline]
    #[must_use]
    pub const fn chunk_pixel_size(&self) -> u32 {
        self.tile_size * self.tiles_per_chunk_side
    }

    /// Number of tiles in one chunk.
    #[inline]
    #[must_use]
    pub const fn tiles_per_chunk(&self) -> usize {
        (self.tiles_per_chunk_side as usize) * (self.tiles_per_chunk_side as usize)
    }

    /// Checks the set is usable.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConstantsError> {
        if self.tile_size == 0 {
            return Err(ConstantsError::ZeroTileSize);
        }
        if self.tiles_per_chunk_side == 0 {
            return Err(ConstantsError::ZeroTilesPerSide);
        }
        if self.tile_size.checked_mul(self.tiles_per_chunk_side).is_none() {
            return Err(ConstantsError::ChunkTooLarge {
                tile_size: self.tile_size,
                tiles_per_side: self.tiles_per_chunk_side,
            });
        }
        if !self.noise_divisor.is_finite() || self.noise_divisor <= 0.0 {
            return Err(ConstantsError::BadNoiseDivisor(self.noise_divisor));
        }
        Ok(())
    }
}

impl Default for WorldConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}
