//! # Chunk Generator
//!
//! Turns `(seed, chunkX, chunkY)` into a row-major tile list.
//!
//! ## Seams
//!
//! Every tile samples noise at its global pixel position divided by the
//! shared noise divisor, so two adjacent chunks agree along their border
//! only when both sides use the same [`WorldConstants`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use haven_shared::{Biome, ChunkCoord, Color, Tile, WorldConstants};

use crate::climate::BiomeClassifier;
use crate::noise::{SimplexNoise, WorldSeed};
use crate::record::ChunkRecord;

/// What a generated tile carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// A frame from the classified biome's sprite sheet.
    #[default]
    Biome,
    /// A quantized grey level straight from the elevation sample.
    Grayscale,
}

/// Anything that can produce a chunk record from a coordinate.
///
/// Implementations must be pure: the same coordinate always yields the same
/// tiles.
pub trait TerrainGenerator: Send + Sync {
    /// Generates the chunk at `coord`.
    fn generate(&self, coord: ChunkCoord) -> ChunkRecord;
}

/// Seeded noise terrain generator.
pub struct ChunkGenerator {
    /// World seed.
    seed: WorldSeed,
    /// Biome model; also owns the noise source.
    classifier: BiomeClassifier,
    /// Shared sizes.
    constants: WorldConstants,
    /// Output flavour.
    mode: GenerationMode,
}

impl ChunkGenerator {
    /// Creates a generator. The permutation table is built once, here.
    #[must_use]
    pub fn new(seed: WorldSeed, constants: WorldConstants, mode: GenerationMode) -> Self {
        Self {
            seed,
            classifier: BiomeClassifier::new(SimplexNoise::new(seed)),
            constants,
            mode,
        }
    }

    /// Creates a generator from a world name.
    #[must_use]
    pub fn from_name(name: &str, constants: WorldConstants, mode: GenerationMode) -> Self {
        Self::new(WorldSeed::from_name(name), constants, mode)
    }

    /// The seed in use.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The constants in use.
    #[must_use]
    pub const fn constants(&self) -> &WorldConstants {
        &self.constants
    }

    /// The output mode.
    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Noise-space sample point of tile `(i, j)` in chunk `coord`.
    fn sample_point(&self, coord: ChunkCoord, i: u32, j: u32) -> (f64, f64) {
        let chunk = i64::from(self.constants.chunk_pixel_size());
        let tile = i64::from(self.constants.tile_size);
        let gx = i64::from(coord.x) * chunk + i64::from(i) * tile;
        let gy = i64::from(coord.y) * chunk + i64::from(j) * tile;
        let divisor = self.constants.noise_divisor;
        (gx as f64 / divisor, gy as f64 / divisor)
    }

    /// Generates the tiles of one chunk, row-major.
    #[must_use]
    pub fn tiles(&self, coord: ChunkCoord) -> Vec<Tile> {
        let side = self.constants.tiles_per_chunk_side;
        let tile_size = self.constants.tile_size;
        let mut tiles = Vec::with_capacity(self.constants.tiles_per_chunk());

        for j in 0..side {
            for i in 0..side {
                let (nx, ny) = self.sample_point(coord, i, j);
                let (x, y) = (i * tile_size, j * tile_size);
                let tile = match self.mode {
                    GenerationMode::Grayscale => {
                        let sample = self.classifier.noise().sample_unit(nx, ny);
                        Tile::colored(x, y, Color::gray(quantize(sample)))
                    }
                    GenerationMode::Biome => {
                        let biome = self.classifier.classify(nx, ny);
                        let frame = frame_index(biome, self.classifier.detail(nx, ny));
                        Tile::sprite(x, y, biome, frame)
                    }
                };
                tiles.push(tile);
            }
        }

        tiles
    }
}

impl TerrainGenerator for ChunkGenerator {
    fn generate(&self, coord: ChunkCoord) -> ChunkRecord {
        trace!(%coord, mode = ?self.mode, "generating chunk");
        ChunkRecord::new(coord, self.tiles(coord))
    }
}

/// Maps a `[0, 1)` sample onto an 8-bit level.
fn quantize(sample: f64) -> u8 {
    (sample * 256.0).floor().clamp(0.0, 255.0) as u8
}

/// Picks a sheet frame from a `[0, 1)` detail sample.
fn frame_index(biome: Biome, detail: f64) -> u16 {
    let frames = biome.sheet().frame_count();
    let index = (detail * frames as f64).floor() as usize;
    index.min(frames.saturating_sub(1)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_shared::TileFill;

    fn small() -> WorldConstants {
        WorldConstants::new(8, 4)
    }

    #[test]
    fn test_quantize_bounds() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 128);
        assert_eq!(quantize(1.0 - f64::EPSILON), 255);
    }

    #[test]
    fn test_frame_index_stays_on_sheet() {
        for biome in Biome::ALL {
            let frames = biome.sheet().frame_count();
            assert_eq!(frame_index(biome, 0.0), 0);
            assert_eq!(usize::from(frame_index(biome, 1.0 - f64::EPSILON)), frames - 1);
        }
    }

    #[test]
    fn test_row_major_layout() {
        let gen = ChunkGenerator::new(WorldSeed::new(1), small(), GenerationMode::Grayscale);
        let tiles = gen.tiles(ChunkCoord::new(0, 0));
        assert_eq!(tiles.len(), 16);
        assert_eq!((tiles[0].x, tiles[0].y), (0, 0));
        assert_eq!((tiles[1].x, tiles[1].y), (8, 0));
        assert_eq!((tiles[4].x, tiles[4].y), (0, 8));
        assert_eq!((tiles[15].x, tiles[15].y), (24, 24));
    }

    #[test]
    fn test_sample_point_uses_global_pixels() {
        let gen = ChunkGenerator::new(WorldSeed::new(1), small(), GenerationMode::Grayscale);
        // chunk (-1, 2) with 32px chunks: origin (-32, 64)
        let (nx, ny) = gen.sample_point(ChunkCoord::new(-1, 2), 1, 3);
        assert_eq!(nx, -24.0 / 2048.0);
        assert_eq!(ny, 88.0 / 2048.0);
    }

    #[test]
    fn test_modes_produce_matching_fills() {
        let coord = ChunkCoord::new(3, -2);
        let gray = ChunkGenerator::new(WorldSeed::new(9), small(), GenerationMode::Grayscale);
        assert!(gray
            .tiles(coord)
            .iter()
            .all(|t| matches!(t.fill, TileFill::Color { .. })));

        let biome = ChunkGenerator::new(WorldSeed::new(9), small(), GenerationMode::Biome);
        for tile in biome.tiles(coord) {
            match tile.fill {
                TileFill::Sprite { biome, sprite_index } => {
                    assert!(usize::from(sprite_index) < biome.sheet().frame_count());
                }
                TileFill::Color { .. } => panic!("biome mode produced a colour tile"),
            }
        }
    }
}
