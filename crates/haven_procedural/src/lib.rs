//! # HAVEN Procedural Generation
//!
//! Deterministic terrain for an unbounded 2D tile world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the same seed always produces the same tiles
//! 2. **Chunked**: the world is generated in fixed-size square chunks
//! 3. **Generate once**: the store generates each key at most once
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded 2D noise
//! - `BiomeClassifier`: temperature/precipitation climate model
//! - `ChunkGenerator`: produces a `ChunkRecord` from a chunk coordinate
//! - `MemoryChunkStore`: the authoritative generate-or-fetch store
//!
//! ## Example
//!
//! ```rust,ignore
//! use haven_procedural::{ChunkGenerator, ChunkStore, GenerationMode, MemoryChunkStore};
//! use haven_shared::{ChunkKey, WorldConstants};
//!
//! let generator = ChunkGenerator::from_name("haven-world-seed", WorldConstants::DEFAULT, GenerationMode::Biome);
//! let store = MemoryChunkStore::new(generator);
//!
//! let record = store.get_or_generate(ChunkKey::new(0, 0));
//! assert_eq!(store.stats().chunk_count, 1);
//! ```

#![deny(unsafe_code)]

pub mod climate;
pub mod generator;
pub mod noise;
pub mod record;
pub mod store;

pub use climate::{BiomeClassifier, Climate};
pub use generator::{ChunkGenerator, GenerationMode, TerrainGenerator};
pub use noise::{SimplexNoise, WorldSeed};
pub use record::ChunkRecord;
pub use store::{ChunkStore, MemoryChunkStore, StoreStats};
