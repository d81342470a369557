//! # HAVEN Shared
//!
//! Types used by the generation authority and by every consumer of chunk data.
//!
//! ## CRITICAL RULE
//!
//! Everything in [`constants`] is a versioned contract. Two parties that
//! generate or consume the same chunk key must agree on every value in
//! [`WorldConstants`], or tiles land at the wrong pixels and seams appear at
//! chunk borders.

#![deny(unsafe_code)]

pub mod biome;
pub mod constants;
pub mod coord;
pub mod protocol;
pub mod tile;

pub use biome::{Biome, SheetMeta};
pub use constants::{
    ConstantsError, WorldConstants, CHUNK_PIXEL_SIZE, CONTRACT_VERSION, DEFAULT_LOAD_RADIUS,
    NOISE_DIVISOR, TILES_PER_CHUNK_SIDE, TILE_SIZE,
};
pub use coord::{ChunkCoord, ChunkKey, CoordError, LocalPosition, WorldPosition};
pub use protocol::{ChunkPayload, ObjectId, PayloadError, TexturePayload, TilePayload};
pub use tile::{Color, Tile, TileFill};
