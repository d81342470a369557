//! Chunk wire payload.
//!
//! Shape exchanged between a generation authority and a consumer. Either raw
//! tiles or a pre-rendered texture URL; the consumer accepts both and skips
//! its own texture building for the latter.
//!
//! Payloads are rejected at the boundary: [`ChunkPayload::from_json`] then
//! [`ChunkPayload::validate`] before anything else looks at them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biome::Biome;
use crate::constants::WorldConstants;
use crate::coord::{ChunkCoord, ChunkKey};
use crate::tile::{Tile, TileFill};

/// Identity of a game object attached to a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

/// Errors for payloads that fail decoding or validation.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Not valid JSON, or not either payload shape.
    #[error("payload is not a chunk payload: {0}")]
    Json(#[from] serde_json::Error),

    /// `chunkKey` disagrees with `chunkX`/`chunkY`.
    #[error("chunk key {key} does not match coordinates {coord}")]
    KeyMismatch {
        /// Key carried by the payload.
        key: ChunkKey,
        /// Coordinates carried by the payload.
        coord: ChunkCoord,
    },

    /// Wrong number of tiles for the shared constants.
    #[error("expected {expected} tiles, payload has {found}")]
    TileCount {
        /// Tiles per chunk under the shared constants.
        expected: usize,
        /// Tiles present.
        found: usize,
    },

    /// A tile offset is off the tile grid or outside the chunk.
    #[error("tile offset ({x}, {y}) is not on the chunk's tile grid")]
    TileOffGrid {
        /// X offset in pixels.
        x: u32,
        /// Y offset in pixels.
        y: u32,
    },

    /// Two tiles claim the same grid cell.
    #[error("tile offset ({x}, {y}) appears more than once")]
    DuplicateTile {
        /// X offset in pixels.
        x: u32,
        /// Y offset in pixels.
        y: u32,
    },

    /// A sprite index past the end of its biome's sheet.
    #[error("sprite index {index} is past the {frames}-frame {biome:?} sheet")]
    SpriteIndex {
        /// Biome whose sheet was indexed.
        biome: Biome,
        /// Index carried by the tile.
        index: u16,
        /// Frames on the sheet.
        frames: usize,
    },

    /// The texture URL is blank.
    #[error("texture payload for {0} has an empty URL")]
    EmptyTextureUrl(ChunkKey),
}

/// Raw-tile payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilePayload {
    /// Canonical key.
    pub chunk_key: ChunkKey,
    /// Chunk X.
    pub chunk_x: i32,
    /// Chunk Y.
    pub chunk_y: i32,
    /// Tiles, row-major.
    pub tiles: Vec<Tile>,
    /// Attached objects.
    #[serde(default)]
    pub attached_object_ids: Vec<ObjectId>,
}

impl TilePayload {
    /// Builds a consistent payload for a key.
    #[must_use]
    pub fn new(key: ChunkKey, tiles: Vec<Tile>, attached_object_ids: Vec<ObjectId>) -> Self {
        let coord = key.coord();
        Self {
            chunk_key: key,
            chunk_x: coord.x,
            chunk_y: coord.y,
            tiles,
            attached_object_ids,
        }
    }
}

/// Pre-rendered texture payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TexturePayload {
    /// Canonical key.
    pub chunk_key: ChunkKey,
    /// Where the rendered texture can be fetched.
    pub texture_url: String,
    /// Attached objects.
    #[serde(default)]
    pub attached_object_ids: Vec<ObjectId>,
}

/// A generated chunk as it crosses the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkPayload {
    /// Raw tiles; the consumer builds the texture.
    Tiles(TilePayload),
    /// A texture rendered elsewhere.
    Texture(TexturePayload),
}

impl ChunkPayload {
    /// Decodes a payload from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] if the bytes match neither shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Key this payload is for.
    #[must_use]
    pub const fn key(&self) -> ChunkKey {
        match self {
            Self::Tiles(p) => p.chunk_key,
            Self::Texture(p) => p.chunk_key,
        }
    }

    /// Objects attached to the chunk.
    #[must_use]
    pub fn attached_object_ids(&self) -> &[ObjectId] {
        match self {
            Self::Tiles(p) => &p.attached_object_ids,
            Self::Texture(p) => &p.attached_object_ids,
        }
    }

    /// Checks the payload against the shared constants.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self, constants: &WorldConstants) -> Result<(), PayloadError> {
        match self {
            Self::Tiles(p) => {
                let coord = ChunkCoord::new(p.chunk_x, p.chunk_y);
                if p.chunk_key.coord() != coord {
                    return Err(PayloadError::KeyMismatch {
                        key: p.chunk_key,
                        coord,
                    });
                }
                let expected = constants.tiles_per_chunk();
                if p.tiles.len() != expected {
                    return Err(PayloadError::TileCount {
                        expected,
                        found: p.tiles.len(),
                    });
                }
                validate_tiles(&p.tiles, constants)
            }
            Self::Texture(p) => {
                if p.texture_url.trim().is_empty() {
                    return Err(PayloadError::EmptyTextureUrl(p.chunk_key));
                }
                Ok(())
            }
        }
    }
}

/// Every grid cell exactly once, and every sprite on its sheet.
fn validate_tiles(tiles: &[Tile], constants: &WorldConstants) -> Result<(), PayloadError> {
    let size = constants.chunk_pixel_size();
    let step = constants.tile_size;
    let side = constants.tiles_per_chunk_side as usize;
    let mut covered = vec![false; constants.tiles_per_chunk()];

    for tile in tiles {
        let (x, y) = (tile.x, tile.y);
        if x >= size || y >= size || x % step != 0 || y % step != 0 {
            return Err(PayloadError::TileOffGrid { x, y });
        }
        let cell = (y / step) as usize * side + (x / step) as usize;
        if std::mem::replace(&mut covered[cell], true) {
            return Err(PayloadError::DuplicateTile { x, y });
        }
        if let TileFill::Sprite {
            biome,
            sprite_index,
        } = tile.fill
        {
            let frames = biome.sheet().frame_count();
            if usize::from(sprite_index) >= frames {
                return Err(PayloadError::SpriteIndex {
                    biome,
                    index: sprite_index,
                    frames,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Color;

    fn constants() -> WorldConstants {
        WorldConstants::new(8, 2)
    }

    fn tiles() -> Vec<Tile> {
        vec![
            Tile::colored(0, 0, Color::gray(1)),
            Tile::colored(8, 0, Color::gray(2)),
            Tile::colored(0, 8, Color::gray(3)),
            Tile::colored(8, 8, Color::gray(4)),
        ]
    }

    #[test]
    fn test_decode_tiles_payload() {
        let json = br##"{
            "chunkKey": "3,-1", "chunkX": 3, "chunkY": -1,
            "tiles": [
                {"x": 0, "y": 0, "color": "#010101"},
                {"x": 8, "y": 0, "biome": "beach", "spriteIndex": 1},
                {"x": 0, "y": 8, "color": "#030303"},
                {"x": 8, "y": 8, "color": "#040404"}
            ],
            "attachedObjectIds": [7, 9]
        }"##;

        let payload = ChunkPayload::from_json(json).unwrap();
        assert_eq!(payload.key(), ChunkKey::new(3, -1));
        assert_eq!(payload.attached_object_ids(), &[ObjectId(7), ObjectId(9)]);
        payload.validate(&constants()).unwrap();
        assert!(matches!(payload, ChunkPayload::Tiles(_)));
    }

    #[test]
    fn test_decode_texture_payload() {
        let json = br#"{"chunkKey": "0,0", "textureUrl": "https://cdn/chunks/0_0.png", "attachedObjectIds": []}"#;
        let payload = ChunkPayload::from_json(json).unwrap();
        match &payload {
            ChunkPayload::Texture(p) => assert_eq!(p.texture_url, "https://cdn/chunks/0_0.png"),
            ChunkPayload::Tiles(_) => panic!("decoded as tiles"),
        }
        payload.validate(&constants()).unwrap();
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            ChunkPayload::from_json(b"{\"chunkKey\": 5}"),
            Err(PayloadError::Json(_))
        ));
        assert!(ChunkPayload::from_json(b"not json").is_err());
    }

    #[test]
    fn test_validate_key_mismatch() {
        let mut payload = TilePayload::new(ChunkKey::new(1, 1), tiles(), Vec::new());
        payload.chunk_x = 2;
        let err = ChunkPayload::Tiles(payload).validate(&constants()).unwrap_err();
        assert!(matches!(err, PayloadError::KeyMismatch { .. }));
    }

    #[test]
    fn test_validate_tile_count_and_grid() {
        let mut short = tiles();
        short.pop();
        let err = ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), short, Vec::new()))
            .validate(&constants())
            .unwrap_err();
        assert!(matches!(err, PayloadError::TileCount { expected: 4, found: 3 }));

        let mut off = tiles();
        off[3].x = 9;
        let err = ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), off, Vec::new()))
            .validate(&constants())
            .unwrap_err();
        assert!(matches!(err, PayloadError::TileOffGrid { x: 9, y: 8 }));
    }

    #[test]
    fn test_validate_rejects_repeated_cells() {
        let stacked = vec![Tile::colored(0, 0, Color::gray(1)); 4];
        let err = ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), stacked, Vec::new()))
            .validate(&constants())
            .unwrap_err();
        assert!(matches!(err, PayloadError::DuplicateTile { x: 0, y: 0 }));

        // any order is fine as long as every cell is covered once
        let mut shuffled = tiles();
        shuffled.reverse();
        ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), shuffled, Vec::new()))
            .validate(&constants())
            .unwrap();
    }

    #[test]
    fn test_validate_rejects_sprite_past_sheet() {
        let frames = Biome::Beach.sheet().frame_count();
        let mut bad = tiles();
        bad[0] = Tile::sprite(0, 0, Biome::Beach, 999);
        let err = ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), bad, Vec::new()))
            .validate(&constants())
            .unwrap_err();
        assert!(matches!(
            err,
            PayloadError::SpriteIndex { biome: Biome::Beach, index: 999, frames: f } if f == frames
        ));

        let mut last = tiles();
        last[0] = Tile::sprite(0, 0, Biome::Beach, (frames - 1) as u16);
        ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(0, 0), last, Vec::new()))
            .validate(&constants())
            .unwrap();
    }

    #[test]
    fn test_validate_empty_url() {
        let payload = ChunkPayload::Texture(TexturePayload {
            chunk_key: ChunkKey::new(0, 0),
            texture_url: "  ".to_owned(),
            attached_object_ids: Vec::new(),
        });
        assert!(matches!(
            payload.validate(&constants()),
            Err(PayloadError::EmptyTextureUrl(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_camel_case() {
        let payload = ChunkPayload::Tiles(TilePayload::new(ChunkKey::new(-2, 4), tiles(), vec![ObjectId(1)]));
        let bytes = payload.to_json().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"chunkKey\":\"-2,4\""));
        assert!(text.contains("\"attachedObjectIds\":[1]"));
        assert_eq!(ChunkPayload::from_json(&bytes).unwrap(), payload);
    }
}
