//! Generated chunk records.

use std::sync::Arc;
use std::time::SystemTime;

use haven_shared::{ChunkCoord, ChunkKey, ObjectId, Tile, TilePayload};

/// The authoritative state of one generated chunk.
///
/// Tiles are immutable after generation and shared behind an `Arc`, so
/// handing a record out is cheap and never deep-copies tile data.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    /// Canonical key.
    pub key: ChunkKey,
    /// Chunk coordinate.
    pub coord: ChunkCoord,
    /// Tiles, row-major.
    pub tiles: Arc<[Tile]>,
    /// Objects anchored to this chunk.
    pub attached_object_ids: Vec<ObjectId>,
    /// When generation finished.
    pub generated_at: SystemTime,
}

impl ChunkRecord {
    /// Wraps freshly generated tiles. No objects are attached yet.
    #[must_use]
    pub fn new(coord: ChunkCoord, tiles: Vec<Tile>) -> Self {
        Self {
            key: coord.key(),
            coord,
            tiles: tiles.into(),
            attached_object_ids: Vec::new(),
            generated_at: SystemTime::now(),
        }
    }

    /// Whether both records come from the same generation run.
    #[must_use]
    pub fn same_generation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tiles, &other.tiles)
    }

    /// The record as a raw-tile wire payload.
    #[must_use]
    pub fn to_payload(&self) -> TilePayload {
        TilePayload::new(
            self.key,
            self.tiles.to_vec(),
            self.attached_object_ids.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_shared::Color;

    #[test]
    fn test_clone_shares_tiles() {
        let record = ChunkRecord::new(
            ChunkCoord::new(2, -3),
            vec![Tile::colored(0, 0, Color::gray(10))],
        );
        let copy = record.clone();
        assert!(record.same_generation(&copy));
        assert_eq!(copy.key, ChunkKey::new(2, -3));

        let other = ChunkRecord::new(ChunkCoord::new(2, -3), record.tiles.to_vec());
        assert!(!record.same_generation(&other));
    }

    #[test]
    fn test_to_payload() {
        let mut record = ChunkRecord::new(
            ChunkCoord::new(1, 1),
            vec![Tile::colored(0, 0, Color::gray(1))],
        );
        record.attached_object_ids.push(ObjectId(5));
        let payload = record.to_payload();
        assert_eq!(payload.chunk_key, ChunkKey::new(1, 1));
        assert_eq!((payload.chunk_x, payload.chunk_y), (1, 1));
        assert_eq!(payload.tiles.len(), 1);
        assert_eq!(payload.attached_object_ids, vec![ObjectId(5)]);
    }
}
