//! # Chunk Providers
//!
//! Where chunk data comes from. The streaming manager asks a
//! [`ChunkProvider`] for a key and gets [`ChunkData`] back, without caring
//! whether the chunk was generated in-process or arrived as a wire payload.
//!
//! - [`StoreProvider`] reads the local authoritative store.
//! - [`TransportProvider`] decodes and validates payload bytes from a
//!   [`ChunkTransport`].
//!
//! Payloads are validated before they become [`ChunkData`]. Anything past
//! this module can trust tile counts and offsets.

use std::sync::Arc;

use haven_procedural::{ChunkRecord, ChunkStore};
use haven_rendering::{RenderTexture, TextureSize};
use haven_shared::{ChunkKey, ChunkPayload, ObjectId, Tile, WorldConstants};
use tracing::trace;

use crate::error::{FetchError, ProviderError, TransportError};

/// Chunk contents ready for materialization.
#[derive(Clone, Debug)]
pub enum ChunkData {
    /// Raw tiles. The consumer builds the background.
    Tiles {
        /// Chunk key.
        key: ChunkKey,
        /// Tiles, row-major.
        tiles: Arc<[Tile]>,
        /// Attached objects.
        attached_object_ids: Vec<ObjectId>,
    },
    /// A background rendered elsewhere.
    Texture {
        /// Chunk key.
        key: ChunkKey,
        /// Where to fetch the texture.
        texture_url: String,
        /// Attached objects.
        attached_object_ids: Vec<ObjectId>,
    },
}

impl ChunkData {
    /// Chunk key.
    #[must_use]
    pub const fn key(&self) -> ChunkKey {
        match self {
            Self::Tiles { key, .. } | Self::Texture { key, .. } => *key,
        }
    }

    /// Attached objects.
    #[must_use]
    pub fn attached_object_ids(&self) -> &[ObjectId] {
        match self {
            Self::Tiles {
                attached_object_ids,
                ..
            }
            | Self::Texture {
                attached_object_ids,
                ..
            } => attached_object_ids,
        }
    }
}

impl From<ChunkRecord> for ChunkData {
    fn from(record: ChunkRecord) -> Self {
        Self::Tiles {
            key: record.key,
            tiles: record.tiles,
            attached_object_ids: record.attached_object_ids,
        }
    }
}

impl From<ChunkPayload> for ChunkData {
    fn from(payload: ChunkPayload) -> Self {
        match payload {
            ChunkPayload::Tiles(p) => Self::Tiles {
                key: p.chunk_key,
                tiles: p.tiles.into(),
                attached_object_ids: p.attached_object_ids,
            },
            ChunkPayload::Texture(p) => Self::Texture {
                key: p.chunk_key,
                texture_url: p.texture_url,
                attached_object_ids: p.attached_object_ids,
            },
        }
    }
}

/// Supplies chunk data by key.
pub trait ChunkProvider {
    /// Requests one chunk.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the chunk cannot be delivered or the
    /// delivered data is unusable. The caller may retry later.
    fn request(&self, key: ChunkKey) -> Result<ChunkData, ProviderError>;
}

/// Serves chunks from an in-process store. Never fails.
pub struct StoreProvider {
    store: Arc<dyn ChunkStore>,
}

impl StoreProvider {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self { store }
    }
}

impl ChunkProvider for StoreProvider {
    fn request(&self, key: ChunkKey) -> Result<ChunkData, ProviderError> {
        Ok(self.store.get_or_generate(key).into())
    }
}

/// Moves encoded chunk payloads from an authority.
pub trait ChunkTransport {
    /// Fetches the JSON payload for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the far end is unreachable or has no
    /// such chunk.
    fn fetch(&self, key: ChunkKey) -> Result<Vec<u8>, TransportError>;
}

/// Serves chunks from a [`ChunkTransport`], validating every payload.
pub struct TransportProvider<T> {
    transport: T,
    constants: WorldConstants,
}

impl<T: ChunkTransport> TransportProvider<T> {
    /// Wraps a transport. Payloads are checked against `constants`.
    #[must_use]
    pub const fn new(transport: T, constants: WorldConstants) -> Self {
        Self {
            transport,
            constants,
        }
    }

    /// The transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: ChunkTransport> ChunkProvider for TransportProvider<T> {
    fn request(&self, key: ChunkKey) -> Result<ChunkData, ProviderError> {
        let bytes = self.transport.fetch(key)?;
        let payload = ChunkPayload::from_json(&bytes)?;
        payload.validate(&self.constants)?;

        let received = payload.key();
        if received != key {
            return Err(ProviderError::WrongChunk {
                requested: key,
                received,
            });
        }

        trace!(%key, bytes = bytes.len(), "decoded chunk payload");
        Ok(payload.into())
    }
}

/// Fetches backgrounds rendered elsewhere.
pub trait TextureFetcher {
    /// Fetches the texture at `url`, which must be `size`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the texture is unavailable or the wrong
    /// size.
    fn fetch(&self, url: &str, size: TextureSize) -> Result<RenderTexture, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_procedural::{ChunkGenerator, GenerationMode, MemoryChunkStore};
    use haven_shared::{Color, TexturePayload, TilePayload};
    use std::collections::HashMap;

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

    struct Canned(HashMap<ChunkKey, Vec<u8>>);

    impl ChunkTransport for Canned {
        fn fetch(&self, key: ChunkKey) -> Result<Vec<u8>, TransportError> {
            self.0.get(&key).cloned().ok_or(TransportError::NotFound(key))
        }
    }

    fn canned(entries: Vec<(ChunkKey, ChunkPayload)>) -> TransportProvider<Canned> {
        let map = entries
            .into_iter()
            .map(|(k, p)| (k, p.to_json().unwrap()))
            .collect();
        TransportProvider::new(Canned(map), constants())
    }

    #[test]
    fn test_store_provider_shares_tiles() {
        let store = Arc::new(MemoryChunkStore::new(ChunkGenerator::from_name(
            "provider",
            constants(),
            GenerationMode::Grayscale,
        )));
        let provider = StoreProvider::new(store.clone());
        let key = ChunkKey::new(3, -1);

        let ChunkData::Tiles { tiles, .. } = provider.request(key).unwrap() else {
            panic!("store always serves tiles");
        };
        let record = store.get(key).unwrap();
        assert!(Arc::ptr_eq(&tiles, &record.tiles));
    }

    #[test]
    fn test_transport_provider_accepts_both_shapes() {
        let a = ChunkKey::new(0, 0);
        let b = ChunkKey::new(1, 0);
        let provider = canned(vec![
            (a, ChunkPayload::Tiles(TilePayload::new(a, tiles(), vec![ObjectId(7)]))),
            (
                b,
                ChunkPayload::Texture(TexturePayload {
                    chunk_key: b,
                    texture_url: "https://tiles.example/1_0.png".to_owned(),
                    attached_object_ids: Vec::new(),
                }),
            ),
        ]);

        let data = provider.request(a).unwrap();
        assert_eq!(data.key(), a);
        assert_eq!(data.attached_object_ids(), &[ObjectId(7)]);
        assert!(matches!(data, ChunkData::Tiles { ref tiles, .. } if tiles.len() == 4));

        assert!(matches!(
            provider.request(b).unwrap(),
            ChunkData::Texture { ref texture_url, .. } if texture_url.ends_with("1_0.png")
        ));
    }

    #[test]
    fn test_transport_provider_rejects_bad_payloads() {
        let a = ChunkKey::new(0, 0);
        let b = ChunkKey::new(5, 5);
        let provider = canned(vec![
            (a, ChunkPayload::Tiles(TilePayload::new(a, tiles()[..3].to_vec(), Vec::new()))),
            (b, ChunkPayload::Tiles(TilePayload::new(a, tiles(), Vec::new()))),
        ]);

        assert!(matches!(provider.request(a), Err(ProviderError::Payload(_))));
        assert!(matches!(
            provider.request(b),
            Err(ProviderError::WrongChunk { requested, received }) if requested == b && received == a
        ));
        assert!(matches!(
            provider.request(ChunkKey::new(9, 9)),
            Err(ProviderError::Transport(TransportError::NotFound(_)))
        ));
    }

    #[test]
    fn test_garbage_bytes_are_payload_errors() {
        let key = ChunkKey::new(0, 0);
        let mut map = HashMap::new();
        map.insert(key, b"{\"not\": \"a chunk\"}".to_vec());
        let provider = TransportProvider::new(Canned(map), constants());
        assert!(matches!(provider.request(key), Err(ProviderError::Payload(_))));
    }
}
