//! Chunk registry.
//!
//! Maps keys to resident chunks. Pure bookkeeping: deciding what to load or
//! evict is the streaming manager's job.

use std::collections::HashMap;

use haven_shared::ChunkKey;

use crate::chunk::Chunk;

/// Resident chunks by key.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    /// Chunks indexed by key.
    chunks: HashMap<ChunkKey, Chunk>,
}

impl ChunkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chunk, returning any chunk it displaced.
    #[must_use = "a displaced chunk must be destroyed"]
    pub fn add(&mut self, key: ChunkKey, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(key, chunk)
    }

    /// Unregisters a chunk.
    pub fn remove(&mut self, key: ChunkKey) -> Option<Chunk> {
        self.chunks.remove(&key)
    }

    /// Gets a chunk.
    #[must_use]
    pub fn get(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Gets a chunk mutably.
    pub fn get_mut(&mut self, key: ChunkKey) -> Option<&mut Chunk> {
        self.chunks.get_mut(&key)
    }

    /// Whether `key` is resident.
    #[must_use]
    pub fn has(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// Every resident chunk.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &Chunk)> {
        self.chunks.iter().map(|(key, chunk)| (*key, chunk))
    }

    /// Resident keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Removes every chunk. The caller tears them down.
    pub fn clear(&mut self) -> Vec<(ChunkKey, Chunk)> {
        self.chunks.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_shared::ChunkCoord;

    fn chunk(x: i32, y: i32) -> Chunk {
        Chunk::new(ChunkCoord::new(x, y), 64)
    }

    #[test]
    fn test_add_get_remove() {
        let mut registry = ChunkRegistry::new();
        let key = ChunkKey::new(1, 2);
        assert!(registry.add(key, chunk(1, 2)).is_none());
        assert!(registry.has(key));
        assert_eq!(registry.get(key).map(Chunk::key), Some(key));
        assert!(registry.get_mut(key).is_some());

        assert!(registry.add(key, chunk(1, 2)).is_some(), "displaced");
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(key).is_some());
        assert!(registry.remove(key).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_sorted_and_clear_drains() {
        let mut registry = ChunkRegistry::new();
        for (x, y) in [(2, 0), (-1, 5), (0, 0)] {
            assert!(registry.add(ChunkKey::new(x, y), chunk(x, y)).is_none());
        }
        assert_eq!(
            registry.keys(),
            vec![ChunkKey::new(-1, 5), ChunkKey::new(0, 0), ChunkKey::new(2, 0)]
        );
        assert_eq!(registry.iter().count(), 3);

        let drained = registry.clear();
        assert_eq!(drained.len(), 3);
        assert!(registry.is_empty());
    }
}
