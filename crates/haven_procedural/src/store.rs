//! # Authoritative Chunk Store
//!
//! Generate-or-fetch storage for chunk records.
//!
//! ## Concurrency
//!
//! The check for an existing record and the decision to generate happen
//! under one lock. A key being generated is marked in-flight; generation
//! itself runs outside the lock and other callers asking for the same key
//! park on a condition variable until the record lands. At most one
//! generation per key ever runs.

use std::collections::HashMap;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use haven_shared::{ChunkKey, ObjectId};

use crate::generator::{ChunkGenerator, TerrainGenerator};
use crate::record::ChunkRecord;

/// Store-wide counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Records held.
    pub chunk_count: usize,
    /// Object attachments across all records.
    pub total_attached_objects: usize,
}

/// The authority for generated chunks.
///
/// Records are never deleted.
pub trait ChunkStore: Send + Sync {
    /// Returns the record for `key`, generating it on first access.
    fn get_or_generate(&self, key: ChunkKey) -> ChunkRecord;

    /// Returns the record for `key` if it has been generated.
    fn get(&self, key: ChunkKey) -> Option<ChunkRecord>;

    /// Attaches `id` to the chunk. Returns `false` if the chunk is absent.
    /// Attaching an already attached id changes nothing and returns `true`.
    fn add_object_to_chunk(&self, key: ChunkKey, id: ObjectId) -> bool;

    /// Detaches `id`. Returns `true` only if it was attached.
    fn remove_object_from_chunk(&self, key: ChunkKey, id: ObjectId) -> bool;

    /// Current counters.
    fn stats(&self) -> StoreStats;
}

/// One key's entry.
enum Slot {
    /// A caller is generating this key right now.
    Generating,
    /// Generated.
    Ready(ChunkRecord),
}

/// In-memory [`ChunkStore`].
pub struct MemoryChunkStore<G: TerrainGenerator = ChunkGenerator> {
    /// Produces records for missing keys.
    generator: G,
    /// All slots, keyed by chunk key.
    slots: Mutex<HashMap<ChunkKey, Slot>>,
    /// Signalled whenever an in-flight slot resolves.
    ready: Condvar,
}

impl<G: TerrainGenerator> MemoryChunkStore<G> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            slots: Mutex::new(HashMap::new()),
            ready: Condvar::new(),
        }
    }

    /// The generator.
    #[must_use]
    pub const fn generator(&self) -> &G {
        &self.generator
    }
}

/// Clears an in-flight marker if generation unwinds.
struct InFlight<'a, G: TerrainGenerator> {
    store: &'a MemoryChunkStore<G>,
    key: ChunkKey,
    armed: bool,
}

impl<G: TerrainGenerator> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            warn!(key = %self.key, "chunk generation panicked, clearing in-flight marker");
            self.store.slots.lock().remove(&self.key);
            self.store.ready.notify_all();
        }
    }
}

impl<G: TerrainGenerator> ChunkStore for MemoryChunkStore<G> {
    fn get_or_generate(&self, key: ChunkKey) -> ChunkRecord {
        let mut slots = self.slots.lock();
        loop {
            match slots.get(&key) {
                Some(Slot::Ready(record)) => return record.clone(),
                Some(Slot::Generating) => {}
                None => break,
            }
            self.ready.wait(&mut slots);
        }
        slots.insert(key, Slot::Generating);
        drop(slots);

        let mut guard = InFlight {
            store: self,
            key,
            armed: true,
        };
        let record = self.generator.generate(key.coord());

        let mut slots = self.slots.lock();
        guard.armed = false;
        slots.insert(key, Slot::Ready(record.clone()));
        let chunk_count = slots.len();
        drop(slots);
        drop(guard);
        self.ready.notify_all();

        debug!(%key, chunk_count, "generated chunk");
        record
    }

    fn get(&self, key: ChunkKey) -> Option<ChunkRecord> {
        match self.slots.lock().get(&key) {
            Some(Slot::Ready(record)) => Some(record.clone()),
            _ => None,
        }
    }

    fn add_object_to_chunk(&self, key: ChunkKey, id: ObjectId) -> bool {
        let mut slots = self.slots.lock();
        let Some(Slot::Ready(record)) = slots.get_mut(&key) else {
            return false;
        };
        if !record.attached_object_ids.contains(&id) {
            record.attached_object_ids.push(id);
        }
        true
    }

    fn remove_object_from_chunk(&self, key: ChunkKey, id: ObjectId) -> bool {
        let mut slots = self.slots.lock();
        let Some(Slot::Ready(record)) = slots.get_mut(&key) else {
            return false;
        };
        let before = record.attached_object_ids.len();
        record.attached_object_ids.retain(|attached| *attached != id);
        record.attached_object_ids.len() != before
    }

    fn stats(&self) -> StoreStats {
        let slots = self.slots.lock();
        slots
            .values()
            .fold(StoreStats::default(), |mut stats, slot| {
                if let Slot::Ready(record) = slot {
                    stats.chunk_count += 1;
                    stats.total_attached_objects += record.attached_object_ids.len();
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_shared::{ChunkCoord, Color, Tile};

    struct Flat;

    impl TerrainGenerator for Flat {
        fn generate(&self, coord: ChunkCoord) -> ChunkRecord {
            ChunkRecord::new(coord, vec![Tile::colored(0, 0, Color::gray(0))])
        }
    }

    #[test]
    fn test_generate_once() {
        let store = MemoryChunkStore::new(Flat);
        let key = ChunkKey::new(0, 0);
        let a = store.get_or_generate(key);
        let b = store.get_or_generate(key);
        assert!(a.same_generation(&b));
        assert_eq!(store.stats().chunk_count, 1);
    }

    #[test]
    fn test_get_does_not_generate() {
        let store = MemoryChunkStore::new(Flat);
        assert!(store.get(ChunkKey::new(1, 1)).is_none());
        assert_eq!(store.stats().chunk_count, 0);
        store.get_or_generate(ChunkKey::new(1, 1));
        assert!(store.get(ChunkKey::new(1, 1)).is_some());
    }

    #[test]
    fn test_attach_and_detach() {
        let store = MemoryChunkStore::new(Flat);
        let key = ChunkKey::new(4, -4);

        assert!(!store.add_object_to_chunk(key, ObjectId(1)), "absent chunk");
        store.get_or_generate(key);

        assert!(store.add_object_to_chunk(key, ObjectId(1)));
        assert!(store.add_object_to_chunk(key, ObjectId(1)), "idempotent");
        assert!(store.add_object_to_chunk(key, ObjectId(2)));
        assert_eq!(store.stats().total_attached_objects, 2);

        assert!(store.remove_object_from_chunk(key, ObjectId(1)));
        assert!(!store.remove_object_from_chunk(key, ObjectId(1)));
        assert!(!store.remove_object_from_chunk(ChunkKey::new(9, 9), ObjectId(2)));
        assert_eq!(store.get(key).map(|r| r.attached_object_ids), Some(vec![ObjectId(2)]));
    }
}
