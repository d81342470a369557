//! # Chunk Lifecycle Events
//!
//! The streaming manager tells one [`EntityCollaborator`] when a chunk
//! becomes resident and when it is torn down. Entity placement lives with
//! the collaborator, not the manager.
//!
//! ```text
//! ┌─────────────┐  on_chunk_ready    ┌──────────────┐
//! │  Streaming  │───────────────────>│   Entity     │
//! │  Manager    │  on_chunk_unloaded │ Collaborator │
//! └─────────────┘───────────────────>└──────────────┘
//! ```
//!
//! `on_chunk_unloaded` arrives after the chunk has left the registry and its
//! texture is back in the pool.

use std::collections::HashMap;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use haven_rendering::{Chunk, ChunkError};
use haven_shared::{ChunkCoord, ChunkKey, ObjectId, WorldPosition};
use tracing::warn;

/// Receives chunk lifecycle notifications.
pub trait EntityCollaborator {
    /// A chunk is resident and may take children.
    ///
    /// # Errors
    ///
    /// Returns the placement error for an entity that does not belong to
    /// this chunk.
    fn on_chunk_ready(&mut self, key: ChunkKey, chunk: &mut Chunk) -> Result<(), ChunkError>;

    /// A chunk has been unloaded. Its children are gone.
    fn on_chunk_unloaded(&mut self, key: ChunkKey);
}

/// Ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCollaborator;

impl EntityCollaborator for NullCollaborator {
    fn on_chunk_ready(&mut self, _key: ChunkKey, _chunk: &mut Chunk) -> Result<(), ChunkError> {
        Ok(())
    }

    fn on_chunk_unloaded(&mut self, _key: ChunkKey) {}
}

/// A chunk lifecycle event.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkEvent {
    /// A chunk became resident.
    Ready {
        /// Chunk key.
        key: ChunkKey,
        /// World position of its top-left corner.
        origin: WorldPosition,
    },
    /// A chunk was unloaded.
    Unloaded {
        /// Chunk key.
        key: ChunkKey,
    },
}

/// Forwards events over a bounded channel to another thread.
///
/// Sending never blocks. When the channel is full the event is dropped and
/// counted.
pub struct ChannelCollaborator {
    /// Sender end.
    sender: Sender<ChunkEvent>,
    /// Events dropped because the channel was full or closed.
    dropped: u64,
}

impl ChannelCollaborator {
    /// Creates a collaborator and the receiving end of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, ChunkEventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            Self { sender, dropped: 0 },
            ChunkEventReceiver { receiver },
        )
    }

    /// Events dropped so far.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send(&mut self, event: ChunkEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped += 1;
                warn!(?event, "chunk event channel full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
            }
        }
    }
}

impl EntityCollaborator for ChannelCollaborator {
    fn on_chunk_ready(&mut self, key: ChunkKey, chunk: &mut Chunk) -> Result<(), ChunkError> {
        self.send(ChunkEvent::Ready {
            key,
            origin: chunk.world_origin(),
        });
        Ok(())
    }

    fn on_chunk_unloaded(&mut self, key: ChunkKey) {
        self.send(ChunkEvent::Unloaded { key });
    }
}

/// Receiving end of a [`ChannelCollaborator`].
#[derive(Clone)]
pub struct ChunkEventReceiver {
    receiver: Receiver<ChunkEvent>,
}

impl ChunkEventReceiver {
    /// Receives all pending events (non-blocking).
    #[must_use]
    pub fn drain(&self) -> Vec<ChunkEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<ChunkEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

/// Keeps entity world positions and anchors entities to whichever chunk
/// contains them while that chunk is resident.
#[derive(Debug, Default)]
pub struct EntityLayer {
    /// Chunk edge length in pixels.
    chunk_pixel_size: u32,
    /// Every known entity.
    positions: HashMap<ObjectId, WorldPosition>,
    /// Entities anchored per resident chunk.
    anchored: HashMap<ChunkKey, Vec<ObjectId>>,
}

impl EntityLayer {
    /// Creates an empty layer for chunks of `chunk_pixel_size` pixels.
    #[must_use]
    pub fn new(chunk_pixel_size: u32) -> Self {
        Self {
            chunk_pixel_size,
            ..Self::default()
        }
    }

    /// Records an entity's world position. Takes effect the next time the
    /// entity's chunk becomes resident.
    pub fn set_position(&mut self, object: ObjectId, position: WorldPosition) {
        self.positions.insert(object, position);
    }

    /// Forgets an entity.
    pub fn remove(&mut self, object: ObjectId) -> Option<WorldPosition> {
        self.positions.remove(&object)
    }

    /// Chunk an entity belongs to, by position.
    #[must_use]
    pub fn chunk_of(&self, object: ObjectId) -> Option<ChunkCoord> {
        self.positions
            .get(&object)
            .map(|p| ChunkCoord::from_world(*p, self.chunk_pixel_size))
    }

    /// Entities anchored to a resident chunk.
    #[must_use]
    pub fn anchored(&self, key: ChunkKey) -> &[ObjectId] {
        self.anchored.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Entities anchored across all resident chunks.
    #[must_use]
    pub fn anchored_count(&self) -> usize {
        self.anchored.values().map(Vec::len).sum()
    }
}

impl EntityCollaborator for EntityLayer {
    fn on_chunk_ready(&mut self, key: ChunkKey, chunk: &mut Chunk) -> Result<(), ChunkError> {
        let mut members: Vec<(ObjectId, WorldPosition)> = self
            .positions
            .iter()
            .filter(|(_, p)| ChunkCoord::from_world(**p, self.chunk_pixel_size) == key.coord())
            .map(|(id, p)| (*id, *p))
            .collect();
        members.sort_by_key(|(id, _)| *id);

        let mut anchored = Vec::with_capacity(members.len());
        for (object, position) in members {
            chunk.place_entity(object, position)?;
            anchored.push(object);
        }
        self.anchored.insert(key, anchored);
        Ok(())
    }

    fn on_chunk_unloaded(&mut self, key: ChunkKey) {
        self.anchored.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_collaborator_forwards_and_counts_drops() {
        let (mut collaborator, receiver) = ChannelCollaborator::new(1);
        let mut chunk = Chunk::new(ChunkCoord::new(1, 0), 64);

        collaborator.on_chunk_ready(ChunkKey::new(1, 0), &mut chunk).unwrap();
        collaborator.on_chunk_unloaded(ChunkKey::new(1, 0));
        assert_eq!(collaborator.dropped(), 1);

        assert_eq!(receiver.pending_count(), 1);
        assert_eq!(
            receiver.drain(),
            vec![ChunkEvent::Ready {
                key: ChunkKey::new(1, 0),
                origin: WorldPosition::new(64.0, 0.0)
            }]
        );
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_entity_layer_anchors_members_only() {
        let mut layer = EntityLayer::new(64);
        layer.set_position(ObjectId(1), WorldPosition::new(10.0, 10.0));
        layer.set_position(ObjectId(2), WorldPosition::new(70.0, 10.0));
        layer.set_position(ObjectId(3), WorldPosition::new(63.5, 0.0));

        let key = ChunkKey::new(0, 0);
        let mut chunk = Chunk::new(key.coord(), 64);
        layer.on_chunk_ready(key, &mut chunk).unwrap();

        assert_eq!(layer.anchored(key), &[ObjectId(1), ObjectId(3)]);
        assert_eq!(chunk.entity_ids(), vec![ObjectId(1), ObjectId(3)]);
        assert_eq!(layer.chunk_of(ObjectId(2)), Some(ChunkCoord::new(1, 0)));

        layer.on_chunk_unloaded(key);
        assert!(layer.anchored(key).is_empty());
        assert_eq!(layer.anchored_count(), 0);
    }
}
