//! # Resident Chunk
//!
//! The scene node for one chunk: a background texture plus the entities
//! anchored to it. Child positions are local to the chunk origin.
//!
//! A chunk owns its background texture while it is resident. Teardown goes
//! through [`Chunk::destroy`], which hands pooled textures back before the
//! nodes are dropped.

use haven_shared::{ChunkCoord, ChunkKey, LocalPosition, ObjectId, WorldPosition};
use thiserror::Error;
use tracing::trace;

use crate::texture::{RenderTexture, TexturePool};

/// Errors from chunk-local operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkError {
    /// The position belongs to another chunk.
    #[error("world position ({x}, {y}) lies outside chunk {key}")]
    OutOfBounds {
        /// This chunk.
        key: ChunkKey,
        /// World X.
        x: f64,
        /// World Y.
        y: f64,
    },
}

/// Where a background texture came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureOrigin {
    /// Borrowed from the texture pool; must be returned.
    Pooled,
    /// Built outside the pool (a fetched remote render); just dropped.
    External,
}

/// Identity of a node within a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// What a node draws.
#[derive(Debug)]
pub enum NodeContent {
    /// The chunk background. The texture slot is emptied on teardown.
    Background {
        /// The surface, while attached.
        texture: Option<RenderTexture>,
        /// Where the surface came from.
        origin: TextureOrigin,
    },
    /// A game entity anchored to the chunk.
    Entity(ObjectId),
}

/// A child of a chunk.
#[derive(Debug)]
pub struct Node {
    /// Identity within the chunk.
    pub id: NodeId,
    /// Position relative to the chunk origin.
    pub position: LocalPosition,
    /// Payload.
    pub content: NodeContent,
}

/// A resident chunk.
#[derive(Debug)]
pub struct Chunk {
    /// Grid coordinate.
    coord: ChunkCoord,
    /// Edge length in pixels.
    chunk_pixel_size: u32,
    /// World position of the top-left corner.
    world_origin: WorldPosition,
    /// Children, background first once set.
    children: Vec<Node>,
    /// Next node id.
    next_node: u32,
}

impl Chunk {
    /// Creates an empty chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord, chunk_pixel_size: u32) -> Self {
        Self {
            coord,
            chunk_pixel_size,
            world_origin: coord.origin(chunk_pixel_size),
            children: Vec::new(),
            next_node: 0,
        }
    }

    /// Canonical key.
    #[must_use]
    pub const fn key(&self) -> ChunkKey {
        self.coord.key()
    }

    /// Grid coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// World position of the top-left corner.
    #[must_use]
    pub const fn world_origin(&self) -> WorldPosition {
        self.world_origin
    }

    /// Edge length in pixels.
    #[must_use]
    pub const fn chunk_pixel_size(&self) -> u32 {
        self.chunk_pixel_size
    }

    /// Converts a world position into this chunk's local space.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the position maps to another
    /// chunk.
    pub fn to_local(&self, world: WorldPosition) -> Result<LocalPosition, ChunkError> {
        if ChunkCoord::from_world(world, self.chunk_pixel_size) != self.coord {
            return Err(ChunkError::OutOfBounds {
                key: self.key(),
                x: world.x,
                y: world.y,
            });
        }

        // Rounding in the subtraction can land exactly on the far edge.
        let upper = f64::from(self.chunk_pixel_size) * (1.0 - f64::EPSILON);
        Ok(LocalPosition::new(
            (world.x - self.world_origin.x).clamp(0.0, upper),
            (world.y - self.world_origin.y).clamp(0.0, upper),
        ))
    }

    fn allocate_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Installs the background texture.
    ///
    /// Returns the texture it replaces, which the caller must dispose of.
    #[must_use = "a replaced pooled texture must go back to its pool"]
    pub fn set_background(
        &mut self,
        texture: RenderTexture,
        origin: TextureOrigin,
    ) -> Option<(RenderTexture, TextureOrigin)> {
        if let Some(node) = self
            .children
            .iter_mut()
            .find(|n| matches!(n.content, NodeContent::Background { .. }))
        {
            let previous = std::mem::replace(
                &mut node.content,
                NodeContent::Background {
                    texture: Some(texture),
                    origin,
                },
            );
            return match previous {
                NodeContent::Background {
                    texture: Some(old),
                    origin,
                } => Some((old, origin)),
                _ => None,
            };
        }

        let id = self.allocate_node();
        self.children.insert(
            0,
            Node {
                id,
                position: LocalPosition::default(),
                content: NodeContent::Background {
                    texture: Some(texture),
                    origin,
                },
            },
        );
        None
    }

    /// The background texture, if set.
    #[must_use]
    pub fn background(&self) -> Option<&RenderTexture> {
        self.children.iter().find_map(|n| match &n.content {
            NodeContent::Background { texture, .. } => texture.as_ref(),
            NodeContent::Entity(_) => None,
        })
    }

    /// Where the background came from, if set.
    #[must_use]
    pub fn background_origin(&self) -> Option<TextureOrigin> {
        self.children.iter().find_map(|n| match n.content {
            NodeContent::Background { origin, .. } => Some(origin),
            NodeContent::Entity(_) => None,
        })
    }

    /// Anchors an entity at a local position. Re-adding an entity moves it.
    pub fn add_child(&mut self, object: ObjectId, position: LocalPosition) -> NodeId {
        if let Some(node) = self
            .children
            .iter_mut()
            .find(|n| matches!(n.content, NodeContent::Entity(id) if id == object))
        {
            node.position = position;
            return node.id;
        }

        let id = self.allocate_node();
        self.children.push(Node {
            id,
            position,
            content: NodeContent::Entity(object),
        });
        id
    }

    /// Anchors an entity at a world position.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the position is in another chunk.
    pub fn place_entity(&mut self, object: ObjectId, world: WorldPosition) -> Result<NodeId, ChunkError> {
        let local = self.to_local(world)?;
        Ok(self.add_child(object, local))
    }

    /// Detaches an entity.
    pub fn remove_child(&mut self, object: ObjectId) -> Option<Node> {
        let index = self
            .children
            .iter()
            .position(|n| matches!(n.content, NodeContent::Entity(id) if id == object))?;
        Some(self.children.remove(index))
    }

    /// Children, background first.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Entities anchored here.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<ObjectId> {
        self.children
            .iter()
            .filter_map(|n| match n.content {
                NodeContent::Entity(id) => Some(id),
                NodeContent::Background { .. } => None,
            })
            .collect()
    }

    /// Tears the chunk down.
    ///
    /// Pooled textures are detached from their node and returned to `pool`
    /// before the node is dropped; external textures are dropped. Returns the
    /// entities that were still anchored.
    pub fn destroy(mut self, pool: &mut TexturePool) -> Vec<ObjectId> {
        let mut orphans = Vec::new();

        for mut node in self.children.drain(..) {
            match &mut node.content {
                NodeContent::Background { texture, origin } => {
                    if let Some(texture) = texture.take() {
                        match origin {
                            TextureOrigin::Pooled => pool.release(texture),
                            TextureOrigin::External => drop(texture),
                        }
                    }
                }
                NodeContent::Entity(id) => orphans.push(*id),
            }
        }

        trace!(key = %self.key(), orphans = orphans.len(), "destroyed chunk");
        orphans
    }
}
