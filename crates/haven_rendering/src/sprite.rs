//! # Sprites
//!
//! Per-tile drawables used only while a background is being composited.
//!
//! A sprite is borrowed from the [`SpritePool`] together with a
//! [`SpriteRelease`] token. The sprite goes into a container, the container
//! is rasterized, the container is cleared, and the sprite goes back with
//! its token. Giving back an attached sprite, or a sprite with someone
//! else's token, is a bug in the caller and panics.

use std::collections::HashMap;
use std::sync::Arc;

use haven_core::{PoolResource, PoolStats, ResourceFactory, ResourceId, ResourcePool};
use haven_shared::Biome;

use crate::container::ContainerId;

/// Opaque white; the neutral tint.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Which frame a sprite shows. This is the sprite pool key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteId {
    /// A frame from a biome's terrain sheet.
    Terrain {
        /// Sheet owner.
        biome: Biome,
        /// Frame on the sheet.
        frame: u16,
    },
    /// A single white texel, tinted per tile.
    Solid,
}

impl SpriteId {
    /// Terrain frame, clamped onto the biome's sheet.
    #[must_use]
    pub fn terrain(biome: Biome, frame: u16) -> Self {
        let last = biome.sheet().frame_count().saturating_sub(1);
        Self::Terrain {
            biome,
            frame: usize::from(frame).min(last) as u16,
        }
    }

    /// Edge length of the frame in texels.
    #[must_use]
    pub const fn native_size(self) -> u32 {
        match self {
            Self::Terrain { biome, .. } => biome.sheet().native_size,
            Self::Solid => 1,
        }
    }
}

/// A drawable instance of one frame.
#[derive(Debug)]
pub struct Sprite {
    /// Pool identity.
    id: ResourceId,
    /// Frame shown.
    sprite: SpriteId,
    /// Frame texels, row-major, shared across instances of the same frame.
    texels: Arc<[[u8; 4]]>,
    /// Uniform scale from texels to pixels.
    pub scale: f64,
    /// Top-left corner in target pixels.
    pub position: (u32, u32),
    /// Multiplicative tint.
    pub tint: [u8; 4],
    /// Container holding this sprite, if any.
    parent: Option<ContainerId>,
}

impl Sprite {
    /// Pool identity.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Frame shown.
    #[must_use]
    pub const fn sprite_id(&self) -> SpriteId {
        self.sprite
    }

    /// Edge length of the frame in texels.
    #[must_use]
    pub const fn native_size(&self) -> u32 {
        self.sprite.native_size()
    }

    /// Frame texels, row-major.
    #[must_use]
    pub fn texels(&self) -> &[[u8; 4]] {
        &self.texels
    }

    /// Edge length on the target after scaling.
    #[must_use]
    pub fn scaled_size(&self) -> u32 {
        (f64::from(self.native_size()) * self.scale).round() as u32
    }

    /// Container holding this sprite.
    #[must_use]
    pub const fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ContainerId>) {
        self.parent = parent;
    }
}

impl PoolResource for Sprite {
    type Key = SpriteId;

    fn pool_key(&self) -> SpriteId {
        self.sprite
    }

    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn reset(&mut self) {
        self.scale = 1.0;
        self.position = (0, 0);
        self.tint = WHITE;
    }
}

/// Builds sprites, caching frame texels per [`SpriteId`].
#[derive(Debug, Default)]
pub struct SpriteFactory {
    /// Decoded frames.
    frames: HashMap<SpriteId, Arc<[[u8; 4]]>>,
}

impl SpriteFactory {
    /// Number of distinct frames decoded so far.
    #[must_use]
    pub fn cached_frames(&self) -> usize {
        self.frames.len()
    }

    fn frame(&mut self, id: SpriteId) -> Arc<[[u8; 4]]> {
        Arc::clone(self.frames.entry(id).or_insert_with(|| decode_frame(id)))
    }
}

/// Produces a frame's texels from its sheet metadata.
///
/// Each frame is the sheet colour with a frame-specific shading pattern, so
/// neighbouring tiles on different frames read as texture, not noise.
fn decode_frame(id: SpriteId) -> Arc<[[u8; 4]]> {
    match id {
        SpriteId::Solid => Arc::from(vec![WHITE]),
        SpriteId::Terrain { biome, frame } => {
            let sheet = biome.sheet();
            let size = sheet.native_size;
            let [r, g, b] = sheet.base_color;
            let frame = u32::from(frame);
            let texels: Vec<[u8; 4]> = (0..size * size)
                .map(|i| {
                    let (u, v) = (i % size, i / size);
                    let shade = ((u * 7 + v * 13 + frame * 5) % 9) as i16 - 4;
                    let channel = |c: u8| (i16::from(c) + shade * 3).clamp(0, 255) as u8;
                    [channel(r), channel(g), channel(b), 255]
                })
                .collect();
            texels.into()
        }
    }
}

impl ResourceFactory<Sprite> for SpriteFactory {
    fn create(&mut self, key: &SpriteId, id: ResourceId) -> Sprite {
        Sprite {
            id,
            sprite: *key,
            texels: self.frame(*key),
            scale: 1.0,
            position: (0, 0),
            tint: WHITE,
            parent: None,
        }
    }

    fn destroy(&mut self, _sprite: Sprite) {}
}

/// Proof of one sprite borrow. Hand it back with the sprite.
#[must_use = "a sprite borrow must be released"]
#[derive(Debug)]
pub struct SpriteRelease {
    /// Sprite this token belongs to.
    id: ResourceId,
}

/// Pool of tile sprites.
pub struct SpritePool {
    /// Underlying lending pool.
    pool: ResourcePool<Sprite, SpriteFactory>,
}

impl SpritePool {
    /// Creates a pool keeping at most `max_idle` idle sprites.
    ///
    /// # Panics
    ///
    /// Panics if `max_idle` is zero.
    #[must_use]
    pub fn new(max_idle: usize) -> Self {
        Self {
            pool: ResourcePool::new("sprites", SpriteFactory::default(), max_idle),
        }
    }

    /// Borrows a sprite showing `id`.
    pub fn borrow(&mut self, id: SpriteId) -> (Sprite, SpriteRelease) {
        let sprite = self.pool.borrow(&id);
        let token = SpriteRelease { id: sprite.id };
        (sprite, token)
    }

    /// Gives a sprite back.
    ///
    /// # Panics
    ///
    /// Panics if the sprite is still in a container, or if `token` was issued
    /// for a different sprite.
    pub fn release(&mut self, sprite: Sprite, token: SpriteRelease) {
        assert!(
            sprite.parent.is_none(),
            "sprite {} released while attached to container {:?}",
            sprite.id.value(),
            sprite.parent
        );
        assert_eq!(
            sprite.id, token.id,
            "release token does not belong to this sprite"
        );
        self.pool.release(sprite);
    }

    /// Idle sprites.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.pool.idle_count()
    }

    /// Borrowed sprites.
    #[must_use]
    pub fn borrowed_count(&self) -> usize {
        self.pool.borrowed_count()
    }

    /// Bound on idle sprites.
    #[must_use]
    pub const fn max_idle(&self) -> usize {
        self.pool.max_idle()
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// The factory.
    #[must_use]
    pub const fn factory(&self) -> &SpriteFactory {
        self.pool.factory()
    }
}
