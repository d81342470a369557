//! # Texture Builder
//!
//! Composites a chunk's tiles into one background texture.
//!
//! ## Per-build lifecycle
//!
//! ```text
//! tiles ─► borrow sprite ─► scale + place ─► scratch container
//!                                                 │
//!            borrow chunk texture ◄───────────────┘
//!                  │
//!            rasterize (one pass) ─► clear container ─► release sprites
//! ```
//!
//! Sprite borrows are net zero per call. The texture's ownership moves to
//! the caller, who returns it to the texture pool on unload.

use haven_shared::{Tile, TileFill, WorldConstants};
use tracing::trace;

use crate::container::Container;
use crate::rasterizer::{Rasterizer, SoftwareRasterizer};
use crate::sprite::{SpriteId, SpritePool, WHITE};
use crate::texture::{RenderTexture, TexturePool, TextureSize};

/// Builds chunk backgrounds.
pub struct TextureBuilder<R: Rasterizer = SoftwareRasterizer> {
    /// Shared sizes.
    constants: WorldConstants,
    /// Tile sprites, lent per build.
    sprites: SpritePool,
    /// Staging area for one pass.
    scratch: Container,
    /// Draws the scratch container.
    rasterizer: R,
    /// Backgrounds built.
    built: u64,
}

impl TextureBuilder {
    /// Creates a builder with the software rasterizer.
    ///
    /// `sprite_capacity` bounds the idle sprite set; one chunk's tile count
    /// is the natural choice.
    ///
    /// # Panics
    ///
    /// Panics if `sprite_capacity` is zero.
    #[must_use]
    pub fn new(constants: WorldConstants, sprite_capacity: usize) -> Self {
        Self::with_rasterizer(constants, sprite_capacity, SoftwareRasterizer::new())
    }
}

impl<R: Rasterizer> TextureBuilder<R> {
    /// Creates a builder drawing with `rasterizer`.
    ///
    /// # Panics
    ///
    /// Panics if `sprite_capacity` is zero.
    #[must_use]
    pub fn with_rasterizer(constants: WorldConstants, sprite_capacity: usize, rasterizer: R) -> Self {
        Self {
            constants,
            sprites: SpritePool::new(sprite_capacity),
            scratch: Container::new(),
            rasterizer,
            built: 0,
        }
    }

    /// Size of every background this builder produces.
    #[must_use]
    pub const fn texture_size(&self) -> TextureSize {
        TextureSize::square(self.constants.chunk_pixel_size())
    }

    /// Composites `tiles` into a texture borrowed from `textures`.
    pub fn build_background(&mut self, tiles: &[Tile], textures: &mut TexturePool) -> RenderTexture {
        let tile_size = f64::from(self.constants.tile_size);
        let mut tokens = Vec::with_capacity(tiles.len());

        for tile in tiles {
            let (id, tint) = match tile.fill {
                TileFill::Sprite {
                    biome,
                    sprite_index,
                } => (SpriteId::terrain(biome, sprite_index), WHITE),
                TileFill::Color { color } => (SpriteId::Solid, color.to_rgba()),
            };

            let (mut sprite, token) = self.sprites.borrow(id);
            sprite.scale = tile_size / f64::from(sprite.native_size());
            sprite.position = (tile.x, tile.y);
            sprite.tint = tint;
            self.scratch.add(sprite);
            tokens.push(token);
        }

        let mut texture = textures.borrow(&self.texture_size());
        self.rasterizer.render(&self.scratch, &mut texture);

        for (sprite, token) in self.scratch.clear().into_iter().zip(tokens) {
            self.sprites.release(sprite, token);
        }

        self.built += 1;
        trace!(
            tiles = tiles.len(),
            texture = texture.id().value(),
            "built chunk background"
        );
        texture
    }

    /// The sprite pool.
    #[must_use]
    pub const fn sprites(&self) -> &SpritePool {
        &self.sprites
    }

    /// The rasterizer.
    #[must_use]
    pub const fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Backgrounds built so far.
    #[must_use]
    pub const fn built(&self) -> u64 {
        self.built
    }
}
