//! Render textures and their pool.
//!
//! A chunk background is one `chunkPixelSize²` RGBA surface. Surfaces of a
//! given size are interchangeable, so the pool key is just the size.

use std::fmt;

use haven_core::{PoolResource, ResourceFactory, ResourceId, ResourcePool};
use tracing::trace;

/// Pixel dimensions of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextureSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A square size.
    #[must_use]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Number of pixels.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An RGBA render target.
#[derive(Debug)]
pub struct RenderTexture {
    /// Identity; pool-issued or fresh for external textures.
    id: ResourceId,
    /// Dimensions.
    size: TextureSize,
    /// Row-major RGBA pixels.
    pixels: Vec<[u8; 4]>,
}

impl RenderTexture {
    /// Fully transparent black.
    pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

    /// Wraps pixels that did not come from a pool, such as a texture
    /// fetched from a remote renderer.
    ///
    /// # Panics
    ///
    /// Panics if `pixels` does not hold exactly `size.area()` entries.
    #[must_use]
    pub fn from_rgba(size: TextureSize, pixels: Vec<[u8; 4]>) -> Self {
        assert_eq!(
            pixels.len(),
            size.area(),
            "pixel buffer does not match texture size {size}"
        );
        Self {
            id: ResourceId::next(),
            size,
            pixels,
        }
    }

    /// Identity.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Dimensions.
    #[must_use]
    pub const fn size(&self) -> TextureSize {
        self.size
    }

    /// Pixel at `(x, y)`, if inside the texture.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    /// Row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Mutable row-major pixels.
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }

    /// Raw bytes, ready for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Fills the texture with one colour.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        self.pixels.fill(rgba);
    }
}

impl PoolResource for RenderTexture {
    type Key = TextureSize;

    fn pool_key(&self) -> TextureSize {
        self.size
    }

    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn reset(&mut self) {
        self.fill(Self::CLEAR);
    }
}

/// Allocates render textures for the pool.
#[derive(Debug, Default)]
pub struct TextureAllocator {
    /// Textures allocated.
    allocated: u64,
    /// Textures freed.
    freed: u64,
}

impl TextureAllocator {
    /// Textures allocated so far.
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Textures freed so far.
    #[must_use]
    pub const fn freed(&self) -> u64 {
        self.freed
    }

    /// Textures currently alive (borrowed or idle).
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.allocated.saturating_sub(self.freed)
    }
}

impl ResourceFactory<RenderTexture> for TextureAllocator {
    fn create(&mut self, key: &TextureSize, id: ResourceId) -> RenderTexture {
        self.allocated += 1;
        trace!(id = id.value(), size = %key, "allocate render texture");
        RenderTexture {
            id,
            size: *key,
            pixels: vec![RenderTexture::CLEAR; key.area()],
        }
    }

    fn destroy(&mut self, texture: RenderTexture) {
        self.freed += 1;
        trace!(id = texture.id.value(), "free render texture");
    }
}

/// Pool of chunk background textures.
pub type TexturePool = ResourcePool<RenderTexture, TextureAllocator>;

/// Creates a texture pool keeping at most `max_idle` idle textures.
///
/// # Panics
///
/// Panics if `max_idle` is zero.
#[must_use]
pub fn texture_pool(max_idle: usize) -> TexturePool {
    ResourcePool::new("render-textures", TextureAllocator::default(), max_idle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_reuses_same_size_and_clears() {
        let mut pool = texture_pool(2);
        let size = TextureSize::square(4);

        let mut t = pool.borrow(&size);
        t.fill([1, 2, 3, 4]);
        let id = t.id();
        pool.release(t);

        let again = pool.borrow(&size);
        assert_eq!(again.id(), id);
        assert!(again.pixels().iter().all(|p| *p == RenderTexture::CLEAR));

        let other = pool.borrow(&TextureSize::square(8));
        assert_ne!(other.id(), id);
        assert_eq!(pool.factory().allocated(), 2);

        pool.release(again);
        pool.release(other);
    }

    #[test]
    fn test_external_texture_is_not_pooled() {
        let mut pool = texture_pool(2);
        let external = RenderTexture::from_rgba(TextureSize::square(2), vec![[9; 4]; 4]);
        pool.release(external);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.factory().freed(), 1);
    }

    #[test]
    fn test_bytes_and_pixels() {
        let mut texture = RenderTexture::from_rgba(TextureSize::new(2, 1), vec![[0; 4]; 2]);
        texture.pixels_mut()[1] = [10, 20, 30, 255];
        assert_eq!(texture.pixel(1, 0), Some([10, 20, 30, 255]));
        assert_eq!(texture.pixel(2, 0), None);
        assert_eq!(texture.as_bytes(), &[0, 0, 0, 0, 10, 20, 30, 255]);
    }

    #[test]
    #[should_panic(expected = "does not match texture size")]
    fn test_from_rgba_checks_length() {
        let _ = RenderTexture::from_rgba(TextureSize::square(2), vec![[0; 4]; 3]);
    }
}
