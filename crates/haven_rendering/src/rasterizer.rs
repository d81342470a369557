//! Rasterizers: draw a container of sprites into a render texture in one pass.

use crate::container::Container;
use crate::texture::RenderTexture;

/// Draws staged sprites into a target.
pub trait Rasterizer {
    /// Clears `target` and draws every child of `container`, in order.
    fn render(&mut self, container: &Container, target: &mut RenderTexture);
}

/// CPU rasterizer: nearest-neighbour scaling with a multiplicative tint.
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    /// Passes run.
    passes: u64,
    /// Sprites drawn across all passes.
    sprites_drawn: u64,
}

impl SoftwareRasterizer {
    /// Creates a rasterizer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            passes: 0,
            sprites_drawn: 0,
        }
    }

    /// Passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Sprites drawn so far.
    #[must_use]
    pub const fn sprites_drawn(&self) -> u64 {
        self.sprites_drawn
    }
}

#[inline]
fn tinted(texel: [u8; 4], tint: [u8; 4]) -> [u8; 4] {
    let mul = |a: u8, b: u8| ((u16::from(a) * u16::from(b) + 127) / 255) as u8;
    [
        mul(texel[0], tint[0]),
        mul(texel[1], tint[1]),
        mul(texel[2], tint[2]),
        mul(texel[3], tint[3]),
    ]
}

impl Rasterizer for SoftwareRasterizer {
    fn render(&mut self, container: &Container, target: &mut RenderTexture) {
        target.fill(RenderTexture::CLEAR);
        let size = target.size();
        let width = size.width as usize;
        let pixels = target.pixels_mut();

        for sprite in container.children() {
            let native = sprite.native_size();
            let extent = sprite.scaled_size();
            if native == 0 || extent == 0 {
                continue;
            }
            let (left, top) = sprite.position;
            let right = left.saturating_add(extent).min(size.width);
            let bottom = top.saturating_add(extent).min(size.height);
            let texels = sprite.texels();

            for y in top..bottom {
                let v = (u64::from(y - top) * u64::from(native) / u64::from(extent)) as usize;
                let row = y as usize * width;
                for x in left..right {
                    let u = (u64::from(x - left) * u64::from(native) / u64::from(extent)) as usize;
                    if let Some(texel) = texels.get(v * native as usize + u) {
                        pixels[row + x as usize] = tinted(*texel, sprite.tint);
                    }
                }
            }
            self.sprites_drawn += 1;
        }

        self.passes += 1;
    }
}
