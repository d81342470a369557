//! Tiles: the per-cell render datum of a chunk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::biome::Biome;

/// A 24-bit RGB colour, written as a `#rrggbb` hex triplet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Creates a colour from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Creates an 8-bit grey.
    #[must_use]
    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Channels as `[r, g, b, 255]`.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8, 255]
    }

    /// Packed `0xRRGGBB` value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour {s:?} must start with '#'"))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("colour {s:?} must have six hex digits"));
        }
        u32::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| format!("colour {s:?} is not hexadecimal"))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// What a tile shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileFill {
    /// A flat quantized colour.
    Color {
        /// The colour.
        color: Color,
    },
    /// A frame from a biome sheet.
    Sprite {
        /// Biome whose sheet is used.
        biome: Biome,
        /// Frame index on the sheet.
        #[serde(rename = "spriteIndex")]
        sprite_index: u16,
    },
}

/// One grid cell of a chunk.
///
/// `x` and `y` are pixel offsets from the chunk origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// X offset in pixels.
    pub x: u32,
    /// Y offset in pixels.
    pub y: u32,
    /// What the tile shows.
    #[serde(flatten)]
    pub fill: TileFill,
}

impl Tile {
    /// Creates a flat-colour tile.
    #[must_use]
    pub const fn colored(x: u32, y: u32, color: Color) -> Self {
        Self {
            x,
            y,
            fill: TileFill::Color { color },
        }
    }

    /// Creates a biome sprite tile.
    #[must_use]
    pub const fn sprite(x: u32, y: u32, biome: Biome, sprite_index: u16) -> Self {
        Self {
            x,
            y,
            fill: TileFill::Sprite {
                biome,
                sprite_index,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::gray(0x7f).to_string(), "#7f7f7f");
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
        assert_eq!("#0a0b0c".parse::<Color>(), Ok(Color::rgb(10, 11, 12)));
        assert!("0a0b0c".parse::<Color>().is_err());
        assert!("#0a0b".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("#+fffff".parse::<Color>().is_err());
        assert!("# fffff".parse::<Color>().is_err());
        assert_eq!("#FFa000".parse::<Color>(), Ok(Color::rgb(255, 160, 0)));
        assert_eq!(Color::rgb(9, 8, 7).to_rgba(), [9, 8, 7, 255]);
    }

    #[test]
    fn test_tile_wire_shapes() {
        let gray = Tile::colored(64, 128, Color::gray(200));
        let json = serde_json::to_value(gray).unwrap();
        assert_eq!(json, serde_json::json!({"x": 64, "y": 128, "color": "#c8c8c8"}));

        let sprite = Tile::sprite(0, 64, Biome::Forest, 2);
        let json = serde_json::to_value(sprite).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"x": 0, "y": 64, "biome": "forest", "spriteIndex": 2})
        );

        let back: Tile = serde_json::from_value(json).unwrap();
        assert_eq!(back, sprite);
    }

    #[test]
    fn test_tile_rejects_missing_fill() {
        let bad = serde_json::json!({"x": 0, "y": 0});
        assert!(serde_json::from_value::<Tile>(bad).is_err());
    }
}
