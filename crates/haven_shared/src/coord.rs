//! Spatial addressing.
//!
//! Pure functions from world pixels to chunk coordinates and canonical keys.
//! Nothing here holds state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A position in world pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    /// X in pixels.
    pub x: f64,
    /// Y in pixels.
    pub y: f64,
}

impl WorldPosition {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in pixels relative to a chunk origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    /// X in pixels from the chunk's left edge.
    pub x: f64,
    /// Y in pixels from the chunk's top edge.
    pub y: f64,
}

impl LocalPosition {
    /// Creates a new local position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not pixels).
    pub x: i32,
    /// Y coordinate (in chunks, not pixels).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Maps a world position to the chunk containing it.
    ///
    /// Floors, so `-0.5` belongs to chunk `-1`. Non-finite inputs saturate
    /// instead of panicking, which keeps the mapping total.
    #[inline]
    #[must_use]
    pub fn from_world(position: WorldPosition, chunk_pixel_size: u32) -> Self {
        let size = f64::from(chunk_pixel_size);
        Self {
            x: (position.x / size).floor() as i32,
            y: (position.y / size).floor() as i32,
        }
    }

    /// World position of the chunk's top-left corner.
    #[inline]
    #[must_use]
    pub fn origin(self, chunk_pixel_size: u32) -> WorldPosition {
        let size = f64::from(chunk_pixel_size);
        WorldPosition::new(f64::from(self.x) * size, f64::from(self.y) * size)
    }

    /// Chebyshev distance in chunks: `max(|dx|, |dy|)`.
    #[inline]
    #[must_use]
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        dx.max(dy).min(u64::from(u32::MAX)) as u32
    }

    /// Canonical key for this coordinate.
    #[inline]
    #[must_use]
    pub const fn key(self) -> ChunkKey {
        ChunkKey(self)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors parsing a chunk key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// The text is not of the form `x,y`.
    #[error("malformed chunk key {0:?}, expected \"x,y\"")]
    MalformedKey(String),
}

/// Canonical identity of a chunk.
///
/// Text form is `"x,y"`. This is the only map key used for chunks anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(ChunkCoord);

impl ChunkKey {
    /// Creates a key from chunk integers.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self(ChunkCoord::new(x, y))
    }

    /// The coordinate this key names.
    #[inline]
    #[must_use]
    pub const fn coord(self) -> ChunkCoord {
        self.0
    }
}

impl From<ChunkCoord> for ChunkKey {
    fn from(coord: ChunkCoord) -> Self {
        Self(coord)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

impl FromStr for ChunkKey {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordError::MalformedKey(s.to_owned());
        let (x, y) = s.split_once(',').ok_or_else(malformed)?;
        let x = x.parse::<i32>().map_err(|_| malformed())?;
        let y = y.parse::<i32>().map_err(|_| malformed())?;
        let key = Self::new(x, y);
        // Only the canonical text names a key: no padding, signs or leading zeros.
        if key.to_string() != s {
            return Err(malformed());
        }
        Ok(key)
    }
}

impl Serialize for ChunkKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
