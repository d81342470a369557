//! Error types for the streaming layer.
//!
//! Everything here is recoverable. Invariant violations (a chunk missing
//! right after insertion, a sprite released while attached) panic instead.

use std::io;
use std::path::PathBuf;

use haven_rendering::TextureSize;
use haven_shared::{ChunkKey, ConstantsError, PayloadError};
use thiserror::Error;

/// Errors loading or validating a [`WorldConfig`](crate::WorldConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Not valid TOML, or fields of the wrong type.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Inconsistent world constants.
    #[error("invalid world constants: {0}")]
    Constants(#[from] ConstantsError),

    /// A pool or queue capacity of zero.
    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),

    /// An empty seed string.
    #[error("seed must not be empty")]
    EmptySeed,

    /// A load radius whose window would be unreasonably large.
    #[error("load radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge {
        /// Effective radius.
        radius: u32,
        /// Largest accepted radius.
        max: u32,
    },
}

/// Errors from a [`ChunkTransport`](crate::ChunkTransport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The far end could not be reached.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The far end has nothing for this key.
    #[error("no chunk {0} at the far end")]
    NotFound(ChunkKey),
}

/// Errors requesting a chunk from a [`ChunkProvider`](crate::ChunkProvider).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload failed decoding or validation.
    #[error("malformed payload: {0}")]
    Payload(#[from] PayloadError),

    /// The payload is for a different chunk than the one requested.
    #[error("requested chunk {requested}, received {received}")]
    WrongChunk {
        /// Key asked for.
        requested: ChunkKey,
        /// Key in the payload.
        received: ChunkKey,
    },
}

/// Errors fetching a remotely rendered texture.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The texture could not be fetched.
    #[error("texture {url} unavailable: {reason}")]
    Unavailable {
        /// Texture URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The fetched texture has the wrong dimensions.
    #[error("texture {url} is {found}, expected {expected}")]
    WrongSize {
        /// Texture URL.
        url: String,
        /// Chunk texture size.
        expected: TextureSize,
        /// Size received.
        found: TextureSize,
    },
}
