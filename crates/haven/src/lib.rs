//! # HAVEN
//!
//! Chunk streaming for an unbounded 2D tile world, integrating the
//! procedural store, the background pipeline and the resident registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HAVEN SESSION                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  PositionFeed ──> StreamingManager ──> EntityCollaborator       │
//! │                     │        │                                  │
//! │          ChunkProvider    TextureBuilder + TexturePool          │
//! │           │        │             │                              │
//! │     ChunkStore  ChunkTransport   └──> Chunk ──> ChunkRegistry   │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML world configuration
//! - `events`: chunk lifecycle notifications
//! - `observer`: observer position feed
//! - `provider`: chunk data sources
//! - `streaming`: the visibility window and the streaming manager

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod observer;
pub mod provider;
pub mod streaming;

// Re-export the layers
pub use haven_core as core;
pub use haven_procedural as procedural;
pub use haven_rendering as rendering;
pub use haven_shared as shared;

// Re-export commonly used types
pub use config::{RenderMode, StreamingConfig, WorldConfig, MAX_LOAD_RADIUS};
pub use error::{ConfigError, FetchError, ProviderError, TransportError};
pub use events::{
    ChannelCollaborator, ChunkEvent, ChunkEventReceiver, EntityCollaborator, EntityLayer,
    NullCollaborator,
};
pub use observer::{PositionFeed, Subscription};
pub use provider::{
    ChunkData, ChunkProvider, ChunkTransport, StoreProvider, TextureFetcher, TransportProvider,
};
pub use streaming::{
    StreamState, StreamUpdate, StreamingManager, StreamingStats, VisibilityWindow, WindowDiff,
};
