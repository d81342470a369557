//! # HAVEN Rendering
//!
//! Chunk backgrounds and the resident scene.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  BACKGROUND PIPELINE                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  Tiles → Sprite Pool → Scratch Container → Rasterizer    │
//! │                                  ↓                        │
//! │              Texture Pool → Chunk Background              │
//! │                                  ↓                        │
//! │                 Chunk → Chunk Registry                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - One background texture per chunk; tiles never become scene nodes
//! - Every pooled texture goes back to the pool when its chunk is destroyed
//! - Sprite borrows are net zero per build

#![deny(unsafe_code)]

pub mod builder;
pub mod chunk;
pub mod container;
pub mod rasterizer;
pub mod registry;
pub mod sprite;
pub mod texture;

pub use builder::TextureBuilder;
pub use chunk::{Chunk, ChunkError, Node, NodeContent, NodeId, TextureOrigin};
pub use container::{Container, ContainerId};
pub use rasterizer::{Rasterizer, SoftwareRasterizer};
pub use registry::ChunkRegistry;
pub use sprite::{Sprite, SpriteFactory, SpriteId, SpritePool, SpriteRelease, WHITE};
pub use texture::{texture_pool, RenderTexture, TextureAllocator, TexturePool, TextureSize};
