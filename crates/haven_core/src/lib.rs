//! # HAVEN Core
//!
//! Bounded lending pools for resources that are expensive to create and
//! destroy (render targets, sprite instances).
//!
//! ## Architecture Rules
//!
//! 1. **Explicit ownership** - pools are constructed and owned by whoever
//!    drives the update loop; there is no process-wide pool
//! 2. **Idle-only eviction** - a borrowed resource is never destroyed behind
//!    its borrower's back
//!
//! ## Example
//!
//! ```rust,ignore
//! use haven_core::ResourcePool;
//!
//! let mut pool = ResourcePool::new("textures", factory, 32);
//! let texture = pool.borrow(&size);
//! // ... render ...
//! pool.release(texture);
//! ```

#![deny(unsafe_code)]

pub mod memory;

pub use memory::{PoolResource, PoolStats, ResourceFactory, ResourceId, ResourcePool};
