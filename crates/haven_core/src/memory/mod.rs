//! # Memory Management
//!
//! Lending pools for GPU-side and sprite resources.
//!
//! ## Design Philosophy
//!
//! Creating a render target is expensive; reusing one is cheap. Pools keep
//! returned resources idle for reuse, bounded by a capacity, and destroy the
//! oldest idle entry when that bound is hit.

mod pool;

pub use pool::{PoolResource, PoolStats, ResourceFactory, ResourceId, ResourcePool};
