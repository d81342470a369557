//! # Lending Pool
//!
//! Bounded borrow/release pool for resources that are costly to create.

use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

/// Process-unique identity of a pooled (or poolable) resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

impl ResourceId {
    /// Allocates a fresh id. Ids are never reused within a process.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A resource that can live in a [`ResourcePool`].
pub trait PoolResource {
    /// Reuse key. Only an idle resource with an equal key satisfies a borrow.
    type Key: Clone + Eq + Hash + Debug;

    /// The key this resource was created for.
    fn pool_key(&self) -> Self::Key;

    /// Identity assigned at creation.
    fn resource_id(&self) -> ResourceId;

    /// Clears per-use state before the resource goes idle.
    fn reset(&mut self);
}

/// Creates and destroys resources on behalf of a pool.
pub trait ResourceFactory<R: PoolResource> {
    /// Allocates a new resource for `key` carrying identity `id`.
    fn create(&mut self, key: &R::Key, id: ResourceId) -> R;

    /// Frees a resource for good.
    fn destroy(&mut self, resource: R);
}

/// Lifetime counters of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources created because no idle one matched.
    pub created: u64,
    /// Borrows served from the idle set.
    pub reused: u64,
    /// Successful releases.
    pub released: u64,
    /// Idle resources destroyed to stay within capacity.
    pub evicted: u64,
    /// Releases of resources this pool was not lending.
    pub rejected: u64,
    /// Resources handed back to the factory for good.
    pub destroyed: u64,
}

/// A bounded lending pool.
///
/// Every resource is either borrowed (held by exactly one caller), idle
/// (owned by the pool) or destroyed. `borrow` never fails: with no matching
/// idle resource it creates one. `release` puts a resource back; when the
/// idle set is full the oldest idle entry is destroyed first. Borrowed
/// resources are never evicted.
///
/// # Thread Safety
///
/// Not thread-safe. The pool belongs to the update loop.
pub struct ResourcePool<R: PoolResource, F> {
    /// Name used in logs.
    name: &'static str,
    /// Creates and destroys resources.
    factory: F,
    /// Idle resources, oldest first.
    idle: VecDeque<R>,
    /// Ids currently lent out.
    borrowed: HashSet<ResourceId>,
    /// Bound on the idle set.
    max_idle: usize,
    /// Counters.
    stats: PoolStats,
}

impl<R, F> ResourcePool<R, F>
where
    R: PoolResource,
    F: ResourceFactory<R>,
{
    /// Creates a pool that keeps at most `max_idle` idle resources.
    ///
    /// # Panics
    ///
    /// Panics if `max_idle` is zero.
    #[must_use]
    pub fn new(name: &'static str, factory: F, max_idle: usize) -> Self {
        assert!(max_idle > 0, "Pool capacity must be greater than zero");

        Self {
            name,
            factory,
            idle: VecDeque::with_capacity(max_idle),
            borrowed: HashSet::new(),
            max_idle,
            stats: PoolStats::default(),
        }
    }

    /// Lends a resource for `key`, reusing the oldest matching idle one.
    pub fn borrow(&mut self, key: &R::Key) -> R {
        let reusable = self.idle.iter().position(|r| r.pool_key() == *key);
        let resource = match reusable.and_then(|index| self.idle.remove(index)) {
            Some(resource) => {
                self.stats.reused += 1;
                resource
            }
            None => {
                self.stats.created += 1;
                self.factory.create(key, ResourceId::next())
            }
        };

        let id = resource.resource_id();
        self.borrowed.insert(id);
        trace!(pool = self.name, id = id.value(), ?key, "borrow");
        resource
    }

    /// Takes a borrowed resource back.
    ///
    /// A resource this pool is not currently lending is logged and destroyed;
    /// it never enters the idle set.
    pub fn release(&mut self, mut resource: R) {
        let id = resource.resource_id();
        if !self.borrowed.remove(&id) {
            warn!(
                pool = self.name,
                id = id.value(),
                "release of a resource this pool is not lending, destroying it"
            );
            self.stats.rejected += 1;
            self.stats.destroyed += 1;
            self.factory.destroy(resource);
            return;
        }

        resource.reset();

        if self.idle.len() >= self.max_idle {
            if let Some(oldest) = self.idle.pop_front() {
                trace!(pool = self.name, id = oldest.resource_id().value(), "evict");
                self.stats.evicted += 1;
                self.stats.destroyed += 1;
                self.factory.destroy(oldest);
            }
        }

        self.idle.push_back(resource);
        self.stats.released += 1;
        trace!(pool = self.name, id = id.value(), "release");
    }

    /// Returns whether `id` is currently lent out by this pool.
    #[inline]
    #[must_use]
    pub fn is_borrowed(&self, id: ResourceId) -> bool {
        self.borrowed.contains(&id)
    }

    /// Number of idle resources.
    #[inline]
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Number of resources lent out.
    #[inline]
    #[must_use]
    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }

    /// Bound on the idle set.
    #[inline]
    #[must_use]
    pub const fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Lifetime counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// The factory.
    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Destroys every idle resource. Borrowed resources are untouched.
    pub fn clear(&mut self) {
        while let Some(resource) = self.idle.pop_front() {
            self.stats.destroyed += 1;
            self.factory.destroy(resource);
        }
    }
}

impl<R: PoolResource, F> Drop for ResourcePool<R, F> {
    fn drop(&mut self) {
        if !self.borrowed.is_empty() {
            warn!(
                pool = self.name,
                outstanding = self.borrowed.len(),
                "pool dropped while resources are still borrowed"
            );
        }
    }
}
