//! Scratch container used to stage sprites for one rasterizer pass.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::sprite::Sprite;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    fn next() -> Self {
        Self(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An ordered group of sprites, drawn back to front in insertion order.
#[derive(Debug)]
pub struct Container {
    /// Identity written into each child's parent link.
    id: ContainerId,
    /// Children, in draw order.
    children: Vec<Sprite>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ContainerId::next(),
            children: Vec::new(),
        }
    }

    /// Identity.
    #[must_use]
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Attaches a sprite at the top of the draw order.
    pub fn add(&mut self, mut sprite: Sprite) {
        sprite.set_parent(Some(self.id));
        self.children.push(sprite);
    }

    /// Children in draw order.
    #[must_use]
    pub fn children(&self) -> &[Sprite] {
        &self.children
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Detaches and returns every child, in draw order.
    pub fn clear(&mut self) -> Vec<Sprite> {
        let mut children = std::mem::take(&mut self.children);
        for sprite in &mut children {
            sprite.set_parent(None);
        }
        children
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{SpriteId, SpritePool};

    #[test]
    fn test_add_and_clear_track_parent() {
        let mut pool = SpritePool::new(4);
        let mut container = Container::new();

        let (a, ta) = pool.borrow(SpriteId::Solid);
        let (b, tb) = pool.borrow(SpriteId::Solid);
        container.add(a);
        container.add(b);

        assert_eq!(container.len(), 2);
        assert!(container
            .children()
            .iter()
            .all(|s| s.parent() == Some(container.id())));

        let mut detached = container.clear();
        assert!(container.is_empty());
        assert!(detached.iter().all(|s| s.parent().is_none()));

        let b = detached.pop().unwrap();
        let a = detached.pop().unwrap();
        pool.release(a, ta);
        pool.release(b, tb);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Container::new().id(), Container::new().id());
    }
}
