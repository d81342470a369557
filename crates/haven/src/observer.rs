//! Observer position feed.
//!
//! Producers publish positions; listeners registered with
//! [`PositionFeed::on_position_changed`] are called in registration order.
//! A registration lives as long as its [`Subscription`].

use std::sync::{Arc, Weak};

use haven_shared::WorldPosition;
use parking_lot::Mutex;

type Listener = Box<dyn FnMut(WorldPosition) + Send>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Broadcasts observer positions.
///
/// Cloning yields another handle to the same feed. Listeners run on the
/// publishing thread while the feed is locked, so a listener must not
/// subscribe to or publish on the feed that is calling it.
#[derive(Clone, Default)]
pub struct PositionFeed {
    listeners: Arc<Mutex<Listeners>>,
}

impl PositionFeed {
    /// Creates a feed with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered until the returned
    /// subscription is dropped or [`Subscription::unsubscribe`]d.
    pub fn on_position_changed<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(WorldPosition) + Send + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Box::new(listener)));
        Subscription {
            id,
            feed: Arc::downgrade(&self.listeners),
        }
    }

    /// Calls every listener with `position`.
    pub fn publish(&self, position: WorldPosition) {
        for (_, listener) in &mut self.listeners.lock().entries {
            listener(position);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

/// A listener registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    feed: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Unsubscribes now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.feed.upgrade() {
            listeners.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_listeners_until_unsubscribed() {
        let feed = PositionFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = feed.on_position_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        feed.publish(WorldPosition::new(1.0, 2.0));
        feed.publish(WorldPosition::new(3.0, 4.0));
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        feed.publish(WorldPosition::new(5.0, 6.0));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(feed.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes_only_its_listener() {
        let feed = PositionFeed::new();
        let a = feed.on_position_changed(|_| {});
        let b = feed.on_position_changed(|_| {});
        assert_eq!(feed.listener_count(), 2);
        drop(a);
        assert_eq!(feed.listener_count(), 1);
        drop(b);
        assert_eq!(feed.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_feed_is_harmless() {
        let feed = PositionFeed::new();
        let sub = feed.on_position_changed(|_| {});
        drop(feed);
        drop(sub);
    }
}
