//! Subscriber types for the reactive system.
//!
//! A Subscriber is a notification callback registered on a signal. Effects
//! and memos register one per dependency; drivers never touch them directly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a subscriber.
///
/// Each effect gets a unique ID when created. The ID is used to remove its
/// subscriptions again when it is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification callback shared between a signal and its snapshot lists.
pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// A subscriber to a reactive value.
///
/// Cloning is cheap: the callback is reference counted so a signal can take a
/// snapshot of its subscribers before invoking them.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    notify: Notify,
}

impl Subscriber {
    /// Create a subscriber with a fresh ID.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_id(SubscriberId::new(), Arc::new(notify))
    }

    /// Create a subscriber for an existing ID.
    pub fn with_id(id: SubscriberId, notify: Notify) -> Self {
        Self { id, notify }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Notify the subscriber that one of its dependencies changed.
    pub fn notify(&self) {
        (self.notify)();
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn fresh_subscribers_get_distinct_ids() {
        let ids: Vec<SubscriberId> = (0..3).map(|_| Subscriber::new(|| {}).id()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn one_id_many_registrations_share_a_callback() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();
        let notify: Notify = Arc::new(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        });

        // An effect hands the same id and callback to each dependency.
        let id = SubscriberId::default();
        let on_first = Subscriber::with_id(id, notify.clone());
        let on_second = Subscriber::with_id(id, notify);
        assert_eq!(on_first.id(), on_second.id());

        on_first.clone().notify();
        on_second.notify();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
