//! Memo Implementation
//!
//! A Memo is a derived value computed from explicit dependencies.
//!
//! # How Memos Work
//!
//! 1. On creation the memo computes its initial value.
//!
//! 2. When a dependency changes, the memo recomputes immediately and writes
//!    the result into an internal signal.
//!
//! 3. That signal is equality gated, so a recomputation producing a value
//!    equal to the cached one does not notify the memo's own dependents.
//!
//! Step 3 is what lets a memo over fresh allocations (a new `Vec` each time)
//! stay quiet when nothing structurally changed.

use std::fmt::{self, Debug};

use super::effect::Effect;
use super::signal::{ReadSignal, Readable, Signal, Trackable};
use super::subscriber::{Subscriber, SubscriberId};

/// A cached derived value that recomputes when its dependencies change.
///
/// Clones share the cached value. The memo stops tracking its dependencies
/// once the last clone is dropped.
pub struct Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Signal<T>,
    effect: Effect,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a memo compared with `PartialEq`.
    pub fn new<F>(deps: &[&dyn Trackable], compute: F) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        Self::with_equality(deps, compute, |a: &T, b: &T| a == b)
    }
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a memo with a custom equality predicate.
    pub fn with_equality<F, E>(deps: &[&dyn Trackable], compute: F, equals: E) -> Self
    where
        F: Fn() -> T + Send + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let value = Signal::with_equality(compute(), equals);
        let writer = value.clone();
        let effect = Effect::watch_lazy(deps, move |_| {
            writer.set(compute());
        });

        Self { value, effect }
    }

    /// Get a clone of the cached value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Borrow the cached value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Get the memo's unique ID.
    pub fn id(&self) -> u64 {
        self.value.id()
    }

    /// A read-only view of the cached value.
    pub fn read_only(&self) -> ReadSignal<T> {
        self.value.read_only()
    }

    /// Number of recomputations triggered by dependency changes.
    pub fn recompute_count(&self) -> usize {
        self.effect.run_count()
    }

    /// Get the number of dependents.
    pub fn dependent_count(&self) -> usize {
        self.value.subscriber_count()
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.id())
            .field("value", &self.get())
            .field("recompute_count", &self.recompute_count())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

impl<T> Trackable for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> u64 {
        self.value.id()
    }

    fn subscribe(&self, subscriber: Subscriber) {
        self.value.subscribe(subscriber);
    }

    fn unsubscribe(&self, id: SubscriberId) {
        self.value.unsubscribe(id);
    }

    fn boxed(&self) -> Box<dyn Trackable> {
        Box::new(self.clone())
    }
}

impl<T> Readable<T> for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.value.get()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
