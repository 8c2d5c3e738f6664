//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and a list
//! of subscribers that are notified, synchronously, whenever the value
//! changes.
//!
//! # Equality Gating
//!
//! Every signal carries an equality predicate. A write whose new value is
//! equal to the stored one is dropped without notifying anyone. The default
//! predicate is `PartialEq`, which for Rust containers is already a structural
//! (deep) comparison; [`Signal::with_equality`] installs any other predicate.
//!
//! # Re-entrancy
//!
//! No lock is held while subscribers run. A subscriber may read or write the
//! signal that notified it, subscribe, or unsubscribe. Notification iterates a
//! snapshot of the subscriber list taken when the write happened.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::subscriber::{Subscriber, SubscriberId};

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique signal ID.
fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Equality predicate deciding whether a write is a change.
pub type Equality<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Something an effect can depend on.
///
/// The trait is object safe so effects can hold heterogeneous dependency
/// lists.
pub trait Trackable: Send + Sync {
    /// Unique ID of the underlying reactive value.
    fn id(&self) -> u64;

    /// Register a subscriber. Re-registering an ID replaces its callback.
    fn subscribe(&self, subscriber: Subscriber);

    /// Remove a subscriber. Unknown IDs are ignored.
    fn unsubscribe(&self, id: SubscriberId);

    /// Clone into a boxed trait object.
    fn boxed(&self) -> Box<dyn Trackable>;
}

/// A [`Trackable`] whose current value can be read.
pub trait Readable<T>: Trackable {
    /// Get a clone of the current value.
    fn get(&self) -> T;
}

struct SignalInner<T> {
    value: RwLock<T>,
    equals: Equality<T>,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// A reactive signal holding a value of type T.
///
/// Clones share the same value and subscribers.
///
/// # Example
///
/// ```rust
/// use tempo_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// assert!(count.set(5));
/// assert!(!count.set(5)); // equal value, nobody is notified
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    id: u64,
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new signal compared with `PartialEq`.
    pub fn new(value: T) -> Self {
        Self::with_equality(value, |a: &T, b: &T| a == b)
    }
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with a custom equality predicate.
    pub fn with_equality<F>(value: T, equals: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            id: next_signal_id(),
            inner: Arc::new(SignalInner {
                value: RwLock::new(value),
                equals: Box::new(equals),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Store a new value and notify subscribers.
    ///
    /// Returns `false`, without notifying, when the value is equal to the
    /// current one.
    pub fn set(&self, value: T) -> bool {
        {
            let mut guard = self.inner.value.write();
            if (self.inner.equals)(&guard, &value) {
                return false;
            }
            *guard = value;
        }

        self.notify_subscribers();
        true
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.inner.value.read());
        self.set(new_value)
    }

    /// A read-only view sharing this signal's state.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal(self.clone())
    }

    /// Register a subscriber.
    pub fn subscribe(&self, subscriber: Subscriber) {
        let mut subscribers = self.inner.subscribers.lock();
        match subscribers.iter_mut().find(|s| s.id() == subscriber.id()) {
            Some(existing) => *existing = subscriber,
            None => subscribers.push(subscriber),
        }
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.inner
            .subscribers
            .lock()
            .retain(|s| s.id() != subscriber_id);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    fn notify_subscribers(&self) {
        let snapshot = self.inner.subscribers.lock().clone();
        for subscriber in &snapshot {
            subscriber.notify();
        }
    }
}

/// Create a signal that compares values structurally.
///
/// A write of a value that is equal element for element (but freshly
/// allocated) does not notify.
pub fn deep_signal<T>(value: T) -> Signal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    Signal::new(value)
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.inner.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl<T> Trackable for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> u64 {
        self.id
    }

    fn subscribe(&self, subscriber: Subscriber) {
        Signal::subscribe(self, subscriber);
    }

    fn unsubscribe(&self, id: SubscriberId) {
        Signal::unsubscribe(self, id);
    }

    fn boxed(&self) -> Box<dyn Trackable> {
        Box::new(self.clone())
    }
}

impl<T> Readable<T> for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        Signal::get(self)
    }
}

/// Read-only view of a [`Signal`].
///
/// Drivers publish their outputs as `ReadSignal`s so only the driver can
/// write them.
pub struct ReadSignal<T>(Signal<T>)
where
    T: Clone + Send + Sync + 'static;

impl<T> ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the underlying signal's ID.
    pub fn id(&self) -> u64 {
        self.0.id()
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.0.get()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.0.with(f)
    }

    /// Register a subscriber.
    pub fn subscribe(&self, subscriber: Subscriber) {
        self.0.subscribe(subscriber);
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.0.unsubscribe(subscriber_id);
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscriber_count()
    }
}

impl<T> Clone for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Debug for ReadSignal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadSignal").field(&self.0).finish()
    }
}

impl<T> Trackable for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> u64 {
        self.0.id()
    }

    fn subscribe(&self, subscriber: Subscriber) {
        self.0.subscribe(subscriber);
    }

    fn unsubscribe(&self, id: SubscriberId) {
        self.0.unsubscribe(id);
    }

    fn boxed(&self) -> Box<dyn Trackable> {
        Box::new(self.clone())
    }
}

impl<T> Readable<T> for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.0.get()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
