//! Linked Signals
//!
//! A linked signal is writable like a [`Signal`] but resets itself from a
//! computation whenever one of its dependencies changes. Local writes stick
//! until the next dependency change.
//!
//! Values are compared structurally, so a recomputation that yields an equal
//! (freshly allocated) value does not notify.

use std::fmt::{self, Debug};

use parking_lot::Mutex;

use super::effect::Effect;
use super::signal::{ReadSignal, Readable, Signal, Trackable};

/// The source and value a linked signal held before its source changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Previous<S, T> {
    pub source: S,
    pub value: T,
}

/// A writable signal that is recomputed when its dependencies change.
///
/// Clones share the value. Tracking stops once the last clone is dropped.
pub struct LinkedSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Signal<T>,
    effect: Effect,
}

/// Create a linked signal over `deps`, recomputed with `compute`.
///
/// # Example
///
/// ```rust
/// use tempo_core::reactive::{deep_linked_signal, Signal};
///
/// let options = Signal::new(vec!["a", "b"]);
/// let reader = options.clone();
/// let selected = deep_linked_signal(&[&options], move || reader.get()[0]);
///
/// selected.set("b");
/// assert_eq!(selected.get(), "b");
///
/// options.set(vec!["c"]);
/// assert_eq!(selected.get(), "c");
/// ```
pub fn deep_linked_signal<T, F>(deps: &[&dyn Trackable], compute: F) -> LinkedSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
    F: Fn() -> T + Send + 'static,
{
    let value = Signal::new(compute());
    let writer = value.clone();
    let effect = Effect::watch_lazy(deps, move |_| {
        writer.set(compute());
    });
    LinkedSignal { value, effect }
}

impl<T> LinkedSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a linked signal over a single `source`.
    ///
    /// `compute` receives the new source value and, after the first change,
    /// the previous source together with the value the signal held (local
    /// writes included).
    pub fn with_source<S, R, F>(source: &R, compute: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        R: Readable<S> + Clone + 'static,
        F: Fn(&S, Option<&Previous<S, T>>) -> T + Send + 'static,
    {
        let initial = source.get();
        let value = Signal::new(compute(&initial, None));
        let last = Mutex::new(initial);

        let writer = value.clone();
        let reader = source.clone();
        let effect = Effect::watch_lazy(&[source], move |_| {
            let current = reader.get();
            let previous = Previous {
                source: std::mem::replace(&mut *last.lock(), current.clone()),
                value: writer.get(),
            };
            writer.set(compute(&current, Some(&previous)));
        });

        Self { value, effect }
    }
}

impl<T> LinkedSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Overwrite the value until the next dependency change.
    pub fn set(&self, value: T) -> bool {
        self.value.set(value)
    }

    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        self.value.update(f)
    }

    pub fn read_only(&self) -> ReadSignal<T> {
        self.value.read_only()
    }

    /// Number of recomputations triggered by dependency changes.
    pub fn recompute_count(&self) -> usize {
        self.effect.run_count()
    }
}

impl<T> Clone for LinkedSignal<T>
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

impl<T> Debug for LinkedSignal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedSignal")
            .field("value", &self.get())
            .field("recompute_count", &self.recompute_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subscriber;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn local_writes_hold_until_the_source_changes() {
        let page_size = Signal::new(10);
        let reader = page_size.clone();
        let page = deep_linked_signal(&[&page_size], move || reader.get() * 2);
        assert_eq!(page.get(), 20);

        page.set(7);
        assert_eq!(page.get(), 7);

        page_size.set(20);
        assert_eq!(page.get(), 40);
        assert_eq!(page.recompute_count(), 1);
    }

    #[test]
    fn structurally_equal_recomputation_does_not_notify() {
        let source = Signal::new(1);
        let reader = source.clone();
        let linked = deep_linked_signal(&[&source], move || vec![reader.get() % 2; 3]);

        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = notified.clone();
        linked.read_only().subscribe(Subscriber::new(move || {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }));

        source.set(3);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        source.set(4);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(linked.get(), vec![0, 0, 0]);
    }

    type Names = Vec<&'static str>;

    fn keep_selection(options: &Names, previous: Option<&Previous<Names, &'static str>>) -> &'static str {
        match previous {
            Some(previous) if options.contains(&previous.value) => previous.value,
            _ => options[0],
        }
    }

    #[test]
    fn source_form_sees_the_previous_state() {
        let options: Signal<Names> = Signal::new(vec!["a", "b", "c"]);
        let selected = LinkedSignal::with_source(&options, keep_selection);
        assert_eq!(selected.get(), "a");

        selected.set("c");
        options.set(vec!["b", "c"]);
        assert_eq!(selected.get(), "c");

        options.set(vec!["x", "y"]);
        assert_eq!(selected.get(), "x");
    }

    #[test]
    fn dropping_the_last_clone_stops_tracking() {
        let source = Signal::new(0);
        let reader = source.clone();
        let linked = deep_linked_signal(&[&source], move || reader.get());
        assert_eq!(source.subscriber_count(), 1);

        drop(linked);
        assert_eq!(source.subscriber_count(), 0);
    }
}
