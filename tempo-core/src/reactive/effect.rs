//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever one of its
//! dependencies changes.
//!
//! # How Effects Work
//!
//! 1. Dependencies are listed explicitly when the effect is created. The
//!    effect subscribes to each of them once, up front.
//!
//! 2. [`Effect::watch`] runs the function immediately; [`Effect::watch_lazy`]
//!    waits for the first change.
//!
//! 3. When any dependency changes, the effect re-runs synchronously, inside
//!    the write that caused the change.
//!
//! # Cleanup
//!
//! A run may register cleanup callbacks through [`EffectContext::on_cleanup`].
//! They are called before the next run and when the effect is disposed. Drivers
//! use this to cancel timers armed by the previous run.
//!
//! # Re-entrancy
//!
//! A dependency that changes while the effect is already running does not
//! start a nested run. The effect is marked pending and runs once more after
//! the current run returns.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::signal::Trackable;
use super::subscriber::{Notify, Subscriber, SubscriberId};

/// Counter for generating unique effect IDs.
static EFFECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique effect ID.
fn next_effect_id() -> u64 {
    EFFECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type Cleanup = Box<dyn FnOnce() + Send>;
type RunFn = Box<dyn FnMut(&mut EffectContext) + Send>;

/// Per-run context handed to an effect function.
pub struct EffectContext {
    run_count: usize,
    cleanups: Vec<Cleanup>,
}

impl EffectContext {
    /// Register a callback to run before the next run, or on disposal.
    pub fn on_cleanup<F>(&mut self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
    }

    /// Number of completed runs before this one.
    pub fn run_count(&self) -> usize {
        self.run_count
    }

    /// Whether this is the first run of the effect.
    pub fn is_first_run(&self) -> bool {
        self.run_count == 0
    }
}

/// Resets the running flag even if the effect function panics.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct EffectInner {
    id: u64,
    subscriber_id: SubscriberId,
    run: Mutex<RunFn>,
    cleanups: Mutex<Vec<Cleanup>>,
    dependencies: Mutex<Vec<Box<dyn Trackable>>>,
    disposed: AtomicBool,
    running: AtomicBool,
    pending: AtomicBool,
    run_count: AtomicUsize,
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        if self.running.swap(true, Ordering::SeqCst) {
            self.pending.store(true, Ordering::SeqCst);
            return;
        }
        let _guard = RunningGuard(&self.running);

        loop {
            self.pending.store(false, Ordering::SeqCst);
            self.run_cleanups();

            let mut cx = EffectContext {
                run_count: self.run_count.load(Ordering::SeqCst),
                cleanups: Vec::new(),
            };
            {
                let mut run = self.run.lock();
                (*run)(&mut cx);
            }
            self.run_count.fetch_add(1, Ordering::SeqCst);
            self.cleanups.lock().extend(cx.cleanups);

            if self.disposed.load(Ordering::SeqCst) {
                // Disposed from inside the run; dispose() left cleanup to us.
                self.run_cleanups();
                break;
            }
            if !self.pending.load(Ordering::SeqCst) {
                break;
            }
        }
    }

    fn run_cleanups(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.lock());
        for cleanup in cleanups {
            cleanup();
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let dependencies = std::mem::take(&mut *self.dependencies.lock());
        for dependency in &dependencies {
            dependency.unsubscribe(self.subscriber_id);
        }

        if !self.running.load(Ordering::SeqCst) {
            self.run_cleanups();
        }
    }
}

impl Drop for EffectInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// Clones share the same effect. The effect is disposed when [`dispose`] is
/// called or the last clone is dropped.
///
/// # Example
///
/// ```rust
/// use tempo_core::reactive::{Effect, Signal};
///
/// let count = Signal::new(0);
/// let reader = count.clone();
///
/// let effect = Effect::watch(&[&count], move |_| {
///     println!("Count is: {}", reader.get());
/// });
///
/// count.set(5); // Prints: "Count is: 5"
/// assert_eq!(effect.run_count(), 2);
/// ```
///
/// [`dispose`]: Effect::dispose
#[derive(Clone)]
pub struct Effect {
    inner: Arc<EffectInner>,
}

impl Effect {
    /// Create an effect over `deps` and run it immediately.
    pub fn watch<F>(deps: &[&dyn Trackable], run: F) -> Self
    where
        F: FnMut(&mut EffectContext) + Send + 'static,
    {
        let effect = Self::watch_lazy(deps, run);
        effect.execute();
        effect
    }

    /// Create an effect over `deps` without running it.
    ///
    /// The first run happens on the first dependency change.
    pub fn watch_lazy<F>(deps: &[&dyn Trackable], run: F) -> Self
    where
        F: FnMut(&mut EffectContext) + Send + 'static,
    {
        let inner = Arc::new(EffectInner {
            id: next_effect_id(),
            subscriber_id: SubscriberId::new(),
            run: Mutex::new(Box::new(run)),
            cleanups: Mutex::new(Vec::new()),
            dependencies: Mutex::new(deps.iter().map(|dep| dep.boxed()).collect()),
            disposed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            pending: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
        });

        let weak: Weak<EffectInner> = Arc::downgrade(&inner);
        let notify: Notify = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.execute();
            }
        });
        for dep in deps {
            dep.subscribe(Subscriber::with_id(inner.subscriber_id, notify.clone()));
        }

        Self { inner }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get the subscriber ID this effect registers on its dependencies.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Run the effect now, as if a dependency had changed.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Dispose of the effect.
    ///
    /// Unsubscribes from every dependency and runs pending cleanups. After
    /// disposal the effect never runs again. Disposing twice is a no-op.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of live dependencies.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.lock().len()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::AtomicI32;

    fn counter() -> (Arc<AtomicI32>, Arc<AtomicI32>) {
        let count = Arc::new(AtomicI32::new(0));
        (count.clone(), count)
    }

    #[test]
    fn effect_runs_on_creation() {
        let (run_count, run_count_clone) = counter();
        let _effect = Effect::watch(&[], move |_| {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_effect_waits_for_first_change() {
        let signal = Signal::new(0);
        let (run_count, run_count_clone) = counter();
        let effect = Effect::watch_lazy(&[&signal], move |_| {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(effect.run_count(), 0);
        signal.set(1);
        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effect_reruns_when_any_dependency_changes() {
        let a = Signal::new(0);
        let b = Signal::new("x");
        let effect = Effect::watch(&[&a, &b], |_| {});

        a.set(1);
        b.set("y");
        b.set("y");
        assert_eq!(effect.run_count(), 3);
        assert_eq!(effect.dependency_count(), 2);
    }

    #[test]
    fn cleanup_runs_before_rerun_and_on_dispose() {
        let signal = Signal::new(0);
        let (cleanups, cleanups_clone) = counter();

        let effect = Effect::watch(&[&signal], move |cx| {
            let cleanups = cleanups_clone.clone();
            cx.on_cleanup(move || {
                cleanups.fetch_add(1, Ordering::SeqCst);
            });
        });
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);

        signal.set(1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        effect.dispose();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);

        // Disposing again is a no-op.
        effect.dispose();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let signal = Signal::new(0);
        let effect = Effect::watch(&[&signal], |_| {});
        assert_eq!(effect.run_count(), 1);

        effect.dispose();
        assert!(effect.is_disposed());
        assert_eq!(signal.subscriber_count(), 0);

        signal.set(1);
        effect.execute();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn dropping_last_handle_unsubscribes() {
        let signal = Signal::new(0);
        let effect = Effect::watch(&[&signal], |_| {});
        assert_eq!(signal.subscriber_count(), 1);

        drop(effect);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn write_from_inside_run_is_deferred_not_nested() {
        let signal = Signal::new(0);
        let writer = signal.clone();
        let depth = Arc::new(AtomicI32::new(0));
        let max_depth = Arc::new(AtomicI32::new(0));
        let (depth_c, max_c) = (depth.clone(), max_depth.clone());

        let effect = Effect::watch(&[&signal], move |_| {
            let d = depth_c.fetch_add(1, Ordering::SeqCst) + 1;
            max_c.fetch_max(d, Ordering::SeqCst);
            if writer.get() < 3 {
                writer.update(|v| v + 1);
            }
            depth_c.fetch_sub(1, Ordering::SeqCst);
        });

        assert_eq!(signal.get(), 3);
        assert_eq!(max_depth.load(Ordering::SeqCst), 1);
        // Initial run plus one pending re-run per increment.
        assert_eq!(effect.run_count(), 4);
    }

    #[test]
    fn context_reports_first_run() {
        let signal = Signal::new(0);
        let firsts = Arc::new(Mutex::new(Vec::new()));
        let firsts_clone = firsts.clone();
        let _effect = Effect::watch(&[&signal], move |cx| {
            firsts_clone.lock().push((cx.is_first_run(), cx.run_count()));
        });
        signal.set(1);

        assert_eq!(*firsts.lock(), vec![(true, 0), (false, 1)]);
    }

    #[test]
    fn effect_clone_shares_state() {
        let effect1 = Effect::watch(&[], |_| {});
        let effect2 = effect1.clone();

        assert_eq!(effect1.id(), effect2.id());

        effect1.execute();
        assert_eq!(effect2.run_count(), 2);

        effect1.dispose();
        assert!(effect2.is_disposed());
    }
}
