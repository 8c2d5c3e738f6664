//! Repeating callbacks with a tick count.

use std::fmt;
use std::sync::{Arc, Weak};

use super::{CallbackCell, IntervalDelay};
use crate::error::Result;
use crate::host::slot::TimerSlot;
use crate::reactive::{ReadSignal, Scope, Signal};

struct IntervalInner {
    count: Signal<u64>,
    active: Signal<bool>,
    delay: IntervalDelay,
    timer: TimerSlot,
    callback: CallbackCell,
}

impl IntervalInner {
    /// Replace the live timer according to the current activity and delay.
    fn rearm(self: &Arc<Self>) {
        self.timer.cancel();
        if !self.active.get() {
            return;
        }

        let period = self.delay.get();
        let weak: Weak<Self> = Arc::downgrade(self);
        let scheduled = self.timer.every(
            period,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick();
                }
            }),
        );
        if scheduled {
            tracing::debug!(period_ms = period.as_millis() as u64, "interval armed");
        } else {
            tracing::debug!("no timer service; interval never fires");
        }
    }

    fn tick(&self) {
        self.callback.run();
        self.count.update(|count| count + 1);
    }
}

/// A repeating callback with pause, resume and a tick counter.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::reactive::Scope;
/// use tempo_core::timing::Interval;
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let interval = Interval::new(&scope, Duration::from_millis(100), || {}).unwrap();
///
/// event_loop.advance(Duration::from_millis(350));
/// assert_eq!(interval.count().get(), 3);
///
/// interval.pause();
/// event_loop.advance(Duration::from_secs(1));
/// assert_eq!(interval.count().get(), 3);
/// ```
#[derive(Clone)]
pub struct Interval {
    inner: Arc<IntervalInner>,
}

impl Interval {
    /// Start calling `callback` every `delay`, beginning one period from now.
    pub fn new<D, F>(scope: &Scope, delay: D, callback: F) -> Result<Self>
    where
        D: Into<IntervalDelay>,
        F: FnMut() + Send + 'static,
    {
        scope.ensure_active()?;
        let inner = Arc::new(IntervalInner {
            count: Signal::new(0),
            active: Signal::new(true),
            delay: delay.into(),
            timer: TimerSlot::new(scope.host().timers().clone()),
            callback: CallbackCell::new(callback),
        });

        let driver = Arc::clone(&inner);
        scope.watch(&inner.delay.deps(&inner.active), move |_| driver.rearm())?;

        let teardown = Arc::downgrade(&inner);
        scope.on_dispose(move || {
            if let Some(inner) = teardown.upgrade() {
                inner.timer.cancel();
            }
        })?;

        Ok(Self { inner })
    }

    /// Number of completed ticks since creation or the last reset.
    pub fn count(&self) -> ReadSignal<u64> {
        self.inner.count.read_only()
    }

    /// Whether the repeating timer is armed.
    pub fn is_active(&self) -> ReadSignal<bool> {
        self.inner.active.read_only()
    }

    /// Stop ticking. The count is kept.
    pub fn pause(&self) {
        self.inner.active.set(false);
    }

    /// Start ticking again, a full period from now.
    pub fn resume(&self) {
        self.inner.active.set(true);
    }

    /// Zero the count and make sure the interval is running.
    ///
    /// A running interval keeps its current period phase.
    pub fn reset(&self) {
        self.inner.count.set(0);
        self.inner.active.set(true);
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interval")
            .field("count", &self.inner.count.get())
            .field("active", &self.inner.active.get())
            .field("delay", &self.inner.delay.get())
            .finish()
    }
}
