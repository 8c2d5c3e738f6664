//! One-shot callbacks.
//!
//! A timeout arms on creation and on every reset. Reconfiguring it from inside
//! its own callback is allowed: a reset there arms a fresh timer and the
//! finished run does not mark the timeout ready.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::{CallbackCell, IntervalDelay};
use crate::error::Result;
use crate::host::slot::TimerSlot;
use crate::reactive::{ReadSignal, Scope, Signal};

/// Where a timeout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutState {
    /// Timer armed, callback not yet run.
    Pending,
    /// Callback ran.
    Ready,
    /// Cancelled before the callback ran.
    Cancelled,
    /// Nothing armed; the host cannot schedule timers.
    Idle,
}

struct TimeoutInner {
    ready: Signal<bool>,
    pending: Signal<bool>,
    resets: Signal<u64>,
    cancelled: AtomicBool,
    delay: IntervalDelay,
    timer: TimerSlot,
    callback: CallbackCell,
}

impl TimeoutInner {
    fn arm(self: &Arc<Self>) {
        self.timer.cancel();
        if self.cancelled.load(Ordering::SeqCst) {
            self.pending.set(false);
            return;
        }

        self.ready.set(false);
        let delay = self.delay.get();
        let weak: Weak<Self> = Arc::downgrade(self);
        let scheduled = self.timer.after(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire();
                }
            }),
        );
        if !scheduled {
            tracing::debug!("no timer service; timeout never fires");
        }
        self.pending.set(scheduled);
    }

    fn fire(&self) {
        self.timer.clear();
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        let generation = self.resets.get();
        self.callback.run();

        // The callback may have re-armed through `reset` or a new delay.
        if self.resets.get() != generation || self.timer.is_pending() {
            return;
        }
        self.ready.set(true);
        self.pending.set(false);
    }
}

/// A one-shot callback with cancel and reset.
///
/// The timer is armed on creation. A reactive delay re-arms it from zero
/// whenever the delay changes, unless the timeout was cancelled.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::reactive::Scope;
/// use tempo_core::timing::Timeout;
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let timeout = Timeout::new(&scope, Duration::from_millis(500), || {}).unwrap();
///
/// assert!(timeout.is_pending().get());
/// event_loop.advance(Duration::from_millis(500));
/// assert!(timeout.is_ready().get());
/// ```
#[derive(Clone)]
pub struct Timeout {
    inner: Arc<TimeoutInner>,
}

impl Timeout {
    /// Run `callback` once, `delay` from now.
    pub fn new<D, F>(scope: &Scope, delay: D, callback: F) -> Result<Self>
    where
        D: Into<IntervalDelay>,
        F: FnMut() + Send + 'static,
    {
        scope.ensure_active()?;
        let inner = Arc::new(TimeoutInner {
            ready: Signal::new(false),
            pending: Signal::new(true),
            resets: Signal::new(0),
            cancelled: AtomicBool::new(false),
            delay: delay.into(),
            timer: TimerSlot::new(scope.host().timers().clone()),
            callback: CallbackCell::new(callback),
        });

        let driver = Arc::clone(&inner);
        scope.watch(&inner.delay.deps(&inner.resets), move |_| driver.arm())?;

        let teardown = Arc::downgrade(&inner);
        scope.on_dispose(move || {
            if let Some(inner) = teardown.upgrade() {
                inner.timer.cancel();
            }
        })?;

        Ok(Self { inner })
    }

    /// Whether the callback has run since the last arm.
    pub fn is_ready(&self) -> ReadSignal<bool> {
        self.inner.ready.read_only()
    }

    /// Whether a timer is armed.
    pub fn is_pending(&self) -> ReadSignal<bool> {
        self.inner.pending.read_only()
    }

    /// Drop the pending timer. `is_ready` keeps its value.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.timer.cancel();
        self.inner.pending.set(false);
    }

    /// Clear any cancellation and arm a fresh timer, replacing one in flight.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
        self.inner.resets.update(|resets| resets + 1);
    }

    /// Whether `cancel` was called since the last reset.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// The lifecycle state derived from the pending, ready and cancelled flags.
    pub fn state(&self) -> TimeoutState {
        if self.inner.pending.get() {
            TimeoutState::Pending
        } else if self.inner.ready.get() {
            TimeoutState::Ready
        } else if self.is_cancelled() {
            TimeoutState::Cancelled
        } else {
            TimeoutState::Idle
        }
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeout")
            .field("state", &self.state())
            .field("delay", &self.inner.delay.get())
            .finish()
    }
}
