//! Rate Limiting
//!
//! Derived signals that republish a source at a limited rate.
//!
//! - [`debounce`] waits for the source to go quiet for `delay` before
//!   publishing (trailing edge), optionally publishing the first change of a
//!   burst immediately (leading edge).
//! - [`throttle`] publishes at most once per `delay` window, on the leading
//!   edge by default and optionally on the trailing edge.
//!
//! Both outputs start at the source's value at creation; reading it there is
//! not a change. Timestamps come from the scope's host clock, so a headless
//! host still passes leading-edge publishes but never fires a trailing one.

mod debounce;
mod throttle;

pub use debounce::{debounce, DebounceConfig};
pub use throttle::{throttle, ThrottleConfig};

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::host::slot::TimerSlot;
use crate::host::TimerService;
use crate::reactive::{Scope, Signal};

/// Output signal, trailing timer and edge timestamp shared by both limiters.
struct Window<T>
where
    T: Clone + Send + Sync + 'static,
{
    output: Signal<T>,
    timer: TimerSlot,
    clock: Arc<dyn TimerService>,
    /// Host time of the last publish that counts towards the window.
    stamp: Mutex<Option<f64>>,
}

impl<T> Window<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Build a window in `scope` whose timer is cancelled on disposal.
    fn open(scope: &Scope, initial: T) -> Result<Arc<Self>> {
        scope.ensure_active()?;
        let clock = scope.host().timers().clone();
        let window = Arc::new(Self {
            output: Signal::new(initial),
            timer: TimerSlot::new(clock.clone()),
            clock,
            stamp: Mutex::new(None),
        });

        let teardown = Arc::downgrade(&window);
        scope.on_dispose(move || {
            if let Some(window) = teardown.upgrade() {
                window.timer.cancel();
            }
        })?;
        Ok(window)
    }

    fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Milliseconds since the last stamped publish; infinite before the first.
    fn since_stamp(&self, now: f64) -> f64 {
        self.stamp.lock().map_or(f64::INFINITY, |at| now - at)
    }

    fn publish(&self, value: T, stamp: Option<f64>) {
        if let Some(at) = stamp {
            *self.stamp.lock() = Some(at);
        }
        self.output.set(value);
    }
}
