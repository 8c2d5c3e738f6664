//! Timing Controllers
//!
//! Timer-driven primitives that expose their state as signals:
//!
//! - [`Interval`]: a repeating callback with a tick count and pause/resume.
//! - [`Timeout`]: a one-shot callback with ready/pending flags, cancel and
//!   reset.
//! - [`now`]: the host clock, republished on a fixed period.
//!
//! Interval and timeout delays may be fixed or follow a signal; a new delay
//! cancels the live timer and schedules a fresh one.

mod clock;
mod interval;
mod timeout;

pub use clock::{now, NowConfig};
pub use interval::Interval;
pub use timeout::{Timeout, TimeoutState};

use std::time::Duration;

use parking_lot::Mutex;

use crate::reactive::{ReadSignal, Signal, Trackable};

/// Callback run by an interval or timeout.
type Callback = Box<dyn FnMut() + Send>;

/// A user callback, taken out of its slot while it runs.
struct CallbackCell(Mutex<Option<Callback>>);

impl CallbackCell {
    fn new<F>(callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let callback: Callback = Box::new(callback);
        Self(Mutex::new(Some(callback)))
    }

    fn run(&self) {
        let taken = self.0.lock().take();
        if let Some(mut callback) = taken {
            callback();
            *self.0.lock() = Some(callback);
        }
    }
}

/// A delay that is either fixed or read from a signal.
#[derive(Debug, Clone)]
pub enum IntervalDelay {
    Fixed(Duration),
    Reactive(ReadSignal<Duration>),
}

impl IntervalDelay {
    /// The delay right now.
    pub fn get(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Reactive(signal) => signal.get(),
        }
    }

    /// The signal to watch, for reactive delays.
    pub(crate) fn source(&self) -> Option<&dyn Trackable> {
        match self {
            Self::Fixed(_) => None,
            Self::Reactive(signal) => Some(signal as &dyn Trackable),
        }
    }

    /// Dependency list for a controller's effect: `trigger` plus the delay
    /// signal, if any.
    pub(crate) fn deps<'a>(&'a self, trigger: &'a dyn Trackable) -> Vec<&'a dyn Trackable> {
        let mut deps = vec![trigger];
        deps.extend(self.source());
        deps
    }
}

impl From<Duration> for IntervalDelay {
    fn from(delay: Duration) -> Self {
        Self::Fixed(delay)
    }
}

impl From<ReadSignal<Duration>> for IntervalDelay {
    fn from(signal: ReadSignal<Duration>) -> Self {
        Self::Reactive(signal)
    }
}

impl From<Signal<Duration>> for IntervalDelay {
    fn from(signal: Signal<Duration>) -> Self {
        Self::Reactive(signal.read_only())
    }
}

impl From<&Signal<Duration>> for IntervalDelay {
    fn from(signal: &Signal<Duration>) -> Self {
        Self::Reactive(signal.read_only())
    }
}
