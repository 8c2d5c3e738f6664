//! Host Scheduling
//!
//! Drivers never sleep or spawn. Everything they do happens inside callbacks
//! handed to two host services:
//!
//! - a [`FrameClock`], which runs a callback once on the next display refresh
//! - a [`TimerService`], which runs a callback after (or every) N milliseconds
//!
//! Both return an opaque handle that can be cancelled. Cancelling a handle
//! that already fired, was already cancelled, or was never issued is a no-op.
//!
//! # Headless Hosts
//!
//! A host without timing facilities returns `None` from every scheduling call.
//! Drivers treat that as "nothing scheduled" and keep their last published
//! value. [`Headless`] is such a host.
//!
//! # Provided Hosts
//!
//! - [`EventLoop`]: deterministic virtual-time loop. Time only moves when
//!   [`EventLoop::advance`] is called, which makes it the host used by tests
//!   and by offline rendering.
//! - [`Headless`]: never schedules anything.
//! - `realtime::run` (feature `realtime`): pumps an [`EventLoop`] against the
//!   tokio clock.

mod event_loop;
mod headless;
#[cfg(feature = "realtime")]
pub mod realtime;
pub(crate) mod slot;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use event_loop::EventLoop;
pub use headless::Headless;

/// Callback run once on the next frame, with the frame timestamp in ms.
pub type FrameCallback = Box<dyn FnOnce(f64) + Send>;

/// Callback run once when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Callback run every time a repeating timer expires.
pub type RepeatingCallback = Box<dyn FnMut() + Send>;

/// Handle to a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub(crate) u64);

/// Handle to a pending one-shot or repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub(crate) u64);

/// Display-refresh scheduling.
pub trait FrameClock: Send + Sync {
    /// Run `callback` once on the next frame.
    ///
    /// Returns `None` when the host has no frame clock.
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle>;

    /// Cancel a pending frame callback.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Millisecond timers and the clock they run on.
pub trait TimerService: Send + Sync {
    /// Current host time in milliseconds.
    fn now(&self) -> f64;

    /// Run `callback` once after `delay`.
    ///
    /// Returns `None` when the host has no timers.
    fn schedule_after(&self, delay: Duration, callback: TimerCallback) -> Option<TimerHandle>;

    /// Run `callback` every `period` until cancelled.
    ///
    /// Returns `None` when the host has no timers.
    fn schedule_every(&self, period: Duration, callback: RepeatingCallback) -> Option<TimerHandle>;

    /// Cancel a pending timer.
    fn cancel_timer(&self, handle: TimerHandle);
}

/// The frame clock and timer service a scope's drivers run on.
///
/// Cloning is cheap.
#[derive(Clone)]
pub struct Host {
    frames: Arc<dyn FrameClock>,
    timers: Arc<dyn TimerService>,
}

impl Host {
    /// Build a host from one value providing both services.
    pub fn new<H>(host: H) -> Self
    where
        H: FrameClock + TimerService + 'static,
    {
        let host = Arc::new(host);
        Self {
            frames: host.clone(),
            timers: host,
        }
    }

    /// Build a host from separate services.
    pub fn split(frames: Arc<dyn FrameClock>, timers: Arc<dyn TimerService>) -> Self {
        Self { frames, timers }
    }

    /// A host with no timing facilities.
    pub fn headless() -> Self {
        Self::new(Headless::new())
    }

    /// The frame clock.
    pub fn frames(&self) -> &Arc<dyn FrameClock> {
        &self.frames
    }

    /// The timer service.
    pub fn timers(&self) -> &Arc<dyn TimerService> {
        &self.timers
    }

    /// Current host time in milliseconds.
    pub fn now(&self) -> f64 {
        self.timers.now()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").field("now", &self.now()).finish()
    }
}
