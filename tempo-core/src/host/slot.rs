//! Per-driver handle slots.
//!
//! Each driver owns at most one live frame handle and one live timer handle.
//! The slots enforce that: every registration cancels whatever the slot held
//! before, so a driver cannot leak a callback or fire twice.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{
    FrameCallback, FrameClock, FrameHandle, RepeatingCallback, TimerCallback, TimerHandle,
    TimerService,
};

/// Owned slot for a single pending frame callback.
pub(crate) struct FrameSlot {
    clock: Arc<dyn FrameClock>,
    handle: Mutex<Option<FrameHandle>>,
}

impl FrameSlot {
    pub(crate) fn new(clock: Arc<dyn FrameClock>) -> Self {
        Self {
            clock,
            handle: Mutex::new(None),
        }
    }

    /// Cancel the held frame, then request `callback` on the next one.
    ///
    /// Returns `false` when the host has no frame clock.
    pub(crate) fn request(&self, callback: FrameCallback) -> bool {
        self.cancel();
        let handle = self.clock.request_frame(callback);
        let scheduled = handle.is_some();
        *self.handle.lock() = handle;
        scheduled
    }

    /// Cancel the held frame, if any.
    pub(crate) fn cancel(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            self.clock.cancel_frame(handle);
        }
    }

    /// Forget the held handle because its callback is running.
    pub(crate) fn clear(&self) {
        self.handle.lock().take();
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.handle.lock().is_some()
    }
}

/// Owned slot for a single pending timer.
pub(crate) struct TimerSlot {
    timers: Arc<dyn TimerService>,
    handle: Mutex<Option<TimerHandle>>,
}

impl TimerSlot {
    pub(crate) fn new(timers: Arc<dyn TimerService>) -> Self {
        Self {
            timers,
            handle: Mutex::new(None),
        }
    }

    /// Cancel the held timer, then schedule `callback` after `delay`.
    pub(crate) fn after(&self, delay: Duration, callback: TimerCallback) -> bool {
        self.cancel();
        let handle = self.timers.schedule_after(delay, callback);
        self.store(handle)
    }

    /// Cancel the held timer, then schedule `callback` every `period`.
    pub(crate) fn every(&self, period: Duration, callback: RepeatingCallback) -> bool {
        self.cancel();
        let handle = self.timers.schedule_every(period, callback);
        self.store(handle)
    }

    /// Cancel the held timer, if any.
    pub(crate) fn cancel(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            self.timers.cancel_timer(handle);
        }
    }

    /// Forget the held handle because its one-shot callback is running.
    pub(crate) fn clear(&self) {
        self.handle.lock().take();
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.handle.lock().is_some()
    }

    fn store(&self, handle: Option<TimerHandle>) -> bool {
        let scheduled = handle.is_some();
        *self.handle.lock() = handle;
        scheduled
    }
}
