//! A host with no frame clock and no timers.

use std::time::{Duration, Instant};

use super::{
    FrameCallback, FrameClock, FrameHandle, RepeatingCallback, TimerCallback, TimerHandle,
    TimerService,
};

/// Host for non-interactive contexts.
///
/// Every scheduling request is dropped and reported as `None`, so drivers stay
/// at their last published value instead of failing. The clock still reports
/// real elapsed time since creation.
#[derive(Debug, Clone)]
pub struct Headless {
    started: Instant,
}

impl Headless {
    /// Create a headless host whose clock starts now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for Headless {
    fn request_frame(&self, _callback: FrameCallback) -> Option<FrameHandle> {
        tracing::debug!("no frame clock; frame request dropped");
        None
    }

    fn cancel_frame(&self, _handle: FrameHandle) {}
}

impl TimerService for Headless {
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn schedule_after(&self, _delay: Duration, _callback: TimerCallback) -> Option<TimerHandle> {
        tracing::debug!("no timer service; timeout dropped");
        None
    }

    fn schedule_every(&self, _period: Duration, _callback: RepeatingCallback) -> Option<TimerHandle> {
        tracing::debug!("no timer service; interval dropped");
        None
    }

    fn cancel_timer(&self, _handle: TimerHandle) {}
}
