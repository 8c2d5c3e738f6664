//! Deterministic Event Loop
//!
//! A single-threaded host with a logical clock. Nothing happens until the
//! owner moves time forward with [`EventLoop::advance`]; every callback that
//! falls due on the way is then dispatched in order.
//!
//! # Ordering
//!
//! - Timers fire in `(deadline, registration order)` order.
//! - Frames fire on a grid of `frame_interval` multiples. A frame requested at
//!   time `t` fires at the first grid point strictly after `t`. The due time
//!   is fixed at request, so timers landing on a grid point never push it
//!   back, and a callback that re-requests a frame lands in the next refresh.
//! - When a timer and a frame fall due at the same instant, the timer runs
//!   first.
//!
//! # Re-entrancy
//!
//! The internal lock is released before any callback runs. Callbacks may
//! schedule, cancel, or read the clock freely. A frame cancelled by an earlier
//! callback of the same refresh does not run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{
    FrameCallback, FrameClock, FrameHandle, RepeatingCallback, TimerCallback, TimerHandle,
    TimerService,
};
use crate::config::as_ms;

const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;
const MIN_PERIOD_MS: f64 = 1.0;

enum Task {
    Once(TimerCallback),
    Every(RepeatingCallback),
}

struct TimerEntry {
    deadline: f64,
    seq: u64,
    period: Option<f64>,
    /// `None` while a repeating callback is being run.
    task: Option<Task>,
}

struct FrameEntry {
    due: f64,
    callback: FrameCallback,
}

enum Due {
    Timer(u64),
    Frame,
}

struct LoopState {
    now: f64,
    frame_interval: f64,
    next_id: u64,
    next_seq: u64,
    frames: IndexMap<u64, FrameEntry>,
    timers: IndexMap<u64, TimerEntry>,
}

impl LoopState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// First grid point strictly after the current time.
    fn grid_after_now(&self) -> f64 {
        ((self.now / self.frame_interval).floor() + 1.0) * self.frame_interval
    }

    fn next_frame_at(&self) -> Option<f64> {
        self.frames
            .values()
            .map(|entry| entry.due.max(self.now))
            .min_by(f64::total_cmp)
    }

    fn next_timer(&self) -> Option<(u64, f64)> {
        self.timers
            .iter()
            .filter(|(_, entry)| entry.task.is_some())
            .min_by(|(_, a), (_, b)| {
                a.deadline
                    .total_cmp(&b.deadline)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(id, entry)| (*id, entry.deadline.max(self.now)))
    }

    fn next_due(&self) -> Option<(f64, Due)> {
        let timer = self.next_timer();
        let frame = self.next_frame_at();

        match (timer, frame) {
            (Some((id, deadline)), Some(at)) if deadline <= at => Some((deadline, Due::Timer(id))),
            (_, Some(at)) => Some((at, Due::Frame)),
            (Some((id, deadline)), None) => Some((deadline, Due::Timer(id))),
            (None, None) => None,
        }
    }

    fn move_to(&mut self, at: f64) {
        if at > self.now {
            self.now = at;
        }
    }
}

/// A virtual-time frame clock and timer service.
///
/// Clones share the same clock and queues.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, TimerService};
///
/// let event_loop = EventLoop::new();
/// event_loop.schedule_after(Duration::from_millis(100), Box::new(|| println!("fired")));
///
/// event_loop.advance(Duration::from_millis(99)); // nothing yet
/// event_loop.advance(Duration::from_millis(1));  // prints "fired"
/// ```
#[derive(Clone)]
pub struct EventLoop {
    inner: Arc<Mutex<LoopState>>,
}

impl EventLoop {
    /// Create a loop at time zero with a 16 ms frame interval.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoopState {
                now: 0.0,
                frame_interval: DEFAULT_FRAME_INTERVAL_MS,
                next_id: 0,
                next_seq: 0,
                frames: IndexMap::new(),
                timers: IndexMap::new(),
            })),
        }
    }

    /// Set the display refresh interval. Values under 1 ms are raised to 1 ms.
    pub fn with_frame_interval(self, interval: Duration) -> Self {
        self.inner.lock().frame_interval = as_ms(interval).max(MIN_PERIOD_MS);
        self
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.inner.lock().now
    }

    /// The display refresh interval in milliseconds.
    pub fn frame_interval(&self) -> f64 {
        self.inner.lock().frame_interval
    }

    /// Number of frame callbacks waiting for the next refresh.
    pub fn pending_frames(&self) -> usize {
        self.inner.lock().frames.len()
    }

    /// Number of live timers, one-shot and repeating.
    pub fn pending_timers(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Time at which the next callback falls due, if any is pending.
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.lock().next_due().map(|(at, _)| at)
    }

    /// Move time forward by `duration`, dispatching everything that falls due.
    ///
    /// Returns the number of dispatches (one per timer firing, one per
    /// frame refresh).
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.now() + as_ms(duration);
        self.advance_to(target)
    }

    /// Move time forward to `target` ms. Earlier targets only dispatch what is
    /// already due.
    pub fn advance_to(&self, target: f64) -> usize {
        let mut dispatched = 0;
        loop {
            let due = {
                let state = self.inner.lock();
                match state.next_due() {
                    Some((at, due)) if at <= target => Some((at, due)),
                    _ => None,
                }
            };
            let Some((at, due)) = due else {
                break;
            };

            match due {
                Due::Timer(id) => self.fire_timer(id, at),
                Due::Frame => {
                    self.flush_frames(at, at);
                }
            }
            dispatched += 1;
        }

        self.inner.lock().move_to(target);
        dispatched
    }

    /// Advance until nothing is pending, giving up after `limit`.
    ///
    /// Returns `true` when the loop went idle within the limit. A live
    /// repeating timer keeps the loop busy forever.
    pub fn run_until_idle(&self, limit: Duration) -> bool {
        let end = self.now() + as_ms(limit);
        while let Some(at) = self.next_deadline() {
            if at > end {
                return false;
            }
            self.advance_to(at);
        }
        true
    }

    /// Run every currently registered frame callback at the current time.
    ///
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let now = self.now();
        self.flush_frames(now, f64::INFINITY)
    }

    /// Run, at time `at`, every frame whose due time is no later than `due_by`.
    fn flush_frames(&self, at: f64, due_by: f64) -> usize {
        let ids: Vec<u64> = {
            let mut state = self.inner.lock();
            state.move_to(at);
            state
                .frames
                .iter()
                .filter(|(_, entry)| entry.due <= due_by)
                .map(|(id, _)| *id)
                .collect()
        };
        tracing::trace!(at, count = ids.len(), "frame");

        let mut ran = 0;
        for id in ids {
            let entry = self.inner.lock().frames.shift_remove(&id);
            if let Some(entry) = entry {
                (entry.callback)(at);
                ran += 1;
            }
        }
        ran
    }

    fn fire_timer(&self, id: u64, at: f64) {
        let task = {
            let mut state = self.inner.lock();
            state.move_to(at);
            let seq = state.next_seq();
            let repeating = match state.timers.get_mut(&id) {
                Some(entry) => match entry.period {
                    Some(period) => {
                        entry.deadline += period;
                        entry.seq = seq;
                        Some(entry.task.take())
                    }
                    None => None,
                },
                None => return,
            };
            match repeating {
                Some(task) => task,
                None => state.timers.shift_remove(&id).and_then(|entry| entry.task),
            }
        };
        tracing::trace!(at, id, "timer fired");

        match task {
            Some(Task::Once(callback)) => callback(),
            Some(Task::Every(mut callback)) => {
                callback();
                // Put the callback back unless it was cancelled while running.
                let mut state = self.inner.lock();
                if let Some(entry) = state.timers.get_mut(&id) {
                    if entry.task.is_none() {
                        entry.task = Some(Task::Every(callback));
                    }
                }
            }
            None => {}
        }
    }

    fn insert_timer(&self, delay: f64, period: Option<f64>, task: Task) -> TimerHandle {
        let mut state = self.inner.lock();
        let id = state.next_id();
        let seq = state.next_seq();
        let deadline = state.now + delay;
        state.timers.insert(
            id,
            TimerEntry {
                deadline,
                seq,
                period,
                task: Some(task),
            },
        );
        tracing::trace!(id, deadline, ?period, "timer scheduled");
        TimerHandle(id)
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for EventLoop {
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
        let mut state = self.inner.lock();
        let id = state.next_id();
        let due = state.grid_after_now();
        state.frames.insert(id, FrameEntry { due, callback });
        Some(FrameHandle(id))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.inner.lock().frames.shift_remove(&handle.0);
    }
}

impl TimerService for EventLoop {
    fn now(&self) -> f64 {
        EventLoop::now(self)
    }

    fn schedule_after(&self, delay: Duration, callback: TimerCallback) -> Option<TimerHandle> {
        Some(self.insert_timer(as_ms(delay), None, Task::Once(callback)))
    }

    fn schedule_every(&self, period: Duration, callback: RepeatingCallback) -> Option<TimerHandle> {
        let period = as_ms(period).max(MIN_PERIOD_MS);
        Some(self.insert_timer(period, Some(period), Task::Every(callback)))
    }

    fn cancel_timer(&self, handle: TimerHandle) {
        if self.inner.lock().timers.shift_remove(&handle.0).is_some() {
            tracing::trace!(id = handle.0, "timer cancelled");
        }
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("EventLoop")
            .field("now", &state.now)
            .field("frame_interval", &state.frame_interval)
            .field("pending_frames", &state.frames.len())
            .field("pending_timers", &state.timers.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
