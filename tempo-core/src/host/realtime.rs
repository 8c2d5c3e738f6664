//! Real-time pump for an [`EventLoop`].
//!
//! The event loop itself never looks at a wall clock. This module sleeps on
//! tokio's timer until the loop's next deadline and then advances the loop to
//! the elapsed real time, which turns the deterministic loop into a live host
//! without changing any driver code.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use super::EventLoop;

/// Drive `event_loop` in real time until `shutdown` resolves.
///
/// Must run on a single task; the loop's callbacks execute inline on it. When
/// nothing is pending the pump wakes once per frame interval to pick up new
/// registrations.
pub async fn run<F>(event_loop: EventLoop, shutdown: F)
where
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let origin = event_loop.now();
    let idle = Duration::from_secs_f64(event_loop.frame_interval() / 1000.0);
    tokio::pin!(shutdown);

    loop {
        let deadline = event_loop.next_deadline();
        let wake = match deadline {
            Some(at) => started + Duration::from_secs_f64((at - origin).max(0.0) / 1000.0),
            None => Instant::now() + idle,
        };

        tokio::select! {
            _ = &mut shutdown => break,
            _ = sleep_until(wake) => {
                let elapsed = origin + started.elapsed().as_secs_f64() * 1000.0;
                // Round-tripping through Duration can land a hair short of the
                // deadline; never advance to less than what woke us.
                let target = deadline.map_or(elapsed, |at| elapsed.max(at));
                event_loop.advance_to(target);
            }
        }
    }
    tracing::debug!(now = event_loop.now(), "realtime pump stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TimerService;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn pump_fires_timers_in_real_time() {
        let event_loop = EventLoop::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        event_loop.schedule_every(
            Duration::from_millis(100),
            Box::new(move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        run(event_loop.clone(), tokio::time::sleep(Duration::from_millis(350))).await;

        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert!(event_loop.now() >= 300.0);
    }
}
