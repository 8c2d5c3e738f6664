//! Throttled values.
//!
//! A throttled signal republishes its source at most once per `delay` window.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Window;
use crate::config::{as_ms, duration_ms, from_ms};
use crate::error::Result;
use crate::reactive::{ReadSignal, Readable, Scope};

/// Throttle window and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum spacing between publishes.
    #[serde(with = "duration_ms")]
    pub delay: Duration,
    /// Publish a change at once when the window is open.
    #[serde(default = "enabled")]
    pub leading: bool,
    /// Publish the latest blocked change when the window reopens.
    #[serde(default)]
    pub trailing: bool,
}

fn enabled() -> bool {
    true
}

impl ThrottleConfig {
    /// Leading-edge throttle over `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            leading: true,
            trailing: false,
        }
    }

    /// Publish immediately when the window is open.
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Publish the latest value when a closed window reopens.
    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }
}

struct Throttle<T>
where
    T: Clone + Send + Sync + 'static,
{
    config: ThrottleConfig,
    window: Arc<Window<T>>,
}

impl<T> Throttle<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn changed(&self, value: T) {
        let window = &self.window;
        let now = window.now();
        let delay = as_ms(self.config.delay);
        let elapsed = window.since_stamp(now);

        if self.config.leading && elapsed >= delay {
            // A trailing publish still pending would carry an older value.
            window.timer.cancel();
            window.publish(value, Some(now));
        } else if self.config.trailing {
            let weak: Weak<Window<T>> = Arc::downgrade(window);
            window.timer.after(
                from_ms(delay - elapsed),
                Box::new(move || {
                    if let Some(window) = weak.upgrade() {
                        window.timer.clear();
                        let now = window.now();
                        window.publish(value, Some(now));
                    }
                }),
            );
        }
    }
}

/// A signal that follows `source` at most once per `delay` window.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::rate::{throttle, ThrottleConfig};
/// use tempo_core::reactive::{Scope, Signal};
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let scroll = Signal::new(0);
/// let sampled = throttle(&scope, &scroll, ThrottleConfig::new(Duration::from_millis(100))).unwrap();
///
/// scroll.set(10);
/// scroll.set(20);
/// assert_eq!(sampled.get(), 10);
///
/// event_loop.advance(Duration::from_millis(100));
/// scroll.set(30);
/// assert_eq!(sampled.get(), 30);
/// ```
pub fn throttle<T, S>(scope: &Scope, source: &S, config: ThrottleConfig) -> Result<ReadSignal<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    S: Readable<T> + Clone + 'static,
{
    let window = Window::open(scope, source.get())?;
    let output = window.output.read_only();

    let limiter = Throttle { config, window };
    let reader = source.clone();
    scope.watch_lazy(&[source], move |_| limiter.changed(reader.get()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{EventLoop, Host};
    use crate::reactive::{Signal, Subscriber};
    use parking_lot::Mutex;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn setup() -> (EventLoop, Scope) {
        let event_loop = EventLoop::new();
        let scope = Scope::new(Host::new(event_loop.clone()));
        (event_loop, scope)
    }

    fn record(event_loop: &EventLoop, signal: &ReadSignal<i32>) -> Arc<Mutex<Vec<(f64, i32)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let clock = event_loop.clone();
        let reader = signal.clone();
        signal.subscribe(Subscriber::new(move || {
            log_clone.lock().push((clock.now(), reader.get()));
        }));
        log
    }

    #[test]
    fn leading_edge_drops_changes_inside_the_window() {
        let (event_loop, scope) = setup();
        let source = Signal::new(0);
        let output = throttle(&scope, &source, ThrottleConfig::new(ms(50))).unwrap();

        source.set(1);
        assert_eq!(output.get(), 1);

        event_loop.advance(ms(10));
        source.set(2);
        event_loop.advance(ms(10));
        source.set(3);
        assert_eq!(output.get(), 1);
        assert_eq!(event_loop.pending_timers(), 0);

        event_loop.advance(ms(30));
        source.set(4);
        assert_eq!(output.get(), 4);
    }

    #[test]
    fn trailing_only_publishes_when_the_window_reopens() {
        let (event_loop, scope) = setup();
        let source = Signal::new(0);
        let config = ThrottleConfig::new(ms(50)).leading(false).trailing(true);
        let output = throttle(&scope, &source, config).unwrap();
        let log = record(&event_loop, &output);

        // Nothing published yet, so the window is already open.
        source.set(1);
        assert_eq!(output.get(), 0);
        event_loop.advance(Duration::ZERO);
        assert_eq!(output.get(), 1);

        event_loop.advance(ms(10));
        source.set(2);
        event_loop.advance(ms(10));
        source.set(3);

        event_loop.advance_to(49.0);
        assert_eq!(output.get(), 1);
        event_loop.advance_to(50.0);
        assert_eq!(output.get(), 3);

        assert_eq!(*log.lock(), vec![(0.0, 1), (50.0, 3)]);
    }

    #[test]
    fn both_edges_publish_at_most_once_per_window() {
        let (event_loop, scope) = setup();
        let source = Signal::new(0);
        let config = ThrottleConfig::new(ms(50)).trailing(true);
        let output = throttle(&scope, &source, config).unwrap();
        let log = record(&event_loop, &output);

        source.set(1);
        event_loop.advance(ms(10));
        source.set(2);
        event_loop.advance(ms(10));
        source.set(3);
        event_loop.advance(ms(100));

        assert_eq!(*log.lock(), vec![(0.0, 1), (50.0, 3)]);
        let log = log.lock();
        assert!(log.windows(2).all(|pair| pair[1].0 - pair[0].0 >= 50.0));
    }

    #[test]
    fn trailing_publish_restarts_the_window() {
        let (event_loop, scope) = setup();
        let source = Signal::new(0);
        let config = ThrottleConfig::new(ms(50)).trailing(true);
        let output = throttle(&scope, &source, config).unwrap();

        source.set(1);
        event_loop.advance(ms(10));
        source.set(2);
        event_loop.advance_to(50.0);
        assert_eq!(output.get(), 2);

        // Window now runs from 50ms, so a change at 60ms waits until 100ms.
        event_loop.advance_to(60.0);
        source.set(3);
        assert_eq!(output.get(), 2);
        event_loop.advance_to(99.0);
        assert_eq!(output.get(), 2);
        event_loop.advance_to(100.0);
        assert_eq!(output.get(), 3);
    }

    #[test]
    fn dispose_drops_the_pending_publish() {
        let (event_loop, scope) = setup();
        let source = Signal::new(0);
        let config = ThrottleConfig::new(ms(50)).trailing(true);
        let output = throttle(&scope, &source, config).unwrap();

        source.set(1);
        source.set(2);
        scope.dispose();
        assert_eq!(event_loop.pending_timers(), 0);

        event_loop.advance(ms(100));
        assert_eq!(output.get(), 1);
    }

    #[test]
    fn config_defaults_to_leading_only() {
        let config: ThrottleConfig = serde_json::from_str(r#"{"delay": 100}"#).unwrap();
        assert_eq!(config, ThrottleConfig::new(ms(100)));

        let both: ThrottleConfig =
            serde_json::from_str(r#"{"delay": 100, "trailing": true}"#).unwrap();
        assert!(both.leading && both.trailing);
    }
}
