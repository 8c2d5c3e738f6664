//! Debounced values.
//!
//! A debounced signal republishes its source only after the source has stopped
//! changing for a quiet period (trailing edge), on the first change of a burst
//! (leading edge), or both.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Window;
use crate::config::{as_ms, duration_ms};
use crate::error::Result;
use crate::reactive::{ReadSignal, Readable, Scope};

/// Debounce timing and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period before the trailing publish.
    #[serde(with = "duration_ms")]
    pub delay: Duration,
    /// Publish the first change of a burst immediately.
    #[serde(default)]
    pub leading: bool,
    /// Publish the latest value once the source has been quiet for `delay`.
    #[serde(default = "enabled")]
    pub trailing: bool,
}

fn enabled() -> bool {
    true
}

impl DebounceConfig {
    /// Trailing-edge debounce over `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            leading: false,
            trailing: true,
        }
    }

    /// Publish the first change of a burst immediately.
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Publish the last change once the source has been quiet for `delay`.
    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }
}

struct Debounce<T>
where
    T: Clone + Send + Sync + 'static,
{
    config: DebounceConfig,
    window: Arc<Window<T>>,
}

impl<T> Debounce<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn changed(&self, value: T) {
        let window = &self.window;
        window.timer.cancel();

        let now = window.now();
        if self.config.leading && window.since_stamp(now) >= as_ms(self.config.delay) {
            tracing::trace!(now, "debounce leading edge");
            window.publish(value.clone(), Some(now));
        }

        if self.config.trailing {
            let weak: Weak<Window<T>> = Arc::downgrade(window);
            window.timer.after(
                self.config.delay,
                Box::new(move || {
                    if let Some(window) = weak.upgrade() {
                        window.timer.clear();
                        window.publish(value, None);
                    }
                }),
            );
        }
    }
}

/// A signal that follows `source` once it stops changing.
///
/// Every change cancels the pending trailing publish. With `leading` set, a
/// change arriving at least `delay` after the previous leading publish is
/// published at once.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::rate::{debounce, DebounceConfig};
/// use tempo_core::reactive::{Scope, Signal};
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let query = Signal::new(String::new());
/// let settled = debounce(&scope, &query, DebounceConfig::new(Duration::from_millis(300))).unwrap();
///
/// query.set("r".into());
/// query.set("ru".into());
/// query.set("rust".into());
/// assert_eq!(settled.get(), "");
///
/// event_loop.advance(Duration::from_millis(300));
/// assert_eq!(settled.get(), "rust");
/// ```
pub fn debounce<T, S>(scope: &Scope, source: &S, config: DebounceConfig) -> Result<ReadSignal<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    S: Readable<T> + Clone + 'static,
{
    let window = Window::open(scope, source.get())?;
    let output = window.output.read_only();

    let limiter = Debounce { config, window };
    let reader = source.clone();
    scope.watch_lazy(&[source], move |_| limiter.changed(reader.get()))?;

    Ok(output)
}
