//! Clock tick source.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{self, duration_ms};
use crate::error::Result;
use crate::host::slot::TimerSlot;
use crate::host::TimerService;
use crate::reactive::{ReadSignal, Scope, Signal};

/// Tick period of [`now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NowConfig {
    #[serde(with = "duration_ms")]
    pub interval: Duration,
}

impl Default for NowConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl NowConfig {
    /// Rejects a zero interval.
    pub fn validate(&self) -> Result<()> {
        config::non_zero("interval", self.interval)
    }
}

struct Clock {
    time: Signal<f64>,
    timers: Arc<dyn TimerService>,
    timer: TimerSlot,
}

/// The host clock in milliseconds, republished every `config.interval` for
/// as long as `scope` lives.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::reactive::Scope;
/// use tempo_core::timing::{now, NowConfig};
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let time = now(&scope, NowConfig::default()).unwrap();
///
/// event_loop.advance(Duration::from_millis(2500));
/// assert_eq!(time.get(), 2000.0);
/// ```
pub fn now(scope: &Scope, config: NowConfig) -> Result<ReadSignal<f64>> {
    config.validate()?;
    scope.ensure_active()?;

    let timers = scope.host().timers().clone();
    let clock = Arc::new(Clock {
        time: Signal::new(timers.now()),
        timer: TimerSlot::new(timers.clone()),
        timers,
    });

    let weak: Weak<Clock> = Arc::downgrade(&clock);
    let scheduled = clock.timer.every(
        config.interval,
        Box::new(move || {
            if let Some(clock) = weak.upgrade() {
                clock.time.set(clock.timers.now());
            }
        }),
    );
    if !scheduled {
        tracing::debug!("no timer service; clock stays at its creation time");
    }

    let output = clock.time.read_only();
    scope.on_dispose(move || clock.timer.cancel())?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::host::{EventLoop, Host};

    fn setup() -> (EventLoop, Scope) {
        let event_loop = EventLoop::new();
        let scope = Scope::new(Host::new(event_loop.clone()));
        (event_loop, scope)
    }

    #[test]
    fn starts_at_creation_time_and_ticks() {
        let (event_loop, scope) = setup();
        event_loop.advance(Duration::from_millis(40));
        let time = now(&scope, NowConfig { interval: Duration::from_millis(100) }).unwrap();

        assert_eq!(time.get(), 40.0);
        event_loop.advance(Duration::from_millis(99));
        assert_eq!(time.get(), 40.0);
        event_loop.advance(Duration::from_millis(1));
        assert_eq!(time.get(), 140.0);
        event_loop.advance(Duration::from_millis(250));
        assert_eq!(time.get(), 340.0);
    }

    #[test]
    fn stops_when_the_scope_is_disposed() {
        let (event_loop, scope) = setup();
        let time = now(&scope, NowConfig::default()).unwrap();

        event_loop.advance(Duration::from_secs(1));
        scope.dispose();
        assert_eq!(event_loop.pending_timers(), 0);

        event_loop.advance(Duration::from_secs(5));
        assert_eq!(time.get(), 1000.0);
    }

    #[test]
    fn headless_clock_holds_its_first_reading() {
        let scope = Scope::new(Host::headless());
        let time = now(&scope, NowConfig::default()).unwrap();
        let first = time.get();
        assert!(first >= 0.0);
        assert_eq!(time.get(), first);
    }

    #[test]
    fn sub_millisecond_interval_survives_serialization() {
        let config = NowConfig { interval: Duration::from_micros(500) };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: NowConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_interval() {
        let (_event_loop, scope) = setup();
        let config: NowConfig = serde_json::from_str(r#"{"interval": 0}"#).unwrap();
        assert!(matches!(
            now(&scope, config),
            Err(Error::InvalidConfig { field: "interval", .. })
        ));
        assert_eq!(
            serde_json::from_str::<NowConfig>("{}").unwrap(),
            NowConfig::default()
        );
    }
}
