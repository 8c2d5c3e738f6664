//! Tween Driver
//!
//! A tween moves `current` from wherever it is to a writable `target` over a
//! fixed duration, optionally after a delay, shaped by an easing curve.
//!
//! Every target write restarts the motion: the value `current` holds at that
//! moment becomes the start point, the delay timer (if any) is rearmed, and
//! the clock for the duration starts on the first frame after the delay. At
//! `t >= 1` the tween publishes the target exactly and goes idle.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{as_ms, duration_ms};
use crate::error::{Error, Result};
use crate::host::slot::{FrameSlot, TimerSlot};
use crate::reactive::{ReadSignal, Scope, Signal};
use crate::value::{lerp, Animatable};

/// Maps linear progress in `[0, 1]` to eased progress.
pub type Easing = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Produced by an [`Interpolate`] for one leg of motion.
pub type Interpolator<T> = Box<dyn Fn(f64) -> T + Send + Sync>;

/// Builds the interpolator between a start and an end value.
pub type Interpolate<T> = Arc<dyn Fn(&T, &T) -> Interpolator<T> + Send + Sync>;

/// Serializable timing of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweenConfig {
    /// Length of each leg.
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Wait between a target write and the first frame of the leg.
    #[serde(with = "duration_ms", default)]
    pub delay: Duration,
}

impl TweenConfig {
    /// A config with no delay.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
        }
    }
}

/// Timing plus the easing and interpolation functions of a tween.
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::motion::TweenOptions;
///
/// let options = TweenOptions::<f64>::new(Duration::from_millis(300))
///     .delay(Duration::from_millis(50))
///     .easing(|t| t * t);
/// assert_eq!(options.config.delay, Duration::from_millis(50));
/// ```
pub struct TweenOptions<T> {
    pub config: TweenConfig,
    easing: Option<Easing>,
    interpolate: Option<Interpolate<T>>,
}

impl<T: Animatable> TweenOptions<T> {
    /// Linear options with no delay.
    pub fn new(duration: Duration) -> Self {
        Self::from_config(TweenConfig::new(duration))
    }

    pub fn from_config(config: TweenConfig) -> Self {
        Self {
            config,
            easing: None,
            interpolate: None,
        }
    }

    /// Wait `delay` after each target write before animating.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Shape progress with `easing`. Linear when unset.
    pub fn easing<F>(mut self, easing: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.easing = Some(Arc::new(easing));
        self
    }

    /// Replace per-component linear interpolation.
    pub fn interpolate<F, I>(mut self, interpolate: F) -> Self
    where
        F: Fn(&T, &T) -> I + Send + Sync + 'static,
        I: Fn(f64) -> T + Send + Sync + 'static,
    {
        self.interpolate = Some(Arc::new(move |from: &T, to: &T| {
            Box::new(interpolate(from, to)) as Interpolator<T>
        }));
        self
    }
}

impl<T> fmt::Debug for TweenOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("config", &self.config)
            .field("easing", &self.easing.is_some())
            .field("interpolate", &self.interpolate.is_some())
            .finish()
    }
}

/// Phase of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    Idle,
    /// Waiting out the delay before the first frame.
    Delaying,
    Animating,
}

struct Leg<T> {
    state: TweenState,
    from: T,
    started_at: Option<f64>,
}

struct TweenInner<T: Animatable> {
    duration: f64,
    delay: Duration,
    easing: Option<Easing>,
    interpolate: Option<Interpolate<T>>,
    current: Signal<T>,
    target: Signal<T>,
    leg: Mutex<Leg<T>>,
    frame: FrameSlot,
    timer: TimerSlot,
    len: usize,
}

impl<T: Animatable> TweenInner<T> {
    fn restart(self: &Arc<Self>) {
        self.frame.cancel();
        self.timer.cancel();
        {
            let mut leg = self.leg.lock();
            leg.from = self.current.get();
            leg.started_at = None;
        }

        if self.delay.is_zero() {
            self.begin();
            return;
        }

        self.set_state(TweenState::Delaying);
        let weak: Weak<Self> = Arc::downgrade(self);
        let scheduled = self.timer.after(
            self.delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.timer.clear();
                    inner.begin();
                }
            }),
        );
        if !scheduled {
            self.set_state(TweenState::Idle);
            tracing::debug!("no timer service; tween holds its current value");
        }
    }

    fn begin(self: &Arc<Self>) {
        self.set_state(TweenState::Animating);
        self.schedule();
    }

    fn schedule(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let scheduled = self.frame.request(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                inner.step(timestamp);
            }
        }));
        if !scheduled {
            self.set_state(TweenState::Idle);
            tracing::debug!("no frame clock; tween holds its current value");
        }
    }

    fn step(self: &Arc<Self>, timestamp: f64) {
        self.frame.clear();

        let target = self.target.get();
        let (from, progress) = {
            let mut leg = self.leg.lock();
            let started_at = *leg.started_at.get_or_insert(timestamp);
            let progress = if self.duration <= 0.0 {
                1.0
            } else {
                ((timestamp - started_at) / self.duration).clamp(0.0, 1.0)
            };
            (leg.from.clone(), progress)
        };

        if progress >= 1.0 {
            self.finish(target);
            return;
        }

        let eased = self.easing.as_ref().map_or(progress, |easing| easing(progress));
        let value = match &self.interpolate {
            Some(interpolate) => interpolate(&from, &target)(eased),
            None if from.len() != target.len() => {
                tracing::warn!(
                    expected = from.len(),
                    found = target.len(),
                    "tween target changed length; snapping to target"
                );
                self.finish(target);
                return;
            }
            None => lerp(&from, &target, eased),
        };

        self.schedule();
        self.current.set(value);
    }

    fn finish(&self, target: T) {
        self.set_state(TweenState::Idle);
        self.current.set(target);
        tracing::debug!("tween finished");
    }

    fn stop(&self) {
        self.frame.cancel();
        self.timer.cancel();
        self.set_state(TweenState::Idle);
    }

    fn set_state(&self, state: TweenState) {
        self.leg.lock().state = state;
    }
}

/// A value animated over a fixed duration.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::motion::{Tween, TweenOptions};
/// use tempo_core::reactive::Scope;
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(Duration::from_millis(200))).unwrap();
///
/// tween.target().set(1.0);
/// event_loop.advance(Duration::from_millis(500));
/// assert_eq!(tween.current().get(), 1.0);
/// ```
pub struct Tween<T: Animatable> {
    inner: Arc<TweenInner<T>>,
}

impl<T: Animatable> Tween<T> {
    /// Create a tween resting at `initial`, living in `scope`.
    pub fn new(scope: &Scope, initial: T, options: TweenOptions<T>) -> Result<Self> {
        scope.ensure_active()?;
        let host = scope.host();

        let inner = Arc::new(TweenInner {
            duration: as_ms(options.config.duration),
            delay: options.config.delay,
            easing: options.easing,
            interpolate: options.interpolate,
            current: Signal::new(initial.clone()),
            target: Signal::new(initial.clone()),
            leg: Mutex::new(Leg {
                state: TweenState::Idle,
                from: initial.clone(),
                started_at: None,
            }),
            frame: FrameSlot::new(host.frames().clone()),
            timer: TimerSlot::new(host.timers().clone()),
            len: initial.len(),
        });

        let driver = Arc::clone(&inner);
        scope.watch_lazy(&[&inner.target], move |_| driver.restart())?;

        let teardown = Arc::downgrade(&inner);
        scope.on_dispose(move || {
            if let Some(inner) = teardown.upgrade() {
                inner.stop();
            }
        })?;

        Ok(Self { inner })
    }

    /// The animated value. Only the tween writes it.
    pub fn current(&self) -> ReadSignal<T> {
        self.inner.current.read_only()
    }

    /// The value the tween moves towards.
    pub fn target(&self) -> Signal<T> {
        self.inner.target.clone()
    }

    /// Write the target after checking it has the tween's shape.
    ///
    /// Tweens with a custom interpolator accept any shape.
    pub fn set_target(&self, value: T) -> Result<()> {
        if self.inner.interpolate.is_none() && value.len() != self.inner.len {
            return Err(Error::LengthMismatch {
                expected: self.inner.len,
                found: value.len(),
            });
        }
        self.inner.target.set(value);
        Ok(())
    }

    /// Where the current leg is.
    pub fn state(&self) -> TweenState {
        self.inner.leg.lock().state
    }

    /// Whether no leg is delaying or animating.
    pub fn is_idle(&self) -> bool {
        self.state() == TweenState::Idle
    }
}

impl<T: Animatable> Clone for Tween<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Animatable> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("current", &self.inner.current.get())
            .field("target", &self.inner.target.get())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{EventLoop, Host};
    use crate::reactive::Subscriber;

    const FRAME: Duration = Duration::from_millis(16);

    fn setup() -> (EventLoop, Scope) {
        let event_loop = EventLoop::new();
        let scope = Scope::new(Host::new(event_loop.clone()));
        (event_loop, scope)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn linear_progress_is_measured_from_the_first_frame() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(160))).unwrap();

        tween.target().set(100.0);
        assert_eq!(tween.state(), TweenState::Animating);

        // First frame at 16ms records the start time.
        event_loop.advance(FRAME);
        assert_eq!(tween.current().get(), 0.0);

        event_loop.advance(FRAME);
        assert!((tween.current().get() - 10.0).abs() < 1e-9);

        // Frame at 112ms: 96ms into the leg.
        event_loop.advance_to(112.0);
        assert!((tween.current().get() - 60.0).abs() < 1e-9);

        event_loop.advance_to(200.0);
        assert_eq!(tween.current().get(), 100.0);
        assert!(tween.is_idle());
        assert_eq!(event_loop.pending_frames(), 0);
    }

    #[test]
    fn published_values_stay_between_start_and_target() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(250))).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let current = tween.current();
        let reader = current.clone();
        current.subscribe(Subscriber::new(move || seen_clone.lock().push(reader.get())));

        tween.target().set(100.0);
        assert!(event_loop.run_until_idle(Duration::from_secs(1)));

        let seen = seen.lock();
        assert_eq!(seen.last(), Some(&100.0));
        assert!(seen.iter().all(|v| (0.0..=100.0).contains(v)));
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn delay_holds_the_value_until_the_timer_fires() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(100)).delay(ms(100))).unwrap();

        tween.target().set(50.0);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert_eq!(event_loop.pending_frames(), 0);

        event_loop.advance(ms(99));
        assert_eq!(tween.current().get(), 0.0);
        assert_eq!(tween.state(), TweenState::Delaying);

        // Timer at 100, first frame at 112 (t = 0), next at 128.
        event_loop.advance_to(112.0);
        assert_eq!(tween.state(), TweenState::Animating);
        assert_eq!(tween.current().get(), 0.0);

        event_loop.advance_to(128.0);
        assert!(tween.current().get() > 0.0);
    }

    #[test]
    fn retarget_during_delay_restarts_the_delay() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(100)).delay(ms(100))).unwrap();

        tween.target().set(50.0);
        event_loop.advance(ms(50));
        tween.target().set(80.0);
        assert_eq!(event_loop.pending_timers(), 1);

        event_loop.advance_to(140.0);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert_eq!(tween.current().get(), 0.0);

        assert!(event_loop.run_until_idle(Duration::from_secs(1)));
        assert_eq!(tween.current().get(), 80.0);
    }

    #[test]
    fn retarget_mid_flight_starts_from_current() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(160))).unwrap();

        tween.target().set(100.0);
        event_loop.advance_to(80.0);
        let midway = tween.current().get();
        assert!(midway > 0.0 && midway < 100.0);

        tween.target().set(0.0);
        assert_eq!(tween.current().get(), midway);

        // The new leg starts on the next frame at its start value.
        event_loop.advance(FRAME);
        assert_eq!(tween.current().get(), midway);
        event_loop.advance(FRAME);
        assert!(tween.current().get() < midway);

        assert!(event_loop.run_until_idle(Duration::from_secs(1)));
        assert_eq!(tween.current().get(), 0.0);
    }

    #[test]
    fn zero_duration_jumps_on_the_first_frame() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, 1.0_f64, TweenOptions::new(Duration::ZERO)).unwrap();

        tween.target().set(3.0);
        assert_eq!(tween.current().get(), 1.0);
        event_loop.advance(FRAME);
        assert_eq!(tween.current().get(), 3.0);
        assert!(tween.is_idle());
    }

    #[test]
    fn easing_shapes_progress() {
        let (event_loop, scope) = setup();
        let options = TweenOptions::new(ms(160)).easing(|t| t * t);
        let tween = Tween::new(&scope, 0.0_f64, options).unwrap();

        tween.target().set(100.0);
        // Start at 16ms, half way at 96ms.
        event_loop.advance_to(96.0);
        assert!((tween.current().get() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn custom_interpolate_sees_start_and_target() {
        let (event_loop, scope) = setup();
        let legs = Arc::new(Mutex::new(Vec::new()));
        let legs_clone = legs.clone();
        let options = TweenOptions::new(ms(160)).interpolate(move |from: &f64, to: &f64| {
            legs_clone.lock().push((*from, *to));
            let (from, to) = (*from, *to);
            move |t: f64| if t < 0.5 { from } else { to }
        });
        let tween = Tween::new(&scope, 2.0_f64, options).unwrap();

        tween.target().set(8.0);
        event_loop.advance_to(48.0);
        assert_eq!(tween.current().get(), 2.0);
        event_loop.advance_to(96.0);
        assert_eq!(tween.current().get(), 8.0);

        assert!(legs.lock().iter().all(|leg| *leg == (2.0, 8.0)));
    }

    #[test]
    fn vectors_tween_per_component() {
        let (event_loop, scope) = setup();
        let tween = Tween::new(&scope, [0.0_f64, 10.0], TweenOptions::new(ms(160))).unwrap();

        tween.set_target([10.0, 0.0]).unwrap();
        event_loop.advance_to(96.0);
        let [x, y] = tween.current().get();
        assert!((x - 5.0).abs() < 1e-9);
        assert!((y - 5.0).abs() < 1e-9);

        assert!(matches!(
            Tween::new(&scope, vec![0.0], TweenOptions::new(ms(10)))
                .unwrap()
                .set_target(vec![1.0, 2.0]),
            Err(Error::LengthMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn dispose_cancels_frames_and_delay_timer() {
        let (event_loop, scope) = setup();
        let delayed = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(100)).delay(ms(50))).unwrap();
        let running = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(100))).unwrap();

        delayed.target().set(1.0);
        running.target().set(1.0);
        assert_eq!(event_loop.pending_timers(), 1);
        assert_eq!(event_loop.pending_frames(), 1);

        scope.dispose();
        assert_eq!(event_loop.pending_timers(), 0);
        assert_eq!(event_loop.pending_frames(), 0);
        assert!(delayed.is_idle());
    }

    #[test]
    fn headless_host_leaves_current_alone() {
        let scope = Scope::new(Host::headless());
        let tween = Tween::new(&scope, 0.0_f64, TweenOptions::new(ms(100)).delay(ms(10))).unwrap();

        tween.target().set(1.0);
        assert_eq!(tween.current().get(), 0.0);
        assert!(tween.is_idle());
    }

    #[test]
    fn config_reads_milliseconds() {
        let config: TweenConfig = serde_json::from_str(r#"{"duration": 300}"#).unwrap();
        assert_eq!(config, TweenConfig::new(ms(300)));

        let options = TweenOptions::<f64>::from_config(config).delay(ms(20));
        assert_eq!(options.config.delay, ms(20));
    }
}
