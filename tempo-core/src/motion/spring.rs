//! Spring Driver
//!
//! A spring publishes a `current` value that chases a writable `target`,
//! integrating one step per display frame:
//!
//! ```text
//! delta        = target - current
//! acceleration = delta * stiffness - velocity * damping
//! velocity'    = velocity + acceleration
//! current'     = current + velocity'
//! ```
//!
//! Each component is integrated independently. The spring settles when every
//! component has `|delta| <= precision` and `|velocity'| <= precision`; it then
//! snaps exactly onto the target, zeroes its velocity and stops requesting
//! frames until the target changes again.
//!
//! Retargeting mid-flight keeps both position and velocity, so motion stays
//! continuous.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Error, Result};
use crate::host::slot::FrameSlot;
use crate::reactive::{ReadSignal, Scope, Signal};
use crate::value::{Animatable, Components};

/// Spring physics parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Pull towards the target per frame, as a fraction of the distance.
    pub stiffness: f64,
    /// Fraction of the velocity removed per frame.
    pub damping: f64,
    /// Distance and speed below which the spring counts as settled.
    pub precision: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 0.15,
            damping: 0.8,
            precision: 0.01,
        }
    }
}

impl SpringConfig {
    /// Check every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        config::positive("stiffness", self.stiffness)?;
        config::non_negative("damping", self.damping)?;
        config::positive("precision", self.precision)?;
        Ok(())
    }
}

/// Whether a spring is currently requesting frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringState {
    /// At rest on the target.
    Idle,
    /// Moving towards the target.
    Animating,
}

struct SpringInner<T: Animatable> {
    config: SpringConfig,
    current: Signal<T>,
    target: Signal<T>,
    velocity: Signal<T>,
    state: Mutex<SpringState>,
    frame: FrameSlot,
    len: usize,
}

impl<T: Animatable> SpringInner<T> {
    fn start(self: &Arc<Self>) {
        *self.state.lock() = SpringState::Animating;
        tracing::debug!(target_value = ?self.target.get(), "spring retargeted");
        self.schedule();
    }

    fn schedule(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let scheduled = self.frame.request(Box::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.step();
            }
        }));
        if !scheduled {
            *self.state.lock() = SpringState::Idle;
            tracing::debug!("no frame clock; spring holds its current value");
        }
    }

    fn step(self: &Arc<Self>) {
        self.frame.clear();

        let target = self.target.get();
        let to = target.components();
        let from = self.current.with(|value| value.components());
        let velocity = self.velocity.with(|value| value.components());

        if to.len() != from.len() || velocity.len() != from.len() {
            tracing::warn!(
                expected = from.len(),
                found = to.len(),
                "spring target changed length; snapping to target"
            );
            self.settle(target);
            return;
        }

        let SpringConfig {
            stiffness,
            damping,
            precision,
        } = self.config;
        let mut next: Components = Components::with_capacity(from.len());
        let mut next_velocity: Components = Components::with_capacity(from.len());
        let mut settled = true;

        for ((current, target), velocity) in from.iter().zip(&to).zip(&velocity) {
            let delta = target - current;
            let acceleration = delta * stiffness - velocity * damping;
            let v = velocity + acceleration;
            if delta.abs() > precision || v.abs() > precision {
                settled = false;
            }
            next_velocity.push(v);
            next.push(current + v);
        }

        if settled {
            self.settle(target);
        } else {
            self.velocity.set(target.from_components(&next_velocity));
            self.schedule();
            self.current.set(target.from_components(&next));
        }
    }

    fn settle(&self, target: T) {
        *self.state.lock() = SpringState::Idle;
        self.velocity.set(target.zeroed());
        self.current.set(target);
        tracing::debug!("spring settled");
    }

    fn stop(&self) {
        self.frame.cancel();
        *self.state.lock() = SpringState::Idle;
    }
}

/// A value animated by spring physics.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::motion::{Spring, SpringConfig};
/// use tempo_core::reactive::Scope;
///
/// let event_loop = EventLoop::new();
/// let scope = Scope::new(Host::new(event_loop.clone()));
/// let spring = Spring::new(&scope, 0.0_f64, SpringConfig::default()).unwrap();
///
/// spring.target().set(100.0);
/// event_loop.advance(Duration::from_secs(5));
/// assert_eq!(spring.current().get(), 100.0);
/// ```
pub struct Spring<T: Animatable> {
    inner: Arc<SpringInner<T>>,
}

impl<T: Animatable> Spring<T> {
    /// Create a spring resting at `initial`, living in `scope`.
    pub fn new(scope: &Scope, initial: T, config: SpringConfig) -> Result<Self> {
        config.validate()?;
        scope.ensure_active()?;

        let inner = Arc::new(SpringInner {
            config,
            current: Signal::new(initial.clone()),
            target: Signal::new(initial.clone()),
            velocity: Signal::new(initial.zeroed()),
            state: Mutex::new(SpringState::Idle),
            frame: FrameSlot::new(scope.host().frames().clone()),
            len: initial.len(),
        });

        let driver = Arc::clone(&inner);
        scope.watch_lazy(&[&inner.target], move |_| driver.start())?;

        let teardown = Arc::downgrade(&inner);
        scope.on_dispose(move || {
            if let Some(inner) = teardown.upgrade() {
                inner.stop();
            }
        })?;

        Ok(Self { inner })
    }

    /// The animated value. Only the spring writes it.
    pub fn current(&self) -> ReadSignal<T> {
        self.inner.current.read_only()
    }

    /// The value the spring moves towards. Writable at any time.
    pub fn target(&self) -> Signal<T> {
        self.inner.target.clone()
    }

    /// Write the target after checking it has the spring's shape.
    pub fn set_target(&self, value: T) -> Result<()> {
        if value.len() != self.inner.len {
            return Err(Error::LengthMismatch {
                expected: self.inner.len,
                found: value.len(),
            });
        }
        self.inner.target.set(value);
        Ok(())
    }

    /// Whether the spring is animating.
    pub fn state(&self) -> SpringState {
        *self.inner.state.lock()
    }

    /// Whether the spring is at rest on its target.
    pub fn is_settled(&self) -> bool {
        self.state() == SpringState::Idle
    }

    /// The physics parameters.
    pub fn config(&self) -> SpringConfig {
        self.inner.config
    }
}

impl<T: Animatable> Clone for Spring<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Animatable> fmt::Debug for Spring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spring")
            .field("current", &self.inner.current.get())
            .field("target", &self.inner.target.get())
            .field("state", &self.state())
            .field("frame_pending", &self.inner.frame.is_pending())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
