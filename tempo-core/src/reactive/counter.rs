//! Bounded integer counter.
//!
//! Every write is clamped to `[min, max]`, including the initial value and
//! the value restored by [`Counter::reset`].

use std::fmt;

use super::signal::{ReadSignal, Signal};
use crate::error::{Error, Result};

/// An integer signal with increment, decrement and reset.
#[derive(Clone)]
pub struct Counter {
    count: Signal<i64>,
    initial: i64,
    min: i64,
    max: i64,
}

impl Counter {
    /// An unbounded counter.
    pub fn new(initial: i64) -> Self {
        Self {
            count: Signal::new(initial),
            initial,
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// A counter clamped to `[min, max]`.
    pub fn bounded(initial: i64, min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidConfig {
                field: "min",
                reason: format!("{min} is greater than max {max}"),
            });
        }
        let initial = initial.clamp(min, max);
        Ok(Self {
            count: Signal::new(initial),
            initial,
            min,
            max,
        })
    }

    pub fn count(&self) -> ReadSignal<i64> {
        self.count.read_only()
    }

    pub fn get(&self) -> i64 {
        self.count.get()
    }

    /// Add `step`, saturating at the bounds.
    pub fn increment(&self, step: i64) {
        self.count.update(|count| self.clamp(count.saturating_add(step)));
    }

    /// Subtract `step`, saturating at the bounds.
    pub fn decrement(&self, step: i64) {
        self.count.update(|count| self.clamp(count.saturating_sub(step)));
    }

    pub fn set(&self, value: i64) {
        self.count.set(self.clamp(value));
    }

    /// Restore the (clamped) initial value.
    pub fn reset(&self) {
        self.count.set(self.initial);
    }

    /// Reset to `value` instead of the initial one.
    pub fn reset_to(&self, value: i64) {
        self.set(value);
    }

    fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("count", &self.get())
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}
