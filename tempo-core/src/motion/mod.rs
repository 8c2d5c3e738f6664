//! Motion Drivers
//!
//! Frame-driven animation of [`Animatable`](crate::value::Animatable) values.
//!
//! Both drivers expose the same pair of signals:
//!
//! - `target`: writable; where the value should go.
//! - `current`: read-only; where the value is now. Only the driver writes it.
//!
//! A [`Spring`] integrates damped spring physics once per frame and settles
//! when close enough to its target. A [`Tween`] interpolates over a fixed
//! duration, optionally delayed and eased.
//!
//! Creating a driver does not start it; the first target write does. While
//! moving, a driver holds at most one frame request and re-requests the next
//! frame from inside the current one.

mod spring;
mod tween;

pub use spring::{Spring, SpringConfig, SpringState};
pub use tween::{Easing, Interpolate, Interpolator, Tween, TweenConfig, TweenOptions, TweenState};
