//! Tempo Core
//!
//! This crate derives time-varying values from reactive state. It provides:
//!
//! - Reactive primitives (signals, memos, effects, scopes)
//! - Physics and duration based animation (spring, tween)
//! - Rate limiting (debounce, throttle)
//! - Timer controllers (interval, timeout, clock)
//!
//! Drivers never sleep or spawn. They schedule work on a [`host::Host`], which
//! supplies a frame clock and a timer service. The crate ships a deterministic
//! [`host::EventLoop`] for tests and offline stepping, a [`host::Headless`]
//! host that schedules nothing, and a tokio pump (feature `realtime`).
//!
//! # Architecture
//!
//! - `reactive`: signals, memos, effects, the scopes that own them, and small
//!   state helpers (toggle, counter, list, linked signal)
//! - `host`: frame clock and timer service traits plus the provided hosts
//! - `value`: the [`value::Animatable`] component model
//! - `motion`: spring and tween drivers
//! - `rate`: debounce and throttle
//! - `timing`: interval, timeout, and the clock tick source
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tempo_core::host::{EventLoop, Host};
//! use tempo_core::motion::{Spring, SpringConfig};
//! use tempo_core::reactive::{Memo, Scope};
//!
//! let event_loop = EventLoop::new();
//! let scope = Scope::new(Host::new(event_loop.clone()));
//!
//! // A spring-animated position
//! let x = Spring::new(&scope, 0.0_f64, SpringConfig::default()).unwrap();
//!
//! // A value derived from it
//! let current = x.current();
//! let reader = current.clone();
//! let rounded = Memo::new(&[&current], move || reader.get().round());
//!
//! x.target().set(10.0);
//! event_loop.advance(Duration::from_secs(2));
//! assert_eq!(rounded.get(), 10.0);
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod motion;
pub mod rate;
pub mod reactive;
pub mod timing;
pub mod value;

pub use error::{Error, Result};
