//! Reactive Primitives
//!
//! This module implements the value graph the temporal drivers are built on:
//! signals, memos, effects, and the scopes that own them.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state with an equality predicate.
//! Writing a value that is not equal to the current one notifies every
//! subscriber, synchronously.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation over an explicit list of
//! dependencies. It re-runs whenever any of them changes and may register
//! cleanup callbacks that run before the next run and on disposal.
//!
//! ## Memos
//!
//! A Memo is a derived value recomputed from its dependencies, published
//! through an equality-gated signal.
//!
//! ## Scopes
//!
//! A Scope owns effects and teardown callbacks and carries the host the
//! drivers created in it schedule on.
//!
//! ## State Helpers
//!
//! [`Toggle`], [`Counter`] and [`ListSignal`] wrap a signal with mutation
//! helpers. [`LinkedSignal`] is a writable signal reset from its dependencies.
//! None of them needs a scope.
//!
//! # Implementation Notes
//!
//! Dependencies are declared, not discovered: an effect subscribes to exactly
//! the sources it is given. Nothing is global; every subscription lives on the
//! signal it belongs to.

mod counter;
mod effect;
mod linked;
mod list;
mod memo;
mod previous;
mod scope;
mod signal;
mod subscriber;
mod toggle;

pub use counter::Counter;
pub use effect::{Effect, EffectContext};
pub use linked::{deep_linked_signal, LinkedSignal, Previous};
pub use list::ListSignal;
pub use memo::Memo;
pub use previous::previous;
pub use scope::Scope;
pub use signal::{deep_signal, Equality, ReadSignal, Readable, Signal, Trackable};
pub use subscriber::{Notify, Subscriber, SubscriberId};
pub use toggle::Toggle;
