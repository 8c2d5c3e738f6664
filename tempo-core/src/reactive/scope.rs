//! Effect Scopes
//!
//! A Scope owns the effects and teardown callbacks created by the drivers that
//! live in it, together with the [`Host`] those drivers schedule on. Disposing
//! the scope disposes every owned effect and then runs every teardown, which
//! is how drivers cancel their pending frame and timer handles.
//!
//! The scope is disposed explicitly with [`Scope::dispose`] or implicitly when
//! the last clone is dropped. A scope that should live for the whole process
//! is simply never dropped.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::effect::{Effect, EffectContext};
use super::signal::Trackable;
use crate::error::{Error, Result};
use crate::host::Host;

type Teardown = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct ScopeState {
    effects: Vec<Effect>,
    teardowns: Vec<Teardown>,
    disposed: bool,
}

struct ScopeInner {
    host: Host,
    state: Mutex<ScopeState>,
}

impl ScopeInner {
    fn dispose(&self) {
        let (effects, teardowns) = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                std::mem::take(&mut state.effects),
                std::mem::take(&mut state.teardowns),
            )
        };
        tracing::debug!(
            effects = effects.len(),
            teardowns = teardowns.len(),
            "disposing scope"
        );

        for effect in &effects {
            effect.dispose();
        }
        for teardown in teardowns {
            teardown();
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Lifetime boundary for effects and drivers.
///
/// # Example
///
/// ```rust
/// use tempo_core::host::{EventLoop, Host};
/// use tempo_core::reactive::{Scope, Signal};
///
/// let scope = Scope::new(Host::new(EventLoop::new()));
/// let source = Signal::new(1);
///
/// let effect = scope.watch(&[&source], |_| {}).unwrap();
/// scope.dispose();
/// assert!(effect.is_disposed());
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Create a scope whose drivers schedule on `host`.
    pub fn new(host: Host) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                host,
                state: Mutex::new(ScopeState::default()),
            }),
        }
    }

    /// The host drivers in this scope schedule on.
    pub fn host(&self) -> &Host {
        &self.inner.host
    }

    /// Fail with [`Error::ScopeDisposed`] once the scope is gone.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::ScopeDisposed)
        } else {
            Ok(())
        }
    }

    /// Create an effect owned by this scope and run it immediately.
    pub fn watch<F>(&self, deps: &[&dyn Trackable], run: F) -> Result<Effect>
    where
        F: FnMut(&mut EffectContext) + Send + 'static,
    {
        self.ensure_active()?;
        let effect = Effect::watch(deps, run);
        self.adopt(effect.clone())?;
        Ok(effect)
    }

    /// Create an effect owned by this scope that waits for the first change.
    pub fn watch_lazy<F>(&self, deps: &[&dyn Trackable], run: F) -> Result<Effect>
    where
        F: FnMut(&mut EffectContext) + Send + 'static,
    {
        self.ensure_active()?;
        let effect = Effect::watch_lazy(deps, run);
        self.adopt(effect.clone())?;
        Ok(effect)
    }

    /// Take ownership of an existing effect.
    ///
    /// A disposed scope disposes the effect immediately and reports
    /// [`Error::ScopeDisposed`].
    pub fn adopt(&self, effect: Effect) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.disposed {
            drop(state);
            effect.dispose();
            return Err(Error::ScopeDisposed);
        }
        state.effects.push(effect);
        Ok(())
    }

    /// Run `teardown` when the scope is disposed.
    ///
    /// A disposed scope runs it immediately and reports
    /// [`Error::ScopeDisposed`].
    pub fn on_dispose<F>(&self, teardown: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.disposed {
            drop(state);
            teardown();
            return Err(Error::ScopeDisposed);
        }
        state.teardowns.push(Box::new(teardown));
        Ok(())
    }

    /// Dispose every owned effect, then run every teardown in registration
    /// order. Disposing twice is a no-op.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether the scope has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Number of effects owned by the scope.
    pub fn effect_count(&self) -> usize {
        self.inner.state.lock().effects.len()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Scope")
            .field("effects", &state.effects.len())
            .field("teardowns", &state.teardowns.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}
