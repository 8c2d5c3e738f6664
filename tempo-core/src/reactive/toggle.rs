//! Boolean state with flip and set helpers.

use std::fmt;

use super::signal::{ReadSignal, Signal};

/// A boolean signal with `toggle`, `set_true` and `set_false`.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct Toggle {
    value: Signal<bool>,
}

impl Toggle {
    pub fn new(initial: bool) -> Self {
        Self {
            value: Signal::new(initial),
        }
    }

    /// The current value as a read-only signal.
    pub fn value(&self) -> ReadSignal<bool> {
        self.value.read_only()
    }

    pub fn get(&self) -> bool {
        self.value.get()
    }

    /// Flip the value.
    pub fn toggle(&self) {
        self.value.update(|value| !value);
    }

    pub fn set_true(&self) {
        self.value.set(true);
    }

    pub fn set_false(&self) {
        self.value.set(false);
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Toggle").field(&self.get()).finish()
    }
}
