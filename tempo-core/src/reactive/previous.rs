//! Previous-value tracking.

use parking_lot::Mutex;

use super::scope::Scope;
use super::signal::{ReadSignal, Readable, Signal};
use crate::error::Result;

/// A signal holding the value `source` had before its most recent change.
///
/// Starts as `None` and becomes `Some` on the first change.
pub fn previous<T, S>(scope: &Scope, source: &S) -> Result<ReadSignal<Option<T>>>
where
    T: Clone + Send + Sync + PartialEq + 'static,
    S: Readable<T> + Clone + 'static,
{
    let out = Signal::new(None);
    let writer = out.clone();
    let reader = source.clone();
    let last = Mutex::new(source.get());

    scope.watch_lazy(&[source], move |_| {
        let current = reader.get();
        let before = std::mem::replace(&mut *last.lock(), current);
        writer.set(Some(before));
    })?;

    Ok(out.read_only())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    #[test]
    fn tracks_value_before_last_change() {
        let scope = Scope::new(Host::headless());
        let count = Signal::new(0);
        let prev = previous(&scope, &count).unwrap();

        assert_eq!(prev.get(), None);
        count.set(1);
        assert_eq!(prev.get(), Some(0));
        count.set(2);
        assert_eq!(prev.get(), Some(1));

        // Equal writes are not changes.
        count.set(2);
        assert_eq!(prev.get(), Some(1));
    }
}
