//! List state with in-place mutation helpers.
//!
//! Each helper rewrites the whole list through the backing signal, so a
//! mutation that leaves the list unchanged (a `retain` that keeps everything,
//! `clear` on an empty list) does not notify.

use std::fmt::{self, Debug};

use super::signal::{ReadSignal, Signal};

/// A `Vec` signal with push, pop, insert and remove helpers.
///
/// Clones share the same list.
pub struct ListSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    items: Signal<Vec<T>>,
}

impl<T> ListSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            items: Signal::new(initial),
        }
    }

    /// The list as a read-only signal.
    pub fn items(&self) -> ReadSignal<Vec<T>> {
        self.items.read_only()
    }

    pub fn get(&self) -> Vec<T> {
        self.items.get()
    }

    pub fn len(&self) -> usize {
        self.items.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append to the end.
    pub fn push(&self, item: T) {
        self.edit(|items| {
            items.push(item);
        });
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Option<T> {
        self.edit(Vec::pop)
    }

    /// Remove and return the first item.
    pub fn shift(&self) -> Option<T> {
        self.edit(|items| (!items.is_empty()).then(|| items.remove(0)))
    }

    /// Prepend to the front.
    pub fn unshift(&self, item: T) {
        self.edit(|items| items.insert(0, item));
    }

    /// Insert at `index`; an index past the end appends.
    pub fn insert(&self, index: usize, item: T) {
        self.edit(|items| {
            let index = index.min(items.len());
            items.insert(index, item);
        });
    }

    /// Remove and return the item at `index`, if there is one.
    pub fn remove(&self, index: usize) -> Option<T> {
        self.edit(|items| (index < items.len()).then(|| items.remove(index)))
    }

    /// Keep only the items matching `keep`.
    pub fn retain(&self, keep: impl FnMut(&T) -> bool) {
        self.edit(|items| items.retain(keep));
    }

    /// Replace every item with `f(item)`.
    pub fn map_in_place(&self, mut f: impl FnMut(&T) -> T) {
        self.edit(|items| {
            for item in items.iter_mut() {
                *item = f(item);
            }
        });
    }

    pub fn clear(&self) {
        self.edit(Vec::clear);
    }

    /// First item matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.items
            .with(|items| items.iter().find(|item| predicate(*item)).cloned())
    }

    /// Apply `f` to a copy of the list and publish the result.
    fn edit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut items = self.items.get();
        let result = f(&mut items);
        self.items.set(items);
        result
    }
}

impl<T> Default for ListSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Clone for ListSignal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> Debug for ListSignal<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListSignal").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subscriber;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn queue_and_stack_operations() {
        let list = ListSignal::new(vec![2, 3]);

        list.push(4);
        list.unshift(1);
        assert_eq!(list.get(), vec![1, 2, 3, 4]);

        assert_eq!(list.pop(), Some(4));
        assert_eq!(list.shift(), Some(1));
        assert_eq!(list.get(), vec![2, 3]);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop(), None);
        assert_eq!(list.shift(), None);
    }

    #[test]
    fn insert_remove_and_find() {
        let list = ListSignal::new(vec!["a", "c"]);

        list.insert(1, "b");
        list.insert(99, "d");
        assert_eq!(list.get(), vec!["a", "b", "c", "d"]);

        assert_eq!(list.remove(0), Some("a"));
        assert_eq!(list.remove(10), None);
        assert_eq!(list.find(|item| item.starts_with('c')), Some("c"));
        assert_eq!(list.find(|item| item.is_empty()), None);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn retain_and_map_in_place() {
        let list = ListSignal::new((1..=6).collect::<Vec<i32>>());

        list.retain(|n| n % 2 == 0);
        list.map_in_place(|n| n * 10);
        assert_eq!(list.items().get(), vec![20, 40, 60]);
    }

    #[test]
    fn no_op_edits_do_not_notify() {
        let list = ListSignal::new(vec![1, 2]);
        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = notified.clone();
        list.items().subscribe(Subscriber::new(move || {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }));

        list.retain(|_| true);
        list.remove(5);
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        list.push(3);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
