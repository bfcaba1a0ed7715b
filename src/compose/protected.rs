//! A list that can be mutated while it is being iterated.

use std::rc::Rc;

/// Ordered list with a lazily rebuilt iteration snapshot.
///
/// `start_protection` hands out a snapshot; adds and removes go to the live
/// list and only invalidate the cached snapshot, so whoever iterates the
/// snapshot sees a stable view. The snapshot is rebuilt on the next
/// `start_protection` after a mutation, and reused otherwise.
pub struct ProtectedList<T> {
    items: Vec<T>,
    snapshot: Option<Rc<[T]>>,
    locked: bool,
}

impl<T: Clone> ProtectedList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            snapshot: None,
            locked: false,
        }
    }

    /// Lock the list and return the snapshot to iterate.
    pub fn start_protection(&mut self) -> Rc<[T]> {
        debug_assert!(!self.locked, "list already under protection");
        self.locked = true;

        let items = &self.items;
        Rc::clone(self.snapshot.get_or_insert_with(|| items.iter().cloned().collect()))
    }

    pub fn stop_protection(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn add(&mut self, item: T) {
        self.snapshot = None;
        self.items.push(item);
    }

    /// Remove the first item matching `predicate`.
    pub fn remove_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(predicate)?;
        self.snapshot = None;
        Some(self.items.remove(index))
    }

    /// The live items, including mutations made under protection.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> Default for ProtectedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_stable_under_mutation() {
        let mut list = ProtectedList::new();
        list.add(1);
        list.add(2);

        let snapshot = list.start_protection();
        list.add(3);
        list.remove_where(|n| *n == 1);

        assert_eq!(&*snapshot, &[1, 2]);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        list.stop_protection();
    }

    #[test]
    fn snapshot_is_reused_until_mutated() {
        let mut list = ProtectedList::new();
        list.add("a");

        let first = list.start_protection();
        list.stop_protection();
        let second = list.start_protection();
        list.stop_protection();
        assert!(Rc::ptr_eq(&first, &second));

        list.add("b");
        let third = list.start_protection();
        list.stop_protection();
        assert!(!Rc::ptr_eq(&second, &third));
        assert_eq!(&*third, &["a", "b"]);
    }

    #[test]
    fn lock_state_tracks_protection() {
        let mut list: ProtectedList<u8> = ProtectedList::default();
        assert!(!list.is_locked());

        let _ = list.start_protection();
        assert!(list.is_locked());

        list.stop_protection();
        assert!(!list.is_locked());
    }

    #[test]
    fn removing_a_missing_item_is_a_no_op() {
        let mut list = ProtectedList::new();
        list.add(7);

        assert_eq!(list.remove_where(|n| *n == 8), None);
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }

    #[test]
    #[should_panic(expected = "already under protection")]
    #[cfg(debug_assertions)]
    fn double_protection_is_a_bug() {
        let mut list: ProtectedList<u8> = ProtectedList::new();
        let _ = list.start_protection();
        let _ = list.start_protection();
    }
}
