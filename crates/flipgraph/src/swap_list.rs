//! Dense list with O(1) membership removal.
//!
//! Elements live in a contiguous `Vec` so a uniform index draw picks a
//! uniform element. A value → position map makes removal O(1): the last
//! element is swapped into the hole and its position updated.
//!
//! ```text
//! remove(b):  [a, b, c, d]  ->  [a, d, c]
//!             pos{b:1, d:3} ->  pos{d:1}
//! ```

use std::collections::HashMap;
use std::hash::Hash;

/// A set of distinct values with stable O(1) indexed access.
///
/// Iteration order is insertion order perturbed by swap-removals; it is
/// deterministic for a given sequence of operations.
#[derive(Clone, Debug)]
pub struct SwapList<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T: Clone + Eq + Hash> SwapList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Creates an empty list with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Number of values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the list holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value at position `i`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    /// True if `value` is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.positions.contains_key(value)
    }

    /// Appends `value`. Returns false (and does nothing) if already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.positions.contains_key(&value) {
            return false;
        }
        self.positions.insert(value.clone(), self.items.len());
        self.items.push(value);
        true
    }

    /// Removes `value` by swapping the last element into its position.
    /// Returns false if `value` was absent.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(pos) = self.positions.remove(value) else {
            return false;
        };
        self.items.swap_remove(pos);
        if let Some(moved) = self.items.get(pos) {
            self.positions.insert(moved.clone(), pos);
        }
        true
    }

    /// Values in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Values in list order as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Checks that the position map agrees with the list.
    pub(crate) fn is_consistent(&self) -> bool {
        self.items.len() == self.positions.len()
            && self
                .items
                .iter()
                .enumerate()
                .all(|(i, v)| self.positions.get(v) == Some(&i))
    }
}

impl<T: Clone + Eq + Hash> Default for SwapList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut l = SwapList::new();
        assert!(l.insert(3u32));
        assert!(!l.insert(3u32));
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn remove_swaps_last_into_hole() {
        let mut l = SwapList::new();
        for v in ['a', 'b', 'c', 'd'] {
            l.insert(v);
        }
        assert!(l.remove(&'b'));
        assert_eq!(l.as_slice(), &['a', 'd', 'c']);
        assert!(l.is_consistent());
        assert!(!l.contains(&'b'));
    }

    #[test]
    fn remove_last_and_missing() {
        let mut l = SwapList::new();
        l.insert(1u8);
        l.insert(2u8);
        assert!(l.remove(&2));
        assert!(!l.remove(&2));
        assert_eq!(l.as_slice(), &[1]);
        assert!(l.remove(&1));
        assert!(l.is_empty());
        assert!(l.is_consistent());
    }

    #[test]
    fn churn_stays_consistent() {
        let mut l = SwapList::with_capacity(16);
        for i in 0..64u32 {
            l.insert(i % 17);
            if i % 3 == 0 {
                l.remove(&((i * 7) % 17));
            }
            assert!(l.is_consistent());
        }
    }
}
