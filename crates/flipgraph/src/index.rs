//! Per-component duplicate index.
//!
//! For each component `t` the index maps every nonzero value to the slots
//! currently holding it, and keeps the values held by two or more slots in
//! a [`SwapList`] so a flip pivot can be drawn uniformly in O(1).
//!
//! # Invariants
//!
//! - A slot is listed under `(t, v)` iff its component `t` equals `v` and
//!   `v` is nonzero.
//! - `v` is flippable in `t` iff at least two slots are listed under
//!   `(t, v)`.
//! - Empty slot lists are never stored.

use std::collections::HashMap;

use crate::bits::BitPattern;
use crate::swap_list::SwapList;
use crate::term::{Component, SlotId};

/// Value → slots maps and flippable lists for the three components.
#[derive(Clone, Debug)]
pub struct DuplicateIndex<P> {
    value_slots: [HashMap<P, Vec<SlotId>>; 3],
    flippable: [SwapList<P>; 3],
}

impl<P: BitPattern> DuplicateIndex<P> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index sized for `terms` terms.
    #[must_use]
    pub fn with_capacity(terms: usize) -> Self {
        Self {
            value_slots: [
                HashMap::with_capacity(terms),
                HashMap::with_capacity(terms),
                HashMap::with_capacity(terms),
            ],
            flippable: [SwapList::new(), SwapList::new(), SwapList::new()],
        }
    }

    /// Records that `slot` holds `value` in component `c`.
    ///
    /// Zero values are never indexed. When the value's slot list reaches
    /// two entries the value becomes flippable.
    pub fn register(&mut self, slot: SlotId, c: Component, value: &P) {
        if value.is_zero() {
            return;
        }
        let t = c.index();
        let slots = self.value_slots[t].entry(value.clone()).or_default();
        debug_assert!(!slots.contains(&slot), "slot {slot} registered twice");
        slots.push(slot);
        if slots.len() == 2 {
            self.flippable[t].insert(value.clone());
        }
    }

    /// Forgets that `slot` holds `value` in component `c`.
    ///
    /// The slot is swap-removed from the value's list. A list shrinking to
    /// one entry retires the value from the flippable list; an empty list
    /// is dropped.
    pub fn deregister(&mut self, slot: SlotId, c: Component, value: &P) {
        if value.is_zero() {
            return;
        }
        let t = c.index();
        let Some(slots) = self.value_slots[t].get_mut(value) else {
            return;
        };
        if let Some(pos) = slots.iter().position(|&s| s == slot) {
            slots.swap_remove(pos);
        }
        match slots.len() {
            0 => {
                self.value_slots[t].remove(value);
            }
            1 => {
                self.flippable[t].remove(value);
            }
            _ => {}
        }
    }

    /// Slots holding `value` in component `c` (empty if none).
    #[must_use]
    pub fn slots(&self, c: Component, value: &P) -> &[SlotId] {
        self.value_slots[c.index()]
            .get(value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct flippable values in component `c`.
    #[inline]
    #[must_use]
    pub fn flippable_len(&self, c: Component) -> usize {
        self.flippable[c.index()].len()
    }

    /// Total number of flippable values across all components.
    #[inline]
    #[must_use]
    pub fn flippable_total(&self) -> usize {
        self.flippable.iter().map(SwapList::len).sum()
    }

    /// The `i`-th flippable value of component `c`.
    #[inline]
    #[must_use]
    pub fn flippable_value(&self, c: Component, i: usize) -> Option<&P> {
        self.flippable[c.index()].get(i)
    }

    /// True if `value` is currently flippable in component `c`.
    #[must_use]
    pub fn is_flippable(&self, c: Component, value: &P) -> bool {
        self.flippable[c.index()].contains(value)
    }

    /// Number of distinct nonzero values indexed for component `c`.
    #[must_use]
    pub fn distinct_values(&self, c: Component) -> usize {
        self.value_slots[c.index()].len()
    }

    /// Checks the internal invariants that do not depend on term contents:
    /// no empty lists, no repeated slots, flippable iff two or more slots,
    /// and a coherent flippable position map.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn check_shape(&self) -> Result<(), String> {
        for c in Component::ALL {
            let t = c.index();
            if !self.flippable[t].is_consistent() {
                return Err(format!("flippable list for {} lost its position map", c.name()));
            }
            for (value, slots) in &self.value_slots[t] {
                if slots.is_empty() {
                    return Err(format!("empty slot list for {} value {value:?}", c.name()));
                }
                let mut sorted = slots.clone();
                sorted.sort_unstable();
                sorted.dedup();
                if sorted.len() != slots.len() {
                    return Err(format!("repeated slot under {} value {value:?}", c.name()));
                }
                if (slots.len() >= 2) != self.flippable[t].contains(value) {
                    return Err(format!(
                        "{} value {value:?} held by {} slots but flippable = {}",
                        c.name(),
                        slots.len(),
                        self.flippable[t].contains(value)
                    ));
                }
            }
            for value in self.flippable[t].iter() {
                if self.slots(c, value).len() < 2 {
                    return Err(format!("stale flippable {} value {value:?}", c.name()));
                }
            }
        }
        Ok(())
    }

    /// Total number of `(slot, component)` registrations.
    pub(crate) fn registrations(&self) -> usize {
        self.value_slots
            .iter()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}

impl<P: BitPattern> Default for DuplicateIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_never_indexed() {
        let mut idx = DuplicateIndex::<u64>::new();
        idx.register(0, Component::U, &0);
        idx.register(1, Component::U, &0);
        assert_eq!(idx.distinct_values(Component::U), 0);
        assert_eq!(idx.flippable_total(), 0);
        idx.deregister(0, Component::U, &0);
        assert!(idx.check_shape().is_ok());
    }

    #[test]
    fn second_registration_makes_flippable() {
        let mut idx = DuplicateIndex::<u64>::new();
        idx.register(0, Component::V, &5);
        assert!(!idx.is_flippable(Component::V, &5));
        idx.register(3, Component::V, &5);
        assert!(idx.is_flippable(Component::V, &5));
        assert_eq!(idx.flippable_len(Component::V), 1);
        assert_eq!(idx.flippable_len(Component::U), 0);
        assert_eq!(idx.slots(Component::V, &5), &[0, 3]);
        idx.register(7, Component::V, &5);
        assert_eq!(idx.flippable_len(Component::V), 1);
        assert!(idx.check_shape().is_ok());
    }

    #[test]
    fn deregister_shrinks_and_retires() {
        let mut idx = DuplicateIndex::<u64>::new();
        for s in 0..3 {
            idx.register(s, Component::W, &9);
        }
        idx.deregister(0, Component::W, &9);
        assert_eq!(idx.slots(Component::W, &9), &[2, 1]);
        assert!(idx.is_flippable(Component::W, &9));
        idx.deregister(2, Component::W, &9);
        assert!(!idx.is_flippable(Component::W, &9));
        assert_eq!(idx.slots(Component::W, &9), &[1]);
        idx.deregister(1, Component::W, &9);
        assert_eq!(idx.distinct_values(Component::W), 0);
        assert!(idx.check_shape().is_ok());
    }

    #[test]
    fn flippable_swap_remove_keeps_others() {
        let mut idx = DuplicateIndex::<u64>::new();
        for v in [1u64, 2, 3] {
            idx.register(v as usize * 10, Component::U, &v);
            idx.register(1 + v as usize * 10, Component::U, &v);
        }
        assert_eq!(idx.flippable_len(Component::U), 3);
        idx.deregister(10, Component::U, &1);
        assert_eq!(idx.flippable_len(Component::U), 2);
        assert!(idx.is_flippable(Component::U, &2));
        assert!(idx.is_flippable(Component::U, &3));
        assert!(idx.check_shape().is_ok());
    }

    #[test]
    fn deregister_unknown_is_noop() {
        let mut idx = DuplicateIndex::<u64>::new();
        idx.register(0, Component::U, &4);
        idx.deregister(1, Component::U, &8);
        assert_eq!(idx.registrations(), 1);
        assert!(idx.check_shape().is_ok());
    }
}
