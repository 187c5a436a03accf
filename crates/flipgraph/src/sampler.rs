//! Drawing flip candidates from the duplicate index.
//!
//! A candidate is a component `t` and two distinct slots that hold the
//! same value in `t`. The draw is two-stage:
//!
//! 1. one uniform draw over all flippable `(t, value)` pairs, so a
//!    component is chosen with probability proportional to its number of
//!    distinct flippable values (not to the size of their slot lists);
//! 2. two uniform draws without replacement from that value's slots.

use rand::Rng;

use crate::bits::BitPattern;
use crate::index::DuplicateIndex;
use crate::term::{Component, SlotId};

/// A flip move: `first` and `second` share a value in `pivot`.
///
/// Applying it rewrites `pivot.next()` of `first` and `pivot.prev()` of
/// `second`. The roles are not symmetric, which is why the sampler
/// randomizes which slot is drawn first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Flip {
    /// Component whose value the two slots share.
    pub pivot: Component,
    /// Slot whose `pivot.next()` component is replaced.
    pub first: SlotId,
    /// Slot whose `pivot.prev()` component is replaced.
    pub second: SlotId,
}

/// Uniform flip candidate sampler.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipSampler;

impl FlipSampler {
    /// Draws a candidate, or `None` when no component has a flippable value.
    pub fn sample<P: BitPattern, R: Rng + ?Sized>(
        &self,
        index: &DuplicateIndex<P>,
        rng: &mut R,
    ) -> Option<Flip> {
        let counts = Component::ALL.map(|c| index.flippable_len(c));
        let total: usize = counts.iter().sum();
        if total == 0 {
            return None;
        }

        let mut x = rng.gen_range(0..total);
        let mut pivot = Component::U;
        for c in Component::ALL {
            if x < counts[c.index()] {
                pivot = c;
                break;
            }
            x -= counts[c.index()];
        }

        let value = index.flippable_value(pivot, x)?;
        let slots = index.slots(pivot, value);
        if slots.len() < 2 {
            return None;
        }

        let i1 = rng.gen_range(0..slots.len());
        let mut i2 = rng.gen_range(0..slots.len() - 1);
        if i2 >= i1 {
            i2 += 1;
        }
        Some(Flip {
            pivot,
            first: slots[i1],
            second: slots[i2],
        })
    }
}
