//! A decomposition under mutation: terms, duplicate index and live set.
//!
//! Slots are assigned at construction (`0..len`) and never reused. A slot
//! whose term gains a zero component dies: all three components are
//! zeroed and deregistered, and the slot leaves the live set for good.
//!
//! # Flip algebra
//!
//! Two terms sharing `a` in the pivot component satisfy, over GF(2),
//!
//! ```text
//! a⊗b₁⊗c₁ + a⊗b₂⊗c₂ = a⊗(b₁+b₂)⊗c₁ + a⊗b₂⊗(c₁+c₂)
//! ```
//!
//! so replacing `b₁ ← b₁+b₂` on the first slot and `c₂ ← c₁+c₂` on the
//! second leaves the encoded tensor unchanged. `b` and `c` are the cyclic
//! successor and predecessor of the pivot. Either sum can be zero, which
//! is how a flip lowers the rank.

use log::debug;
use rand::Rng;

use crate::bits::BitPattern;
use crate::error::{Error, InputError, Result};
use crate::index::DuplicateIndex;
use crate::sampler::{Flip, FlipSampler};
use crate::swap_list::SwapList;
use crate::tensor::Tensor;
use crate::term::{Component, SlotId, Term};

/// Term store with its incrementally maintained duplicate index.
#[derive(Clone, Debug)]
pub struct Scheme<P> {
    width: usize,
    terms: Vec<Term<P>>,
    index: DuplicateIndex<P>,
    live: SwapList<SlotId>,
}

impl<P: BitPattern> Scheme<P> {
    /// Builds a scheme over vectors of `width` bits.
    ///
    /// Terms with any zero component are stored dead (all-zero) and never
    /// indexed. Every live term registers its three components.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ZeroWidth`] or [`InputError::WidthTooLarge`]
    /// when `width` does not fit the pattern type.
    pub fn new(width: usize, terms: Vec<Term<P>>) -> Result<Self> {
        if width == 0 {
            return Err(InputError::ZeroWidth.into());
        }
        if let Some(capacity) = P::MAX_WIDTH.filter(|&cap| width > cap) {
            return Err(InputError::WidthTooLarge { width, capacity }.into());
        }

        let mut scheme = Self {
            width,
            index: DuplicateIndex::with_capacity(terms.len()),
            live: SwapList::with_capacity(terms.len()),
            terms,
        };
        for slot in 0..scheme.terms.len() {
            if scheme.terms[slot].is_live() {
                scheme.live.insert(slot);
                for c in Component::ALL {
                    scheme.index.register(slot, c, scheme.terms[slot].get(c));
                }
            } else {
                scheme.terms[slot] = Term::zero(width);
            }
        }
        debug!(
            "scheme built: {} slots, {} live, flippable u/v/w = {}/{}/{}",
            scheme.terms.len(),
            scheme.live.len(),
            scheme.index.flippable_len(Component::U),
            scheme.index.flippable_len(Component::V),
            scheme.index.flippable_len(Component::W),
        );
        Ok(scheme)
    }

    /// Builds a scheme from flat `[u₀, v₀, w₀, u₁, v₁, w₁, ...]` data.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::RaggedComponents`] if the length is not a
    /// multiple of three, and the errors of [`Scheme::new`].
    pub fn from_flat(width: usize, flat: Vec<P>) -> Result<Self> {
        if flat.len() % 3 != 0 {
            return Err(InputError::RaggedComponents { len: flat.len() }.into());
        }
        let mut terms = Vec::with_capacity(flat.len() / 3);
        let mut it = flat.into_iter();
        while let (Some(u), Some(v), Some(w)) = (it.next(), it.next(), it.next()) {
            terms.push(Term::new(u, v, w));
        }
        Self::new(width, terms)
    }

    /// Vector width in bits.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of slots, live or dead.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the scheme has no slots at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of live slots.
    #[inline]
    #[must_use]
    pub fn rank(&self) -> usize {
        self.live.len()
    }

    /// True if `slot` holds a live term.
    #[inline]
    #[must_use]
    pub fn is_live(&self, slot: SlotId) -> bool {
        self.live.contains(&slot)
    }

    /// Component `c` of `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: SlotId, c: Component) -> &P {
        self.terms[slot].get(c)
    }

    /// The term stored in `slot`.
    #[must_use]
    pub fn term(&self, slot: SlotId) -> Option<&Term<P>> {
        self.terms.get(slot)
    }

    /// All slots in id order, dead ones included (as all-zero terms).
    #[must_use]
    pub fn terms(&self) -> &[Term<P>] {
        &self.terms
    }

    /// Live terms in slot order.
    pub fn live_terms(&self) -> impl Iterator<Item = &Term<P>> + '_ {
        self.terms.iter().filter(|t| t.is_live())
    }

    /// Consumes the scheme, keeping live terms in slot order.
    #[must_use]
    pub fn into_live_terms(self) -> Vec<Term<P>> {
        self.terms.into_iter().filter(Term::is_live).collect()
    }

    /// The duplicate index.
    #[must_use]
    pub fn index(&self) -> &DuplicateIndex<P> {
        &self.index
    }

    /// Replaces component `c` of `slot` with `value`.
    ///
    /// Equal values are a no-op. A zero value kills the whole term. Dead
    /// slots never change.
    pub fn set(&mut self, slot: SlotId, c: Component, value: P) {
        if !self.is_live(slot) || *self.terms[slot].get(c) == value {
            return;
        }
        if value.is_zero() {
            self.kill(slot);
            return;
        }
        let old = core::mem::replace(self.terms[slot].get_mut(c), value);
        self.index.deregister(slot, c, &old);
        self.index.register(slot, c, self.terms[slot].get(c));
    }

    /// Zeroes every component of `slot` and drops it from the live set.
    fn kill(&mut self, slot: SlotId) {
        let dead = core::mem::replace(&mut self.terms[slot], Term::zero(self.width));
        for c in Component::ALL {
            self.index.deregister(slot, c, dead.get(c));
        }
        self.live.remove(&slot);
    }

    /// Applies a flip. Returns the number of terms it killed (0, 1 or 2).
    ///
    /// Both slots must be live, distinct, and share their `pivot` value.
    pub fn apply(&mut self, flip: Flip) -> usize {
        let Flip {
            pivot,
            first,
            second,
        } = flip;
        debug_assert_ne!(first, second);
        debug_assert_eq!(self.get(first, pivot), self.get(second, pivot));

        let next = pivot.next();
        let prev = pivot.prev();
        let new_next = self.get(first, next).xor(self.get(second, next));
        let new_prev = self.get(second, prev).xor(self.get(first, prev));

        let before = self.rank();
        self.set(first, next, new_next);
        self.set(second, prev, new_prev);
        before - self.rank()
    }

    /// Samples and applies one flip. Returns `None` when no flippable value
    /// remains.
    pub fn flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Flip> {
        let flip = FlipSampler.sample(&self.index, rng)?;
        self.apply(flip);
        Some(flip)
    }

    /// The GF(2) tensor encoded by the live terms.
    #[must_use]
    pub fn tensor(&self) -> Tensor {
        Tensor::from_terms(self.width, self.live_terms())
    }

    /// Cross-checks terms, live set and index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexCorrupted`] describing the first disagreement.
    pub fn audit(&self) -> Result<()> {
        self.index.check_shape().map_err(Error::IndexCorrupted)?;
        if !self.live.is_consistent() {
            return Err(Error::IndexCorrupted("live set lost its position map".into()));
        }

        let mut expected = 0usize;
        for (slot, term) in self.terms.iter().enumerate() {
            let live = term.is_live();
            if live != self.live.contains(&slot) {
                return Err(Error::IndexCorrupted(format!(
                    "slot {slot} live = {live} but live-set membership disagrees"
                )));
            }
            if !live {
                if Component::ALL.iter().any(|&c| !term.get(c).is_zero()) {
                    return Err(Error::IndexCorrupted(format!(
                        "dead slot {slot} has a nonzero component"
                    )));
                }
                continue;
            }
            for c in Component::ALL {
                expected += 1;
                if !self.index.slots(c, term.get(c)).contains(&slot) {
                    return Err(Error::IndexCorrupted(format!(
                        "slot {slot} missing under {} value {:?}",
                        c.name(),
                        term.get(c)
                    )));
                }
            }
        }
        let found = self.index.registrations();
        if found != expected {
            return Err(Error::IndexCorrupted(format!(
                "{found} registrations for {expected} live components"
            )));
        }
        Ok(())
    }
}
