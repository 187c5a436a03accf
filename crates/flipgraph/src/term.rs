//! Rank-1 terms and their three component slots.

use crate::bits::BitPattern;

/// Stable identifier of a term, assigned at construction and never reused.
pub type SlotId = usize;

/// One of the three factors of a rank-1 term.
///
/// The order `U -> V -> W -> U` is cyclic; a flip pivoting on component
/// `t` rewrites `t.next()` of one term and `t.prev()` of the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// First factor (rows of `A` in a matrix-multiplication tensor).
    U = 0,
    /// Second factor.
    V = 1,
    /// Third factor.
    W = 2,
}

impl Component {
    /// All components in cyclic order.
    pub const ALL: [Component; 3] = [Component::U, Component::V, Component::W];

    /// Position in `[U, V, W]`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Component at position `i mod 3`.
    #[inline]
    #[must_use]
    pub const fn from_index(i: usize) -> Self {
        match i % 3 {
            0 => Component::U,
            1 => Component::V,
            _ => Component::W,
        }
    }

    /// Cyclic successor: `U -> V -> W -> U`.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Cyclic predecessor: `U -> W -> V -> U`.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Lower-case name (`"u"`, `"v"`, `"w"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Component::U => "u",
            Component::V => "v",
            Component::W => "w",
        }
    }
}

/// A rank-1 term `u ⊗ v ⊗ w`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term<P> {
    /// First factor.
    pub u: P,
    /// Second factor.
    pub v: P,
    /// Third factor.
    pub w: P,
}

impl<P: BitPattern> Term<P> {
    /// Creates a term from its three factors.
    pub fn new(u: P, v: P, w: P) -> Self {
        Self { u, v, w }
    }

    /// The all-zero term of the given width.
    pub fn zero(width: usize) -> Self {
        Self::new(P::zero(width), P::zero(width), P::zero(width))
    }

    /// Borrow one factor.
    #[inline]
    pub fn get(&self, c: Component) -> &P {
        match c {
            Component::U => &self.u,
            Component::V => &self.v,
            Component::W => &self.w,
        }
    }

    /// Mutably borrow one factor.
    #[inline]
    pub fn get_mut(&mut self, c: Component) -> &mut P {
        match c {
            Component::U => &mut self.u,
            Component::V => &mut self.v,
            Component::W => &mut self.w,
        }
    }

    /// A term is live iff all three factors are nonzero.
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.u.is_zero() && !self.v.is_zero() && !self.w.is_zero()
    }
}
