//! Bit patterns used for the `u`, `v` and `w` vectors of a term.
//!
//! A pattern is a vector over GF(2): bit `i` is the coefficient of basis
//! index `i`. Addition is XOR. The descent never needs anything beyond
//! XOR, the zero test, equality and hashing, so the index structures are
//! generic over [`BitPattern`].
//!
//! # Representations
//!
//! | Type | Capacity | Notes |
//! |------|----------|-------|
//! | `u16`, `u32`, `u64`, `u128` | 16 / 32 / 64 / 128 bits | `Copy`, single-register XOR |
//! | [`WideBits`] | unbounded | boxed `u64` limbs |
//!
//! # Example
//!
//! ```
//! use flipgraph::bits::{BitPattern, WideBits};
//!
//! let a = <u64 as BitPattern>::from_indices(8, [0, 3]);
//! let b = <u64 as BitPattern>::from_indices(8, [3]);
//! assert_eq!(a.xor(&b), 0b0001);
//! assert!(a.xor(&a).is_zero());
//!
//! let wide = WideBits::from_indices(130, [0, 129]);
//! assert!(wide.get(129));
//! assert_eq!(wide.count_ones(), 2);
//! ```

use core::fmt;
use core::hash::Hash;

/// A fixed-width vector over GF(2).
///
/// Implementations must keep every value of one width in the same shape so
/// that equal vectors compare and hash equal. Bits at positions `>= width`
/// are always zero.
pub trait BitPattern: Clone + Eq + Hash + fmt::Debug + Send + 'static {
    /// Largest supported width, or `None` when the width is unbounded.
    const MAX_WIDTH: Option<usize>;

    /// The zero vector of the given width.
    fn zero(width: usize) -> Self;

    /// True if no bit is set.
    fn is_zero(&self) -> bool;

    /// Sum over GF(2).
    fn xor(&self, other: &Self) -> Self;

    /// Coefficient of basis index `index`; `false` beyond the capacity.
    fn get(&self, index: usize) -> bool;

    /// Sets the coefficient of basis index `index` to one. Indices beyond
    /// the capacity are ignored.
    fn set(&mut self, index: usize);

    /// Number of set bits.
    fn count_ones(&self) -> u32;

    /// Builds a vector of `width` bits with the given indices set.
    fn from_indices<I: IntoIterator<Item = usize>>(width: usize, indices: I) -> Self {
        let mut out = Self::zero(width);
        for i in indices {
            out.set(i);
        }
        out
    }

    /// Returns true if vectors of `width` bits fit this representation.
    fn supports_width(width: usize) -> bool {
        Self::MAX_WIDTH.map_or(true, |max| width <= max)
    }
}

macro_rules! impl_bit_pattern_scalar {
    ($ty:ty) => {
        impl BitPattern for $ty {
            const MAX_WIDTH: Option<usize> = Some(<$ty>::BITS as usize);

            #[inline(always)]
            fn zero(_width: usize) -> Self {
                0
            }
            #[inline(always)]
            fn is_zero(&self) -> bool {
                *self == 0
            }
            #[inline(always)]
            fn xor(&self, other: &Self) -> Self {
                *self ^ *other
            }
            #[inline(always)]
            fn get(&self, index: usize) -> bool {
                index < <$ty>::BITS as usize && (*self >> index) & 1 == 1
            }
            #[inline(always)]
            fn set(&mut self, index: usize) {
                if index < <$ty>::BITS as usize {
                    *self |= 1 << index;
                }
            }
            #[inline(always)]
            fn count_ones(&self) -> u32 {
                <$ty>::count_ones(*self)
            }
        }
    };
}

impl_bit_pattern_scalar!(u16);
impl_bit_pattern_scalar!(u32);
impl_bit_pattern_scalar!(u64);
impl_bit_pattern_scalar!(u128);

// -----------------------------------------------------------------------------
// Arbitrary width
// -----------------------------------------------------------------------------

/// A GF(2) vector of arbitrary width stored as little-endian `u64` limbs.
///
/// The limb count is fixed by the width at construction, so two values of
/// the same width always have the same shape.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WideBits {
    limbs: Box<[u64]>,
}

impl WideBits {
    /// Number of `u64` limbs needed for `width` bits.
    #[inline]
    #[must_use]
    pub const fn limbs_for(width: usize) -> usize {
        (width + 63) / 64
    }

    /// Borrow the raw limbs, least significant first.
    #[must_use]
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }
}

impl BitPattern for WideBits {
    const MAX_WIDTH: Option<usize> = None;

    fn zero(width: usize) -> Self {
        Self {
            limbs: vec![0u64; Self::limbs_for(width)].into_boxed_slice(),
        }
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    #[inline]
    fn xor(&self, other: &Self) -> Self {
        debug_assert_eq!(self.limbs.len(), other.limbs.len(), "width mismatch");
        Self {
            limbs: self
                .limbs
                .iter()
                .zip(other.limbs.iter())
                .map(|(a, b)| a ^ b)
                .collect(),
        }
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        self.limbs
            .get(index / 64)
            .map_or(false, |l| (l >> (index % 64)) & 1 == 1)
    }

    #[inline]
    fn set(&mut self, index: usize) {
        if let Some(l) = self.limbs.get_mut(index / 64) {
            *l |= 1 << (index % 64);
        }
    }

    fn count_ones(&self) -> u32 {
        self.limbs.iter().map(|l| l.count_ones()).sum()
    }
}

impl fmt::Debug for WideBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WideBits(")?;
        for (i, limb) in self.limbs.iter().enumerate().rev() {
            if i + 1 != self.limbs.len() {
                write!(f, "_")?;
            }
            write!(f, "{limb:016x}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_xor_and_zero() {
        let a: u64 = 0b1011;
        assert_eq!(a.xor(&0b0011), 0b1000);
        assert!(a.xor(&a).is_zero());
        assert!(<u64 as BitPattern>::zero(64).is_zero());
    }

    #[test]
    fn scalar_get_set() {
        let mut p = <u32 as BitPattern>::zero(32);
        p.set(0);
        p.set(31);
        assert!(p.get(0));
        assert!(p.get(31));
        assert!(!p.get(5));
        assert_eq!(BitPattern::count_ones(&p), 2);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut p = <u16 as BitPattern>::zero(16);
        p.set(16);
        p.set(1000);
        assert!(p.is_zero());
        assert!(!p.get(16));
        assert!(!u128::MAX.get(128));

        let mut w = WideBits::zero(64);
        w.set(64);
        assert!(w.is_zero());
        assert!(!w.get(64));
    }

    #[test]
    fn capacities() {
        assert!(<u64 as BitPattern>::supports_width(64));
        assert!(!<u64 as BitPattern>::supports_width(65));
        assert!(<u128 as BitPattern>::supports_width(128));
        assert!(WideBits::supports_width(100_000));
    }

    #[test]
    fn wide_shape_follows_width() {
        assert_eq!(WideBits::zero(1).limbs().len(), 1);
        assert_eq!(WideBits::zero(64).limbs().len(), 1);
        assert_eq!(WideBits::zero(65).limbs().len(), 2);
    }

    #[test]
    fn wide_xor_matches_scalar() {
        let idx = [1usize, 7, 40, 63];
        let other = [7usize, 12];
        let wa = WideBits::from_indices(64, idx);
        let wb = WideBits::from_indices(64, other);
        let sa = <u64 as BitPattern>::from_indices(64, idx);
        let sb = <u64 as BitPattern>::from_indices(64, other);
        assert_eq!(wa.xor(&wb).limbs(), &[sa ^ sb]);
    }

    #[test]
    fn wide_equality_and_zero() {
        let a = WideBits::from_indices(200, [0, 150, 199]);
        let b = WideBits::from_indices(200, [199, 150, 0]);
        assert_eq!(a, b);
        assert!(a.xor(&b).is_zero());
        assert_eq!(a.xor(&b), WideBits::zero(200));
    }

    #[test]
    fn wide_debug_is_hex() {
        let a = WideBits::from_indices(65, [0, 64]);
        assert_eq!(format!("{a:?}"), "WideBits(0000000000000001_0000000000000001)");
    }
}
