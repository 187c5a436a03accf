//! The trilinear form a decomposition encodes.
//!
//! `T[i][j][k]` is the parity of the number of terms with `u_i = v_j =
//! w_k = 1`. Cells whose count is nonzero but even are *conflicts*: terms
//! overlap there and cancel, which usually marks redundancy a flip can
//! remove.

use crate::bits::BitPattern;
use crate::term::Term;

/// An `n × n × n` cube of per-cell term counts.
///
/// Equality is over GF(2): two tensors are equal when every cell has the
/// same parity, whatever the raw counts.
#[derive(Clone, Debug)]
pub struct Tensor {
    n: usize,
    counts: Vec<u32>,
}

impl Tensor {
    /// Accumulates the contribution of every term.
    pub fn from_terms<'a, P, I>(n: usize, terms: I) -> Self
    where
        P: BitPattern + 'a,
        I: IntoIterator<Item = &'a Term<P>>,
    {
        let mut counts = vec![0u32; n * n * n];
        for term in terms {
            let us: Vec<usize> = (0..n).filter(|&i| term.u.get(i)).collect();
            let vs: Vec<usize> = (0..n).filter(|&j| term.v.get(j)).collect();
            let ws: Vec<usize> = (0..n).filter(|&k| term.w.get(k)).collect();
            for &i in &us {
                for &j in &vs {
                    let row = (i * n + j) * n;
                    for &k in &ws {
                        counts[row + k] += 1;
                    }
                }
            }
        }
        Self { n, counts }
    }

    /// Side length.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of terms covering `(i, j, k)`.
    #[must_use]
    pub fn count(&self, i: usize, j: usize, k: usize) -> u32 {
        self.counts[(i * self.n + j) * self.n + k]
    }

    /// Tensor entry over GF(2).
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> bool {
        self.count(i, j, k) % 2 == 1
    }

    /// Coordinates of all set entries in `(i, j, k)` order.
    #[must_use]
    pub fn ones(&self) -> Vec<(usize, usize, usize)> {
        self.cells().filter(|&(_, c)| c % 2 == 1).map(|(p, _)| p).collect()
    }

    /// Coordinates with a nonzero even count.
    #[must_use]
    pub fn conflicts(&self) -> Vec<(usize, usize, usize)> {
        self.cells()
            .filter(|&(_, c)| c > 0 && c % 2 == 0)
            .map(|(p, _)| p)
            .collect()
    }

    fn cells(&self) -> impl Iterator<Item = ((usize, usize, usize), u32)> + '_ {
        let n = self.n;
        self.counts
            .iter()
            .enumerate()
            .map(move |(idx, &c)| ((idx / (n * n), (idx / n) % n, idx % n), c))
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self
                .counts
                .iter()
                .zip(&other.counts)
                .all(|(a, b)| a % 2 == b % 2)
    }
}

impl Eq for Tensor {}
