//! Starting decompositions.
//!
//! Random generators produce arbitrary (usually redundant) term lists for
//! exercising the search; [`naive_matmul`] produces the schoolbook
//! decomposition of `m × m` matrix multiplication, the usual starting point
//! for a descent.

use rand::Rng;

use crate::bits::BitPattern;
use crate::term::Term;

/// Default bit density of [`sparse`].
pub const DEFAULT_DENSITY: f64 = 0.3;

/// `r` terms whose vectors each have exactly one uniformly placed bit.
///
/// No such vector exists when `n` is zero, so the result is then empty.
pub fn one_hot<P: BitPattern, R: Rng + ?Sized>(n: usize, r: usize, rng: &mut R) -> Vec<Term<P>> {
    if n == 0 {
        return Vec::new();
    }
    let mut draw = || P::from_indices(n, [rng.gen_range(0..n)]);
    (0..r).map(|_| Term::new(draw(), draw(), draw())).collect()
}

/// `r` terms whose bits are set independently with probability `density`.
///
/// Vectors may come out zero; such terms start dead.
pub fn sparse<P: BitPattern, R: Rng + ?Sized>(
    n: usize,
    r: usize,
    density: f64,
    rng: &mut R,
) -> Vec<Term<P>> {
    let density = density.clamp(0.0, 1.0);
    let mut draw = || {
        let bits: Vec<usize> = (0..n).filter(|_| rng.gen_bool(density)).collect();
        P::from_indices(n, bits)
    };
    (0..r).map(|_| Term::new(draw(), draw(), draw())).collect()
}

/// The `m³` schoolbook terms of `m × m` matrix multiplication.
///
/// Basis indices are row-major: `A[r][s]` is `u` bit `r·m+s`, `B[s][t]` is
/// `v` bit `s·m+t`, and `C[r][t]` is `w` bit `r·m+t`, so `n = m²`.
pub fn naive_matmul<P: BitPattern>(m: usize) -> Vec<Term<P>> {
    let n = m * m;
    let mut terms = Vec::with_capacity(m * m * m);
    for r in 0..m {
        for s in 0..m {
            for t in 0..m {
                terms.push(Term::new(
                    P::from_indices(n, [r * m + s]),
                    P::from_indices(n, [s * m + t]),
                    P::from_indices(n, [r * m + t]),
                ));
            }
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn one_hot_vectors_have_one_bit() {
        let mut rng = StdRng::seed_from_u64(0);
        let terms: Vec<Term<u64>> = one_hot(5, 20, &mut rng);
        assert_eq!(terms.len(), 20);
        for t in &terms {
            assert!(t.is_live());
            assert_eq!(t.u.count_ones() + t.v.count_ones() + t.w.count_ones(), 3);
            assert!(t.u < 32 && t.v < 32 && t.w < 32);
        }
    }

    #[test]
    fn one_hot_of_zero_width_is_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(one_hot::<u64, _>(0, 5, &mut rng).is_empty());
    }

    #[test]
    fn sparse_density_extremes() {
        let mut rng = StdRng::seed_from_u64(0);
        let full: Vec<Term<u32>> = sparse(6, 4, 1.0, &mut rng);
        assert!(full.iter().all(|t| t.u == 0b11_1111));
        let empty: Vec<Term<u32>> = sparse(6, 4, 0.0, &mut rng);
        assert!(empty.iter().all(|t| !t.is_live()));
    }

    #[test]
    fn naive_matmul_encodes_product() {
        let m = 2;
        let terms: Vec<Term<u64>> = naive_matmul(m);
        assert_eq!(terms.len(), 8);
        let x = Tensor::from_terms(4, &terms);
        for r in 0..m {
            for s in 0..m {
                for s2 in 0..m {
                    for t in 0..m {
                        for r2 in 0..m {
                            for t2 in 0..m {
                                let want = s == s2 && r == r2 && t == t2;
                                assert_eq!(x.get(r * m + s, s2 * m + t, r2 * m + t2), want);
                            }
                        }
                    }
                }
            }
        }
    }
}
