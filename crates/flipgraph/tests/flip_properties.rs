//! Property-based tests for the flip move and the descent loop.
//!
//! Every flip must keep the encoded tensor, never raise the rank, and
//! leave the duplicate index in agreement with the stored terms.

use flipgraph::request::live_only;
use flipgraph::{
    descend, reduce, BitPattern, Component, DescentConfig, DescentDriver, NoProgress,
    ReduceRequest, Scheme, Term, Termination, WideBits,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Decompositions over `n ≤ 5` with values drawn from a small pool, so
/// collisions (and therefore flips) are common. Zero values are allowed
/// and produce dead terms.
fn decomposition() -> impl Strategy<Value = (usize, Vec<Term<u64>>)> {
    (1usize..=5).prop_flat_map(|n| {
        let value = 0u64..(1 << n);
        let term = (value.clone(), value.clone(), value).prop_map(|(u, v, w)| Term::new(u, v, w));
        (Just(n), prop::collection::vec(term, 0..16))
    })
}

fn config(budget: u64, seed: u64) -> DescentConfig {
    DescentConfig {
        budget,
        progress_interval: 0,
        seed: Some(seed),
        audit: true,
    }
}

// =============================================================================
// Per-flip invariants
// =============================================================================

proptest! {
    /// The tensor is identical before and after every single flip.
    #[test]
    fn prop_flip_preserves_tensor((n, terms) in decomposition(), seed: u64) {
        let mut scheme = Scheme::new(n, terms).unwrap();
        let tensor = scheme.tensor();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..60 {
            if scheme.flip(&mut rng).is_none() {
                break;
            }
            prop_assert_eq!(scheme.tensor(), tensor.clone());
        }
    }

    /// Rank never increases from one flip to the next, and a flip kills at
    /// most two terms.
    #[test]
    fn prop_rank_monotone((n, terms) in decomposition(), seed: u64) {
        let mut scheme = Scheme::new(n, terms).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rank = scheme.rank();
        for _ in 0..60 {
            if scheme.flip(&mut rng).is_none() {
                break;
            }
            prop_assert!(scheme.rank() <= rank);
            prop_assert!(rank - scheme.rank() <= 2);
            rank = scheme.rank();
        }
    }

    /// After any sequence of flips, every nonzero component is indexed under
    /// its value and flippable lists hold exactly the shared values.
    #[test]
    fn prop_index_consistent((n, terms) in decomposition(), seed: u64) {
        let mut scheme = Scheme::new(n, terms).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert!(scheme.audit().is_ok());
        for _ in 0..60 {
            if scheme.flip(&mut rng).is_none() {
                break;
            }
            prop_assert!(scheme.audit().is_ok(), "{:?}", scheme.audit());
        }
        for slot in 0..scheme.len() {
            let live = scheme.is_live(slot);
            for c in Component::ALL {
                let value = scheme.get(slot, c);
                prop_assert_eq!(live, !value.is_zero());
                if live {
                    prop_assert!(scheme.index().slots(c, value).contains(&slot));
                    prop_assert_eq!(
                        scheme.index().is_flippable(c, value),
                        scheme.index().slots(c, value).len() >= 2
                    );
                }
            }
        }
    }

    /// Dead slots stay dead.
    #[test]
    fn prop_dead_never_revives((n, terms) in decomposition(), seed: u64) {
        let mut scheme = Scheme::new(n, terms).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dead: Vec<usize> = (0..scheme.len()).filter(|&s| !scheme.is_live(s)).collect();
        for _ in 0..60 {
            if scheme.flip(&mut rng).is_none() {
                break;
            }
            for &s in &dead {
                prop_assert!(!scheme.is_live(s));
            }
            dead = (0..scheme.len()).filter(|&s| !scheme.is_live(s)).collect();
        }
    }
}

// =============================================================================
// Whole-run properties
// =============================================================================

proptest! {
    /// The driver halts within the budget and reports consistent ranks.
    #[test]
    fn prop_run_terminates_within_budget(
        (n, terms) in decomposition(),
        budget in 0u64..300,
        seed: u64,
    ) {
        let scheme = Scheme::new(n, terms).unwrap();
        let initial = scheme.rank();
        let mut driver = DescentDriver::new(scheme, &config(budget, seed));
        let termination = driver.run(&mut NoProgress);
        prop_assert!(driver.iterations() <= budget);
        if termination == Termination::BudgetReached {
            prop_assert_eq!(driver.iterations(), budget);
        } else {
            prop_assert_eq!(driver.scheme().index().flippable_total(), 0);
        }
        let outcome = driver.finish();
        prop_assert_eq!(outcome.initial_rank, initial);
        prop_assert!(outcome.final_rank <= outcome.initial_rank);
        prop_assert_eq!(outcome.best_rank, outcome.final_rank);
        prop_assert_eq!(outcome.terms.len(), outcome.final_rank);
    }

    /// The live terms a run returns encode the input tensor.
    #[test]
    fn prop_outcome_encodes_input((n, terms) in decomposition(), seed: u64) {
        let scheme = Scheme::new(n, terms).unwrap();
        let tensor = scheme.tensor();
        let outcome = descend(scheme, &config(200, seed), &mut NoProgress, None).unwrap();
        let after = Scheme::new(n, outcome.terms).unwrap();
        prop_assert_eq!(after.tensor(), tensor);
    }

    /// A completion holds only live terms, and filtering is idempotent on
    /// both the raw request terms and the reduced ones.
    #[test]
    fn prop_refiltering_is_idempotent(
        (n, terms) in decomposition(),
        budget in 0u64..200,
        seed: u64,
    ) {
        let mut request = ReduceRequest::from_terms(n, &terms);
        request.flip_budget = budget;
        let once = live_only(&request.terms);
        prop_assert_eq!(live_only(&once), once.clone());

        let completion = reduce(&request, &config(budget, seed), &mut NoProgress, None).unwrap();
        prop_assert_eq!(live_only(&completion.reduced_terms), completion.reduced_terms.clone());
        let reduced = live_only(&completion.reduced_terms);
        prop_assert_eq!(live_only(&reduced), reduced.clone());
        prop_assert_eq!(completion.initial_rank, once.len());
        prop_assert_eq!(completion.final_rank, reduced.len());
    }

    /// Narrow and wide representations walk the same path for the same seed.
    #[test]
    fn prop_wide_matches_narrow((n, terms) in decomposition(), seed: u64) {
        let wide_terms: Vec<Term<WideBits>> = terms
            .iter()
            .map(|t| {
                let widen = |p: &u64| WideBits::from_indices(n, (0..n).filter(|&i| p.get(i)));
                Term::new(widen(&t.u), widen(&t.v), widen(&t.w))
            })
            .collect();
        let narrow = descend(Scheme::new(n, terms).unwrap(), &config(100, seed), &mut NoProgress, None)
            .unwrap();
        let wide = descend(Scheme::new(n, wide_terms).unwrap(), &config(100, seed), &mut NoProgress, None)
            .unwrap();
        prop_assert_eq!(narrow.final_rank, wide.final_rank);
        prop_assert_eq!(narrow.iterations, wide.iterations);
        for (a, b) in narrow.terms.iter().zip(&wide.terms) {
            for c in Component::ALL {
                prop_assert_eq!(&WideBits::from_indices(n, (0..n).filter(|&i| a.get(c).get(i))), b.get(c));
            }
        }
    }
}
