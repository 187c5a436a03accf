//! Host-facing request and completion shapes.
//!
//! Terms cross the boundary as three 0/1 vectors of length `n`:
//!
//! ```json
//! { "terms": [ { "u": [1,0,0,1], "v": [1,0,0,1], "w": [1,0,0,1] } ],
//!   "n": 4,
//!   "flipBudget": 1000000 }
//! ```
//!
//! Element `i` becomes bit `i` of the packed pattern. The pattern type is
//! picked from `n`: `u64` up to 64, `u128` up to 128, [`WideBits`] beyond.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bits::{BitPattern, WideBits};
use crate::descent::{descend, DescentConfig, Outcome, ProgressObserver, DEFAULT_FLIP_BUDGET};
use crate::error::{InputError, Result};
use crate::scheme::Scheme;
use crate::term::{Component, Term};

/// One term as three 0/1 vectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermBits {
    /// First factor.
    pub u: Vec<u8>,
    /// Second factor.
    pub v: Vec<u8>,
    /// Third factor.
    pub w: Vec<u8>,
}

impl TermBits {
    /// Unpacks a term into vectors of `n` entries.
    pub fn from_term<P: BitPattern>(term: &Term<P>, n: usize) -> Self {
        Self {
            u: unpack(&term.u, n),
            v: unpack(&term.v, n),
            w: unpack(&term.w, n),
        }
    }

    /// Packs the three vectors; `position` is only used in error reports.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::WidthMismatch`] or [`InputError::NotABit`].
    pub fn to_term<P: BitPattern>(&self, n: usize, position: usize) -> Result<Term<P>, InputError> {
        Ok(Term::new(
            pack(&self.u, n, position, Component::U)?,
            pack(&self.v, n, position, Component::V)?,
            pack(&self.w, n, position, Component::W)?,
        ))
    }

    /// True if every vector has at least one set entry.
    #[must_use]
    pub fn is_live(&self) -> bool {
        [&self.u, &self.v, &self.w]
            .iter()
            .all(|bits| bits.iter().any(|&b| b != 0))
    }
}

/// Packs a 0/1 vector of exactly `n` entries.
///
/// # Errors
///
/// Returns [`InputError::WidthMismatch`] for a wrong length and
/// [`InputError::NotABit`] for entries other than 0 or 1.
pub fn pack<P: BitPattern>(
    bits: &[u8],
    n: usize,
    term: usize,
    component: Component,
) -> Result<P, InputError> {
    if bits.len() != n {
        return Err(InputError::WidthMismatch {
            term,
            component,
            found: bits.len(),
            expected: n,
        });
    }
    let mut out = P::zero(n);
    for (position, &value) in bits.iter().enumerate() {
        match value {
            0 => {}
            1 => out.set(position),
            _ => {
                return Err(InputError::NotABit {
                    term,
                    component,
                    position,
                    value,
                })
            }
        }
    }
    Ok(out)
}

/// Unpacks the low `n` bits of a pattern.
pub fn unpack<P: BitPattern>(pattern: &P, n: usize) -> Vec<u8> {
    (0..n).map(|i| u8::from(pattern.get(i))).collect()
}

/// A reduction request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceRequest {
    /// Starting decomposition.
    pub terms: Vec<TermBits>,
    /// Vector width.
    pub n: usize,
    /// Maximum number of flips.
    #[serde(default = "default_flip_budget")]
    pub flip_budget: u64,
}

fn default_flip_budget() -> u64 {
    DEFAULT_FLIP_BUDGET
}

impl ReduceRequest {
    /// A request with the default flip budget.
    #[must_use]
    pub fn new(terms: Vec<TermBits>, n: usize) -> Self {
        Self {
            terms,
            n,
            flip_budget: DEFAULT_FLIP_BUDGET,
        }
    }

    /// Builds a request from packed terms.
    pub fn from_terms<'a, P, I>(n: usize, terms: I) -> Self
    where
        P: BitPattern + 'a,
        I: IntoIterator<Item = &'a Term<P>>,
    {
        Self::new(terms.into_iter().map(|t| TermBits::from_term(t, n)).collect(), n)
    }

    /// Checks shape and contents without building any state.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.n == 0 {
            return Err(InputError::ZeroWidth);
        }
        for (i, t) in self.terms.iter().enumerate() {
            t.to_term::<WideBits>(self.n, i)?;
        }
        Ok(())
    }

    /// Packs every term into `P`.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    pub fn decode<P: BitPattern>(&self) -> Result<Vec<Term<P>>, InputError> {
        if self.n == 0 {
            return Err(InputError::ZeroWidth);
        }
        if let Some(capacity) = P::MAX_WIDTH.filter(|&cap| self.n > cap) {
            return Err(InputError::WidthTooLarge {
                width: self.n,
                capacity,
            });
        }
        self.terms
            .iter()
            .enumerate()
            .map(|(i, t)| t.to_term(self.n, i))
            .collect()
    }
}

/// Terminal result of a reduction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Live terms at termination; dead slots are removed.
    pub reduced_terms: Vec<TermBits>,
    /// Live terms at construction.
    pub initial_rank: usize,
    /// Live terms at termination.
    pub final_rank: usize,
}

impl Completion {
    fn from_outcome<P: BitPattern>(outcome: &Outcome<P>, n: usize) -> Self {
        Self {
            reduced_terms: outcome
                .terms
                .iter()
                .map(|t| TermBits::from_term(t, n))
                .collect(),
            initial_rank: outcome.initial_rank,
            final_rank: outcome.final_rank,
        }
    }
}

/// Runs one reduction to completion on the calling thread.
///
/// `config.budget` is replaced by the request's `flip_budget`.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] before any search starts if the
/// request is malformed, or [`crate::Error::IndexCorrupted`] if
/// `config.audit` is set and the final audit fails.
pub fn reduce<O: ProgressObserver + ?Sized>(
    request: &ReduceRequest,
    config: &DescentConfig,
    observer: &mut O,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Completion> {
    let config = DescentConfig {
        budget: request.flip_budget,
        ..config.clone()
    };
    match request.n {
        n if n <= 64 => reduce_as::<u64, O>(request, &config, observer, cancel),
        n if n <= 128 => reduce_as::<u128, O>(request, &config, observer, cancel),
        _ => reduce_as::<WideBits, O>(request, &config, observer, cancel),
    }
}

fn reduce_as<P: BitPattern, O: ProgressObserver + ?Sized>(
    request: &ReduceRequest,
    config: &DescentConfig,
    observer: &mut O,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Completion> {
    let terms = request.decode::<P>()?;
    let scheme = Scheme::new(request.n, terms)?;
    let outcome = descend(scheme, config, observer, cancel)?;
    Ok(Completion::from_outcome(&outcome, request.n))
}

/// Keeps only the live terms.
#[must_use]
pub fn live_only(terms: &[TermBits]) -> Vec<TermBits> {
    terms.iter().filter(|t| t.is_live()).cloned().collect()
}
