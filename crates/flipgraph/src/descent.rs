//! Flip-graph descent.
//!
//! The driver owns a [`Scheme`] and an RNG and applies one random flip per
//! iteration until the flip budget is spent or no flippable value is left.
//!
//! ```text
//! Running ──flip applied──▶ Running
//!    │ no candidate            │ budget spent          │ cancel flag
//!    ▼                         ▼                       ▼
//! Exhausted               BudgetReached            Cancelled
//! ```
//!
//! Every `progress_interval` iterations a [`Progress`] snapshot is handed to
//! the observer. Observers only read; nothing they do feeds back into the
//! search.
//!
//! # Example
//!
//! ```
//! use flipgraph::{DescentConfig, DescentDriver, NoProgress, Scheme, Term};
//!
//! // Two identical terms cancel on the first flip.
//! let terms = vec![Term::<u64>::new(3, 5, 9), Term::new(3, 5, 9), Term::new(1, 2, 4)];
//! let scheme = Scheme::new(4, terms).unwrap();
//! let config = DescentConfig { seed: Some(1), ..DescentConfig::default() };
//! let mut driver = DescentDriver::new(scheme, &config);
//! driver.run(&mut NoProgress);
//! let outcome = driver.finish();
//! assert_eq!((outcome.initial_rank, outcome.final_rank), (3, 1));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bits::BitPattern;
use crate::error::Result;
use crate::sampler::Flip;
use crate::scheme::Scheme;
use crate::term::Term;

/// Default number of flips per run.
pub const DEFAULT_FLIP_BUDGET: u64 = 1_000_000;

/// Default number of iterations between progress observations.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Tunables for one descent run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescentConfig {
    /// Maximum number of flips.
    pub budget: u64,
    /// Iterations between progress observations; `0` disables them.
    pub progress_interval: u64,
    /// RNG seed; `None` draws one from the operating system.
    pub seed: Option<u64>,
    /// Cross-check the index against the terms when the run ends.
    pub audit: bool,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_FLIP_BUDGET,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            seed: None,
            audit: false,
        }
    }
}

impl DescentConfig {
    /// An RNG for this configuration.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Read-only snapshot emitted while a run is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Zero-based iteration that produced this snapshot.
    pub iteration: u64,
    /// Flip budget of the run.
    pub budget: u64,
    /// Live terms after this iteration.
    pub current_rank: usize,
    /// Lowest rank seen so far.
    pub best_rank: usize,
}

/// Receives progress snapshots.
pub trait ProgressObserver {
    /// Called every `progress_interval` iterations.
    fn observe(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn observe(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Observer that discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn observe(&mut self, _progress: &Progress) {}
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// No flippable value remained.
    Exhausted,
    /// The flip budget was spent.
    BudgetReached,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Final state of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<P> {
    /// Live terms in slot order.
    pub terms: Vec<Term<P>>,
    /// Live terms at construction.
    pub initial_rank: usize,
    /// Live terms at termination.
    pub final_rank: usize,
    /// Lowest rank observed; equals `final_rank` since flips never raise it.
    pub best_rank: usize,
    /// Flips applied.
    pub iterations: u64,
    /// Why the run stopped; `None` if [`DescentDriver::run`] was never called.
    pub termination: Option<Termination>,
}

/// Runs the flip loop over one scheme.
#[derive(Debug)]
pub struct DescentDriver<P, R = StdRng> {
    scheme: Scheme<P>,
    rng: R,
    budget: u64,
    progress_interval: u64,
    initial_rank: usize,
    best_rank: usize,
    iterations: u64,
    termination: Option<Termination>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<P: BitPattern> DescentDriver<P, StdRng> {
    /// Creates a driver seeded from `config`.
    #[must_use]
    pub fn new(scheme: Scheme<P>, config: &DescentConfig) -> Self {
        Self::with_rng(scheme, config, config.rng())
    }
}

impl<P: BitPattern, R: Rng> DescentDriver<P, R> {
    /// Creates a driver drawing from a caller-supplied RNG.
    pub fn with_rng(scheme: Scheme<P>, config: &DescentConfig, rng: R) -> Self {
        let rank = scheme.rank();
        Self {
            scheme,
            rng,
            budget: config.budget,
            progress_interval: config.progress_interval,
            initial_rank: rank,
            best_rank: rank,
            iterations: 0,
            termination: None,
            cancel: None,
        }
    }

    /// Polls `flag` once per iteration; a raised flag ends the run.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The scheme being searched.
    #[must_use]
    pub fn scheme(&self) -> &Scheme<P> {
        &self.scheme
    }

    /// Live terms at construction.
    #[must_use]
    pub fn initial_rank(&self) -> usize {
        self.initial_rank
    }

    /// Lowest rank seen so far.
    #[must_use]
    pub fn best_rank(&self) -> usize {
        self.best_rank
    }

    /// Flips applied so far.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Samples and applies one flip, or returns `None` if none is possible.
    pub fn step(&mut self) -> Option<Flip> {
        let flip = self.scheme.flip(&mut self.rng)?;
        self.iterations += 1;
        let rank = self.scheme.rank();
        debug_assert!(rank <= self.best_rank, "flip raised the rank");
        self.best_rank = self.best_rank.min(rank);
        Some(flip)
    }

    /// Runs until the budget is spent, no flip is possible, or the
    /// cancellation flag is raised.
    pub fn run<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> Termination {
        let mut termination = Termination::BudgetReached;
        for i in 0..self.budget {
            if self.cancelled() {
                warn!("descent cancelled after {i} flips at rank {}", self.scheme.rank());
                termination = Termination::Cancelled;
                break;
            }
            if self.step().is_none() {
                termination = Termination::Exhausted;
                break;
            }
            if self.progress_interval != 0 && i % self.progress_interval == 0 {
                let progress = Progress {
                    iteration: i,
                    budget: self.budget,
                    current_rank: self.scheme.rank(),
                    best_rank: self.best_rank,
                };
                debug!(
                    "flip {}/{}: rank {} (best {})",
                    progress.iteration, progress.budget, progress.current_rank, progress.best_rank
                );
                observer.observe(&progress);
            }
        }
        info!(
            "descent stopped ({termination:?}) after {} flips: rank {} -> {}",
            self.iterations,
            self.initial_rank,
            self.scheme.rank()
        );
        self.termination = Some(termination);
        termination
    }

    /// Cross-checks the scheme's index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IndexCorrupted`] on any inconsistency.
    pub fn audit(&self) -> Result<()> {
        self.scheme.audit().map_err(|e| {
            log::error!("{e}");
            e
        })
    }

    /// Consumes the driver, keeping the live terms.
    pub fn finish(self) -> Outcome<P> {
        let final_rank = self.scheme.rank();
        Outcome {
            terms: self.scheme.into_live_terms(),
            initial_rank: self.initial_rank,
            final_rank,
            best_rank: self.best_rank,
            iterations: self.iterations,
            termination: self.termination,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Builds a driver from `config`, runs it, and returns the outcome.
///
/// # Errors
///
/// Returns [`crate::Error::IndexCorrupted`] if `config.audit` is set and
/// the final audit fails.
pub fn descend<P, O>(
    scheme: Scheme<P>,
    config: &DescentConfig,
    observer: &mut O,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Outcome<P>>
where
    P: BitPattern,
    O: ProgressObserver + ?Sized,
{
    let mut driver = DescentDriver::new(scheme, config);
    if let Some(flag) = cancel {
        driver = driver.with_cancel_flag(flag);
    }
    driver.run(observer);
    if config.audit {
        driver.audit()?;
    }
    Ok(driver.finish())
}
