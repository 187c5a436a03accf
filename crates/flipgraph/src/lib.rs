//! Flip-graph descent over GF(2).
//!
//! A decomposition of a trilinear form over GF(2) is a list of rank-1
//! terms `u ⊗ v ⊗ w` whose sum (mod 2) is the form. For matrix
//! multiplication the number of terms is the number of scalar products a
//! bilinear algorithm needs. This crate lowers that number by random local
//! search on the *flip graph*.
//!
//! # Moves
//!
//! Whenever two terms agree in one factor they can exchange mass in the
//! other two without changing the sum:
//!
//! ```text
//! a⊗b₁⊗c₁ + a⊗b₂⊗c₂  =  a⊗(b₁+b₂)⊗c₁ + a⊗b₂⊗(c₁+c₂)
//! ```
//!
//! If `b₁ = b₂` or `c₁ = c₂` a term vanishes and the rank drops.
//!
//! # Layers
//!
//! | Layer | Type | Role |
//! |-------|------|------|
//! | Bits | [`BitPattern`], [`WideBits`] | GF(2) vectors |
//! | Store | [`Scheme`] | terms, live set, [`DuplicateIndex`] |
//! | Sampler | [`FlipSampler`] | uniform flip candidates |
//! | Driver | [`DescentDriver`] | budgeted loop, progress, cancellation |
//! | Host | [`ReduceRequest`], [`host::Reducer`] | validated requests, background runs |
//!
//! # Example
//!
//! ```
//! use flipgraph::{generate, DescentConfig, DescentDriver, NoProgress, Scheme};
//!
//! let terms = generate::naive_matmul::<u64>(2);
//! let scheme = Scheme::new(4, terms).unwrap();
//! let before = scheme.tensor();
//!
//! let config = DescentConfig { budget: 5_000, seed: Some(7), ..DescentConfig::default() };
//! let mut driver = DescentDriver::new(scheme, &config);
//! driver.run(&mut NoProgress);
//!
//! assert_eq!(driver.scheme().tensor(), before);
//! assert!(driver.scheme().rank() <= 8);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod bits;
pub mod descent;
pub mod error;
pub mod generate;
pub mod host;
pub mod index;
pub mod request;
pub mod sampler;
pub mod scheme;
pub mod swap_list;
pub mod tensor;
pub mod term;

pub use bits::{BitPattern, WideBits};
pub use descent::{
    descend, DescentConfig, DescentDriver, NoProgress, Outcome, Progress, ProgressObserver,
    Termination, DEFAULT_FLIP_BUDGET, DEFAULT_PROGRESS_INTERVAL,
};
pub use error::{Error, InputError, Result};
pub use index::DuplicateIndex;
pub use request::{reduce, Completion, ReduceRequest, TermBits};
pub use sampler::{Flip, FlipSampler};
pub use scheme::Scheme;
pub use tensor::Tensor;
pub use term::{Component, SlotId, Term};
