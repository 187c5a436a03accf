//! Error types.

use thiserror::Error;

use crate::term::Component;

/// Errors raised by the search engine and its host boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The request was rejected before any state was built.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// A reduction is already running on this host.
    #[error("a reduction is already in progress")]
    AlreadyRunning,

    /// The duplicate index no longer agrees with the stored terms.
    #[error("duplicate index out of sync: {0}")]
    IndexCorrupted(String),

    /// The background worker ended without delivering a result.
    #[error("reduction worker failed: {0}")]
    WorkerFailed(String),
}

/// Reasons a request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Flat component data whose length is not a multiple of three.
    #[error("{len} component values do not form whole (u, v, w) terms")]
    RaggedComponents {
        /// Number of values supplied.
        len: usize,
    },

    /// A vector whose length differs from the declared width.
    #[error("term {term} component {component:?} has {found} entries, expected {expected}")]
    WidthMismatch {
        /// Term position in the request.
        term: usize,
        /// Offending component.
        component: Component,
        /// Length found.
        found: usize,
        /// Declared width `n`.
        expected: usize,
    },

    /// A vector entry other than 0 or 1.
    #[error("term {term} component {component:?} entry {position} is {value}, expected 0 or 1")]
    NotABit {
        /// Term position in the request.
        term: usize,
        /// Offending component.
        component: Component,
        /// Entry position inside the vector.
        position: usize,
        /// Value found.
        value: u8,
    },

    /// A declared width of zero.
    #[error("vector width must be at least 1")]
    ZeroWidth,

    /// A width the chosen bit representation cannot hold.
    #[error("vector width {width} exceeds the {capacity}-bit representation")]
    WidthTooLarge {
        /// Declared width.
        width: usize,
        /// Capacity of the representation.
        capacity: usize,
    },
}

/// Result alias for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    /// True for errors raised while validating a request.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
