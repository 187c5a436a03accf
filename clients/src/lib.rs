//! Shared plumbing for the `flip-reduce` and `flip-generate` binaries.
//!
//! - [`config`]: the optional `flip.toml` file and its merge with flags.
//! - [`io`]: reading requests, writing JSON, and tensor verification.

pub mod config;
pub mod io;
