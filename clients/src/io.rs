//! Request and completion files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flipgraph::{Completion, ReduceRequest, Tensor, WideBits};
use serde::Serialize;

/// Reads a request JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a request.
pub fn read_request(path: &Path) -> Result<ReduceRequest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse request {}", path.display()))
}

/// Writes `value` as pretty JSON to `out`, or to stdout when `out` is `None`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match out {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write to stdout")
        }
    }
}

/// Tensor comparison of a request and its completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    /// The completion encodes the same tensor as the request.
    pub preserved: bool,
    /// Nonzero-parity cells of the request tensor.
    pub ones: usize,
    /// Cells where completion terms overlap and cancel.
    pub conflicts: usize,
}

/// Checks that `completion` encodes the same tensor as `request`.
///
/// # Errors
///
/// Returns an error if either term list does not pack at width `request.n`.
pub fn verify(request: &ReduceRequest, completion: &Completion) -> Result<Verification> {
    let before = request
        .decode::<WideBits>()
        .context("request terms do not pack")?;
    let reduced = ReduceRequest::new(completion.reduced_terms.clone(), request.n);
    let after = reduced
        .decode::<WideBits>()
        .context("completion terms do not pack")?;
    let before = Tensor::from_terms(request.n, &before);
    let after = Tensor::from_terms(request.n, &after);
    Ok(Verification {
        preserved: before == after,
        ones: before.ones().len(),
        conflicts: after.conflicts().len(),
    })
}
