//! Background execution of reductions.
//!
//! A [`Reducer`] runs at most one search at a time on a dedicated thread.
//! The worker streams [`ReductionEvent`]s over an unbounded channel, so
//! reporting never blocks the search, and ends every run with exactly one
//! `Complete` or `Failed` event.
//!
//! ```no_run
//! use flipgraph::host::{Reducer, ReductionEvent};
//! use flipgraph::{DescentConfig, ReduceRequest};
//!
//! # fn demo(request: ReduceRequest) -> flipgraph::Result<()> {
//! let reducer = Reducer::new();
//! let handle = reducer.submit(request, DescentConfig::default())?;
//! let done = handle.wait(|p| eprintln!("{}/{} rank {}", p.iteration, p.budget, p.current_rank))?;
//! println!("{} -> {}", done.initial_rank, done.final_rank);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use crate::descent::{DescentConfig, Progress};
use crate::error::{Error, Result};
use crate::request::{reduce, Completion, ReduceRequest};

/// Messages from a running reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReductionEvent {
    /// Periodic snapshot.
    Progress(Progress),
    /// Terminal success.
    Complete(Completion),
    /// Terminal failure; no completion follows.
    Failed(String),
}

/// Runs reductions one at a time on a background thread.
#[derive(Clone, Debug, Default)]
pub struct Reducer {
    busy: Arc<AtomicBool>,
}

/// Releases the reducer when dropped; the worker drops it just before its
/// terminal event, or during unwinding if the search panics.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Reducer {
    /// Creates an idle reducer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submitted reduction is still running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validates `request` and starts reducing it in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] while another reduction is active
    /// and [`Error::InvalidInput`] for a malformed request; in both cases
    /// no worker is started.
    pub fn submit(&self, request: ReduceRequest, config: DescentConfig) -> Result<ReductionHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));
        request.validate()?;

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let worker = thread::Builder::new()
            .name("flipgraph-descent".into())
            .spawn(move || run_worker(&request, &config, &tx, worker_cancel, guard))
            .map_err(|e| Error::WorkerFailed(e.to_string()))?;

        Ok(ReductionHandle {
            events: rx,
            cancel,
            worker: Some(worker),
        })
    }
}

fn run_worker(
    request: &ReduceRequest,
    config: &DescentConfig,
    tx: &Sender<ReductionEvent>,
    cancel: Arc<AtomicBool>,
    guard: BusyGuard,
) {
    debug!(
        "worker started: {} terms, n = {}, budget {}",
        request.terms.len(),
        request.n,
        request.flip_budget
    );
    let mut forward = |p: &Progress| {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(ReductionEvent::Progress(*p));
    };
    let event = match reduce(request, config, &mut forward, Some(cancel)) {
        Ok(completion) => ReductionEvent::Complete(completion),
        Err(e) => ReductionEvent::Failed(e.to_string()),
    };
    // The reducer is free again before the host can observe the result.
    drop(guard);
    let _ = tx.send(event);
}

/// A running reduction.
#[derive(Debug)]
pub struct ReductionHandle {
    events: Receiver<ReductionEvent>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReductionHandle {
    /// The event stream; it ends after the terminal event.
    #[must_use]
    pub fn events(&self) -> &Receiver<ReductionEvent> {
        &self.events
    }

    /// Asks the worker to stop at its next iteration. The run still ends
    /// with a full completion.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Blocks until the run ends, passing every progress snapshot to
    /// `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerFailed`] if the run reported a failure or the
    /// worker died without a terminal event.
    pub fn wait<F: FnMut(&Progress)>(mut self, mut on_progress: F) -> Result<Completion> {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                ReductionEvent::Progress(p) => on_progress(&p),
                ReductionEvent::Complete(c) => {
                    outcome = Some(Ok(c));
                    break;
                }
                ReductionEvent::Failed(msg) => {
                    outcome = Some(Err(Error::WorkerFailed(msg)));
                    break;
                }
            }
        }
        let joined = self.worker.take().map(JoinHandle::join);
        match (outcome, joined) {
            (Some(result), _) => result,
            (None, Some(Err(_))) => Err(Error::WorkerFailed("worker panicked".into())),
            (None, _) => Err(Error::WorkerFailed(
                "worker exited without a result".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TermBits;

    fn request(budget: u64) -> ReduceRequest {
        let t = TermBits {
            u: vec![1, 0],
            v: vec![0, 1],
            w: vec![1, 1],
        };
        let s = TermBits {
            u: vec![1, 0],
            v: vec![1, 0],
            w: vec![0, 1],
        };
        let mut r = ReduceRequest::new(vec![t, s], 2);
        r.flip_budget = budget;
        r
    }

    #[test]
    fn completes_and_releases() {
        let reducer = Reducer::new();
        let handle = reducer.submit(request(100), DescentConfig::default()).unwrap();
        let done = handle.wait(|_| {}).unwrap();
        assert_eq!(done.initial_rank, 2);
        assert!(done.final_rank <= 2);
        // The busy flag is cleared before the completion is sent.
        assert!(!reducer.is_busy());
    }

    #[test]
    fn invalid_request_is_rejected_and_releases() {
        let reducer = Reducer::new();
        let mut bad = request(10);
        bad.terms[0].u = vec![1];
        let err = reducer.submit(bad, DescentConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!reducer.is_busy());
    }
}
