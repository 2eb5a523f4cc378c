//! Trial Dispatcher
//!
//! Runs every work item exactly once on a bounded pool of OS threads and
//! records each sample in the shared result table.
//!
//! ```text
//!   items ──► rayon pool (N workers) ──► runner.run(item) ──► table.record
//!                                                        └──► progress.inc
//! ```
//!
//! Each trial is one blocking unit (spawn, wait, measure, clean up) on a pool
//! thread. Completions arrive in any order; the table is addressed by
//! coordinate, so order never matters.

use copybench_core::{FailureKind, RecordError, ResultTable, Sample, TrialRunner, WorkItem};
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on concurrently running trials
pub const WORKER_CEILING: usize = 32;

/// Workers started per available core by default
pub const WORKERS_PER_CORE: usize = 2;

/// Dispatcher errors; trial failures are data and never end up here
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("Result table invariant violated: {0}")]
    Record(#[from] RecordError),
}

/// Default worker count: `WORKERS_PER_CORE` per core, capped at `WORKER_CEILING`
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    clamp_workers(cores * WORKERS_PER_CORE)
}

/// Clamp a requested worker count to `[1, WORKER_CEILING]`
pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(1, WORKER_CEILING)
}

/// Bounded worker pool owned by one run
pub struct Dispatcher {
    pool: ThreadPool,
    workers: usize,
}

impl Dispatcher {
    /// Build a dedicated pool; `workers` is clamped to `[1, WORKER_CEILING]`
    pub fn new(workers: usize) -> Result<Self, DispatchError> {
        let workers = clamp_workers(workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("copybench-worker-{}", i))
            .build()
            .map_err(|e| DispatchError::PoolBuild(e.to_string()))?;

        Ok(Self { pool, workers })
    }

    /// Number of pool threads
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute `items`, recording one sample per item into `table`
    ///
    /// Returns only after every item has finished. A panicking runner is
    /// contained and recorded as a crashed trial.
    pub fn run<R>(
        &self,
        items: &[WorkItem],
        runner: &R,
        table: &ResultTable,
        progress: &ProgressBar,
    ) -> Result<(), DispatchError>
    where
        R: TrialRunner + ?Sized,
    {
        debug!(items = items.len(), workers = self.workers, "dispatching trials");

        let result = self.pool.install(|| {
            items
                .par_iter()
                // One item per task: trials are long and uneven
                .with_max_len(1)
                .try_for_each(|item| {
                    let sample = run_contained(runner, item);
                    table.record(&item.coordinate, sample)?;
                    progress.inc(1);
                    Ok(())
                })
        });

        let recorded = table.recorded();
        match &result {
            Ok(()) => debug!(recorded, "dispatch finished"),
            Err(e) => warn!("Dispatch aborted after {} of {} trials: {}", recorded, items.len(), e),
        }
        result
    }
}

fn run_contained<R>(runner: &R, item: &WorkItem) -> Sample
where
    R: TrialRunner + ?Sized,
{
    match std::panic::catch_unwind(AssertUnwindSafe(|| runner.run(item))) {
        Ok(sample) => sample,
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!("Trial {} crashed: {}", item.coordinate, message);
            Sample::Failed(FailureKind::Crashed(message))
        }
    }
}
